//! Authorization gate.
//!
//! Handlers that write or trigger side effects ask an [`Authorizer`] whether
//! the caller holds a role before anything is sent to the backend. Token
//! verification itself lives behind the trait; this crate ships a
//! pass-through for disabled authorization and a static bearer-token table
//! for local runs and tests.

use std::collections::{BTreeMap, BTreeSet};

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// Reasons an authorization check fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was presented.
    #[error("missing bearer token in Authorization header")]
    MissingToken,

    /// The presented token is not recognized.
    #[error("invalid bearer token")]
    InvalidToken,

    /// The token is valid but lacks the role.
    #[error("role {role} is required")]
    MissingRole {
        /// The required role.
        role: String,
    },
}

/// Pass/fail check of the caller's roles.
pub trait Authorizer: Send + Sync {
    /// Succeed when the request carries credentials holding `role`.
    fn authorize(&self, headers: &HeaderMap, role: &str) -> Result<(), AuthError>;
}

/// Authorizer used when authorization is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _headers: &HeaderMap, _role: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Static table of bearer tokens and the roles they carry.
#[derive(Debug, Clone, Default)]
pub struct BearerRoles {
    tokens: BTreeMap<String, BTreeSet<String>>,
}

impl BearerRoles {
    /// Parse a table of the form `token=RoleA|RoleB;token2=RoleC`.
    ///
    /// Blank entries are skipped; an entry without `=` grants no roles.
    pub fn parse(table: &str) -> Self {
        let tokens = table
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (token, roles) = entry.split_once('=').unwrap_or((entry, ""));
                let roles = roles
                    .split('|')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_owned)
                    .collect();
                (token.trim().to_owned(), roles)
            })
            .collect();
        Self { tokens }
    }

    /// Grant `roles` to `token`.
    #[must_use]
    pub fn with_token<I, S>(mut self, token: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens
            .entry(token.to_owned())
            .or_default()
            .extend(roles.into_iter().map(Into::into));
        self
    }
}

impl Authorizer for BearerRoles {
    fn authorize(&self, headers: &HeaderMap, role: &str) -> Result<(), AuthError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let roles = self.tokens.get(token).ok_or(AuthError::InvalidToken)?;
        if roles.contains(role) {
            Ok(())
        } else {
            Err(AuthError::MissingRole {
                role: role.to_owned(),
            })
        }
    }
}
