//! Gateway configuration.
//!
//! All configuration is loaded from environment variables. Values are read
//! through a lookup function so tests can supply their own table instead of
//! touching the process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::server::ServerConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("invalid {name}: {message}")]
    Invalid {
        /// The offending variable.
        name: &'static str,
        /// Why it was rejected.
        message: String,
    },
}

/// Complete gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address.
    pub server: ServerConfig,
    /// Deadline applied to every backend call, stream drains included.
    pub backend_timeout: Duration,
    /// Whether write and synchronize endpoints check authorization.
    pub authorization: bool,
    /// Role required by write and synchronize endpoints.
    pub admin_role: String,
    /// Bearer-token table used when authorization is enabled, in the
    /// form `token=RoleA|RoleB;token2=RoleC`.
    pub bearer_roles: Option<String>,
    /// HTML page template for spec documents.
    pub template_path: PathBuf,
    /// Directory of additional OpenAPI surfaces.
    pub spec_dir: Option<PathBuf>,
    /// YAML snapshot served by the in-process backend.
    pub backend_snapshot: Option<PathBuf>,
    /// Cap on records aggregated from one change stream.
    pub max_transactions: usize,
    /// Port of the synchronize sidecar on each service host.
    pub sync_sidecar_port: u16,
    /// Description shown on the HTML spec page.
    pub description: String,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables (all have defaults):
    /// - `ROC_HOST` -- bind host (default `0.0.0.0`)
    /// - `ROC_PORT` -- bind port (default `8181`)
    /// - `GNMI_TIMEOUT_MS` -- backend deadline in milliseconds (default 10000)
    /// - `ROC_AUTHORIZATION` -- enable authorization checks (default `false`)
    /// - `ROC_ADMIN_ROLE` -- role for write endpoints (default `AetherROCAdmin`)
    /// - `ROC_BEARER_ROLES` -- bearer-token to roles table
    /// - `ROC_TEMPLATE_PATH` -- HTML template (default `assets/html-page.tpl`)
    /// - `ROC_SPEC_DIR` -- directory of extra OpenAPI surfaces
    /// - `ROC_BACKEND_SNAPSHOT` -- YAML snapshot for the in-process backend
    /// - `MAX_TRANSACTIONS` -- change-stream record cap (default 10000)
    /// - `SYNC_SIDECAR_PORT` -- synchronize sidecar port (default 8080)
    /// - `ROC_DESCRIPTION` -- HTML page description (default `Aether ROC API`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("ROC_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port: u16 = parse_var(&lookup, "ROC_PORT", "8181")?;
        let timeout_ms: u64 = parse_var(&lookup, "GNMI_TIMEOUT_MS", "10000")?;
        let authorization: bool = parse_var(&lookup, "ROC_AUTHORIZATION", "false")?;
        let max_transactions: usize = parse_var(&lookup, "MAX_TRANSACTIONS", "10000")?;
        let sync_sidecar_port: u16 = parse_var(&lookup, "SYNC_SIDECAR_PORT", "8080")?;

        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "GNMI_TIMEOUT_MS",
                message: "must be greater than zero".to_owned(),
            });
        }

        Ok(Self {
            server: ServerConfig { host, port },
            backend_timeout: Duration::from_millis(timeout_ms),
            authorization,
            admin_role: lookup("ROC_ADMIN_ROLE").unwrap_or_else(|| "AetherROCAdmin".to_owned()),
            bearer_roles: lookup("ROC_BEARER_ROLES"),
            template_path: lookup("ROC_TEMPLATE_PATH")
                .map_or_else(|| PathBuf::from("assets/html-page.tpl"), PathBuf::from),
            spec_dir: lookup("ROC_SPEC_DIR").map(PathBuf::from),
            backend_snapshot: lookup("ROC_BACKEND_SNAPSHOT").map(PathBuf::from),
            max_transactions,
            sync_sidecar_port,
            description: lookup("ROC_DESCRIPTION").unwrap_or_else(|| "Aether ROC API".to_owned()),
        })
    }
}

/// Read and parse a variable, falling back to `default` when unset.
fn parse_var<T, F>(lookup: &F, name: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .unwrap_or_else(|| default.to_owned())
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            name,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let table: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| table.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = GatewayConfig::from_lookup(lookup(&[])).ok();
        let Some(config) = config else {
            panic!("defaults should load");
        };
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8181);
        assert_eq!(config.backend_timeout, Duration::from_secs(10));
        assert!(!config.authorization);
        assert_eq!(config.admin_role, "AetherROCAdmin");
        assert_eq!(config.template_path, PathBuf::from("assets/html-page.tpl"));
        assert_eq!(config.max_transactions, 10_000);
        assert_eq!(config.sync_sidecar_port, 8080);
        assert!(config.spec_dir.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("ROC_PORT", "9000"),
            ("GNMI_TIMEOUT_MS", "250"),
            ("ROC_AUTHORIZATION", "true"),
            ("ROC_SPEC_DIR", "/etc/roc/specs"),
            ("MAX_TRANSACTIONS", "5"),
        ]));
        let Ok(config) = config else {
            panic!("overrides should load");
        };
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.backend_timeout, Duration::from_millis(250));
        assert!(config.authorization);
        assert_eq!(config.spec_dir, Some(PathBuf::from("/etc/roc/specs")));
        assert_eq!(config.max_transactions, 5);
    }

    #[test]
    fn invalid_value_names_the_variable() {
        let err = GatewayConfig::from_lookup(lookup(&[("ROC_PORT", "eighty")]))
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.starts_with("invalid ROC_PORT"), "{err}");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = GatewayConfig::from_lookup(lookup(&[("GNMI_TIMEOUT_MS", "0")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "GNMI_TIMEOUT_MS",
                ..
            })
        ));
    }
}
