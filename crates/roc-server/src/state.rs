//! Shared application state for the gateway.
//!
//! [`AppState`] is built once at startup and handed to every handler
//! behind an `Arc`. Everything in it is either immutable or internally
//! shareable, so handlers never lock.

use std::path::PathBuf;
use std::sync::Arc;

use roc_southbound::Southbound;

use crate::auth::{AllowAll, Authorizer};
use crate::config::GatewayConfig;
use crate::spec_docs::SpecRegistry;
use crate::sync::SyncProxy;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backend client.
    pub southbound: Southbound,
    /// OpenAPI documents.
    pub specs: SpecRegistry,
    /// Role check for write and synchronize endpoints.
    pub authorizer: Arc<dyn Authorizer>,
    /// Role those endpoints require.
    pub admin_role: String,
    /// Synchronize sidecar client.
    pub sync: SyncProxy,
    /// HTML page template.
    pub template_path: PathBuf,
    /// Description shown on the HTML page.
    pub description: String,
}

impl AppState {
    /// State with authorization disabled and default page settings.
    pub fn new(southbound: Southbound, specs: SpecRegistry) -> Self {
        Self {
            southbound,
            specs,
            authorizer: Arc::new(AllowAll),
            admin_role: "AetherROCAdmin".to_owned(),
            sync: SyncProxy::new(8080),
            template_path: PathBuf::from("assets/html-page.tpl"),
            description: "Aether ROC API".to_owned(),
        }
    }

    /// State wired from loaded configuration.
    pub fn from_config(
        config: &GatewayConfig,
        southbound: Southbound,
        specs: SpecRegistry,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            southbound,
            specs,
            authorizer,
            admin_role: config.admin_role.clone(),
            sync: SyncProxy::new(config.sync_sidecar_port),
            template_path: config.template_path.clone(),
            description: config.description.clone(),
        }
    }

    /// Replace the authorizer.
    #[must_use]
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>, admin_role: &str) -> Self {
        self.authorizer = authorizer;
        self.admin_role = admin_role.to_owned();
        self
    }

    /// Replace the HTML page template.
    #[must_use]
    pub fn with_template(mut self, path: PathBuf) -> Self {
        self.template_path = path;
        self
    }

    /// Replace the synchronize sidecar port.
    #[must_use]
    pub fn with_sync_port(mut self, port: u16) -> Self {
        self.sync = SyncProxy::new(port);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("southbound", &self.southbound)
            .field("specs", &self.specs)
            .field("admin_role", &self.admin_role)
            .field("sync", &self.sync)
            .field("template_path", &self.template_path)
            .finish_non_exhaustive()
    }
}
