//! Client for the synchronize sidecar that runs next to each service.

use axum::http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, warn};

use crate::error::ApiError;

/// Triggers `POST http://{service}:{port}/synchronize`.
#[derive(Debug, Clone)]
pub struct SyncProxy {
    client: reqwest::Client,
    port: u16,
}

impl SyncProxy {
    /// Proxy targeting `port` on every service host.
    pub fn new(port: u16) -> Self {
        Self {
            // Sidecars are addressed by in-cluster host name.
            client: reqwest::Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_default(),
            port,
        }
    }

    /// Sidecar address for `service`.
    pub fn address(&self, service: &str) -> String {
        format!("http://{service}:{}/synchronize", self.port)
    }

    /// Ask the sidecar of `service` to synchronize.
    ///
    /// Returns the sidecar's status and body unchanged.
    ///
    /// # Errors
    ///
    /// [`ApiError::BadRequest`] naming the address if the sidecar cannot be
    /// reached or its reply cannot be read.
    pub async fn trigger(&self, service: &str) -> Result<(StatusCode, String), ApiError> {
        let address = self.address(service);
        let unreachable = |e: reqwest::Error| {
            warn!(address = %address, error = %e, "synchronize call failed");
            ApiError::BadRequest(format!("error calling {address}. {e}"))
        };

        let response = self
            .client
            .post(&address)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(unreachable)?;
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let body = response.text().await.map_err(unreachable)?;

        info!(service, status = status.as_u16(), "synchronize triggered");
        Ok((status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_uses_service_as_host() {
        let proxy = SyncProxy::new(8080);
        assert_eq!(
            proxy.address("sdcore-adapter-v2-1"),
            "http://sdcore-adapter-v2-1:8080/synchronize"
        );
    }
}
