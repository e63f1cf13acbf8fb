//! HTTP readiness check against the ASR web service

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::HealthCheck;
use crate::domain::service::ServiceEndpoint;

/// Path served by the ASR web service once the application is up
const HEALTH_PATH: &str = "/docs";

/// Per-request timeout for a single check
const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Readiness check that requires an HTTP success status
pub struct HttpHealthCheck {
    client: reqwest::Client,
}

impl HttpHealthCheck {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(CHECK_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    fn url(endpoint: &ServiceEndpoint) -> String {
        format!("{}{}", endpoint.base_url(), HEALTH_PATH)
    }
}

impl Default for HttpHealthCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthCheck for HttpHealthCheck {
    async fn is_ready(&self, endpoint: &ServiceEndpoint) -> bool {
        let url = Self::url(endpoint);
        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!(%url, %status, "health check");
                status.is_success()
            }
            Err(e) => {
                debug!(%url, error = %e, "health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn endpoint_for(server: &MockServer) -> ServiceEndpoint {
        let addr = server.address();
        ServiceEndpoint::new(addr.ip().to_string(), addr.port())
    }

    #[test]
    fn url_points_at_docs() {
        let url = HttpHealthCheck::url(&ServiceEndpoint::new("localhost", 9000));
        assert_eq!(url, "http://localhost:9000/docs");
    }

    #[tokio::test]
    async fn success_status_is_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(HttpHealthCheck::new().is_ready(&endpoint_for(&server)).await);
    }

    #[tokio::test]
    async fn unavailable_status_is_not_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(!HttpHealthCheck::new().is_ready(&endpoint_for(&server)).await);
    }

    #[tokio::test]
    async fn accepting_socket_without_http_is_not_ready() {
        // Accepts and immediately drops connections, like a port proxy whose
        // upstream application is still starting
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                drop(socket);
            }
        });

        let endpoint = ServiceEndpoint::new("127.0.0.1", port);
        assert!(!HttpHealthCheck::new().is_ready(&endpoint).await);

        accept.abort();
    }

    #[tokio::test]
    async fn closed_port_is_not_ready() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = ServiceEndpoint::new("127.0.0.1", port);
        assert!(!HttpHealthCheck::new().is_ready(&endpoint).await);
    }
}
