//! Compute-service session and authentication status.

use std::time::Duration;

use basemap_common::{BasemapError, BasemapResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Network timeout for compute-service calls. Raster downloads for a large
/// extent can legitimately take minutes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// A connection to the remote compute service.
///
/// Created once per run and passed explicitly to every call site — there is
/// no ambient global session, so tests can substitute a mock service
/// without touching process state.
#[derive(Debug, Clone)]
pub struct ComputeSession {
    endpoint: String,
    token: Option<String>,
    project: Option<String>,
    client: reqwest::Client,
}

impl ComputeSession {
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        project: Option<String>,
    ) -> BasemapResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BasemapError::Fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            token,
            project,
            client,
        })
    }

    /// Build a session from `COMPUTE_ENDPOINT`, `COMPUTE_TOKEN` and
    /// `COMPUTE_PROJECT` environment variables.
    pub fn from_env() -> BasemapResult<Self> {
        let endpoint = std::env::var("COMPUTE_ENDPOINT")
            .unwrap_or_else(|_| "https://earthengine.googleapis.com".to_string());
        let token = std::env::var("COMPUTE_TOKEN").ok();
        let project = std::env::var("COMPUTE_PROJECT").ok();
        debug!(endpoint = %endpoint, has_token = token.is_some(), "compute session configured");
        Self::new(endpoint, token, project)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Endpoint joined with a request path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint.trim_end_matches('/'))
    }

    /// Attach bearer credentials to a request when available.
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Probe authentication against the service.
    ///
    /// Reports a structured status instead of raising, so callers can
    /// branch without error handling.
    pub async fn check_authentication(&self) -> AuthStatus {
        if self.token.is_none() {
            return AuthStatus {
                authenticated: false,
                message: "no credentials configured; set COMPUTE_TOKEN".to_string(),
                project: None,
            };
        }

        let probe = self.authorize(self.client.get(self.url("/v1/projects")));
        match probe.send().await {
            Ok(response) if response.status().is_success() => AuthStatus {
                authenticated: true,
                message: "successfully authenticated to the compute service".to_string(),
                project: self.project.clone(),
            },
            Ok(response) => AuthStatus {
                authenticated: false,
                message: format!("authentication failed: HTTP {}", response.status()),
                project: None,
            },
            Err(e) => AuthStatus {
                authenticated: false,
                message: format!("authentication error: {e}"),
                project: None,
            },
        }
    }
}

/// Structured authentication status: reported, never raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub message: String,
    pub project: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let session = ComputeSession::new("https://svc.example/", None, None).unwrap();
        assert_eq!(session.url("/v1/download"), "https://svc.example/v1/download");
    }

    #[tokio::test]
    async fn test_missing_token_reports_unauthenticated() {
        let session = ComputeSession::new("https://svc.example", None, None).unwrap();
        let status = session.check_authentication().await;
        assert!(!status.authenticated);
        assert!(status.message.contains("COMPUTE_TOKEN"));
        assert!(status.project.is_none());
    }
}
