//! HTTP screenshot service backend.
//!
//! Posts the rendering page to a screenshot service (any service accepting
//! `POST /screenshot` with an HTML payload) and receives image bytes back.
//! This backend supports every [`ImageFormat`](crate::ImageFormat) the
//! service does, including vector output.

use std::time::Duration;

use ureq::Agent;

use crate::backend::{BackendError, RenderBackend, RenderOptions};
use crate::consts::DEFAULT_TIMEOUT;

/// Create an HTTP agent with the specified timeout.
///
/// Status codes are not turned into transport errors so that error bodies
/// can be read for diagnostics.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Backend that delegates rendering to an HTTP screenshot service.
pub struct ScreenshotBackend {
    base_url: String,
    agent: Agent,
}

impl ScreenshotBackend {
    /// Create a backend for the given service URL with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a backend with an explicit request timeout.
    #[must_use]
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            agent: create_agent(timeout),
        }
    }
}

impl RenderBackend for ScreenshotBackend {
    fn render(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, BackendError> {
        let url = format!("{}/screenshot", self.base_url);
        let payload = serde_json::json!({
            "html": html,
            "format": options.format.as_str(),
            "transparent": options.transparent,
            "width": options.width,
            "height": options.height,
        });

        let response = self
            .agent
            .post(&url)
            .send_json(&payload)
            .map_err(|e| BackendError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let detail = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(BackendError::Http(format!("HTTP {status}: {detail}")));
        }

        body.read_to_vec()
            .map_err(|e| BackendError::Io(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "screenshot-service"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_trailing_slash() {
        let backend = ScreenshotBackend::new("http://localhost:3000/");
        assert_eq!(backend.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_keeps_url_without_slash() {
        let backend = ScreenshotBackend::new("https://shots.example.com");
        assert_eq!(backend.base_url, "https://shots.example.com");
    }

    #[test]
    fn test_name() {
        let backend = ScreenshotBackend::new("http://localhost:3000");
        assert_eq!(backend.name(), "screenshot-service");
    }

    #[test]
    fn test_unreachable_service_is_http_error() {
        // Reserved TEST-NET address, nothing listens there; the agent's
        // connect attempt fails fast enough with a short timeout.
        let backend =
            ScreenshotBackend::with_timeout("http://192.0.2.1:9", Duration::from_millis(200));
        let result = backend.render("<html></html>", &RenderOptions::default());
        assert!(matches!(result, Err(BackendError::Http(_))));
    }
}
