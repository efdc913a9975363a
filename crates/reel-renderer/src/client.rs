//! HTTP client for the renderer endpoints.

use std::time::Duration;

use tracing::debug;

use crate::error::{RendererError, RendererResult};
use crate::types::{RenderSpecV0, RenderSpecV1};

/// Render calls can legitimately take minutes.
const RENDER_TIMEOUT: Duration = Duration::from_secs(600);

/// Renderer client.
#[derive(Clone)]
pub struct RendererClient {
    http: reqwest::Client,
    base_url: String,
}

impl RendererClient {
    /// Create a client for the renderer at `base_url`.
    pub fn new(base_url: impl Into<String>) -> RendererResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(RENDER_TIMEOUT)
            .build()
            .map_err(RendererError::from)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Invoke the legacy renderer.
    pub async fn render_v0(&self, spec: &RenderSpecV0) -> RendererResult<()> {
        self.post("/render", spec).await
    }

    /// Invoke the enveloped renderer.
    pub async fn render_v1(&self, spec: &RenderSpecV1) -> RendererResult<()> {
        self.post("/render/v1", spec).await
    }

    async fn post<T: serde::Serialize>(&self, path: &str, spec: &T) -> RendererResult<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Invoking renderer");

        let resp = self.http.post(&url).json(spec).send().await?;

        if !resp.status().is_success() {
            return Err(RendererError::Status {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = RendererClient::new("http://renderer:9000/").unwrap();
        assert_eq!(client.base_url, "http://renderer:9000");
    }
}
