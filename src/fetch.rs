// 🌐 Document Fetch - the only network-facing collaborator
// One GET per request; failures surface once, no retries here.

use crate::config::RegistryConfig;
use crate::error::VerifyError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Anything that turns a URL into markup
pub trait DocumentFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<T: DocumentFetcher + ?Sized> DocumentFetcher for Arc<T> {
    fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url)
    }
}

// ============================================================================
// HTTP
// ============================================================================

pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpFetcher {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        info!(url, "fetching");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .map_err(|e| {
                warn!(url, error = %e, "transport failure");
                VerifyError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "registry returned error status");
            return Err(VerifyError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().map_err(|e| VerifyError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        info!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

// ============================================================================
// IN-MEMORY (offline pages, tests)
// ============================================================================

/// Serves pre-loaded pages keyed by URL; unknown URLs act like a 404
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a page
    pub fn with_page(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages.insert(url.into(), markup.into());
        self
    }
}

impl DocumentFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        self.pages.get(url).cloned().ok_or_else(|| {
            VerifyError::Status {
                url: url.to_string(),
                status: 404,
            }
            .into()
        })
    }
}
