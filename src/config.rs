// ⚙️ Configuration - explicit structs handed to the collaborators
// Nothing in extraction or scoring reads the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://www.canecorsopedigree.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_DB_PATH: &str = "pedigree.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

// ============================================================================
// REGISTRY (document fetch)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Scheme + host of the registry, no trailing slash
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl RegistryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        RegistryConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Profile page of one dog
    pub fn profile_url(&self, id: &str) -> String {
        format!("{}/view_dog?id={}", self.base_url, id)
    }

    /// Search results page, ordered by name
    pub fn search_url(&self, term: &str) -> String {
        format!(
            "{}/search_dog_results?searchTerm={}&orderBy=dog_name&order=ASC",
            self.base_url,
            urlencoding::encode(term)
        )
    }

    /// Turn a site-relative hyperlink into an absolute URL
    pub fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

// ============================================================================
// SINK (persistence)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// REST document store root; when absent the local SQLite store is used
    pub rest_url: Option<String>,
    pub api_key: Option<String>,
    pub db_path: PathBuf,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            rest_url: None,
            api_key: None,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

// ============================================================================
// TOP LEVEL
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub registry: RegistryConfig,
    pub sink: SinkConfig,
    pub bind_addr: Option<String>,
}

impl Config {
    /// Build from process environment, falling back to defaults field by field
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with an injectable lookup (tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut registry = match get("PEDIGREE_BASE_URL") {
            Some(url) => RegistryConfig::new(url),
            None => RegistryConfig::default(),
        };
        if let Some(ua) = get("PEDIGREE_USER_AGENT") {
            registry.user_agent = ua;
        }
        if let Some(secs) = get("PEDIGREE_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()) {
            registry.timeout_secs = secs;
        }

        let sink = SinkConfig {
            rest_url: get("SUPABASE_URL").or_else(|| get("REACT_APP_SUPABASE_URL")),
            api_key: get("SUPABASE_SERVICE_KEY").or_else(|| get("REACT_APP_SUPABASE_ANON_KEY")),
            db_path: get("PEDIGREE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
        };

        Config {
            registry,
            sink,
            bind_addr: get("PEDIGREE_BIND"),
        }
    }

    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }
}
