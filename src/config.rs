//! Schema loader configuration

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{LoadError, LoadResult};

/// Placeholder replaced with the block name in [`SchemaLoaderConfig::path_template`]
pub const BLOCK_PLACEHOLDER: &str = "{block}";

/// Where and how block schemas are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchemaLoaderConfig {
    /// Scheme used when the base domain does not carry one
    pub default_scheme: String,
    /// Path of a block's schema relative to the site origin
    pub path_template: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SchemaLoaderConfig {
    fn default() -> Self {
        Self {
            default_scheme: "https".to_string(),
            path_template: "/blocks/{block}/{block}.schema.json".to_string(),
            timeout_secs: 10,
            user_agent: concat!("block-extractor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SchemaLoaderConfig {
    pub fn with_path_template(mut self, template: impl Into<String>) -> Self {
        self.path_template = template.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Address of `block_name`'s schema on `base_domain`.
    ///
    /// `base_domain` may be a bare host (`example.com`) or an origin with a
    /// scheme (`http://localhost:3000`).
    pub fn schema_url(&self, block_name: &str, base_domain: &str) -> LoadResult<Url> {
        if !is_valid_block_name(block_name) {
            return Err(LoadError::InvalidBlockName {
                name: block_name.to_string(),
            });
        }

        let base = base_domain.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(LoadError::InvalidUrl {
                base_domain: base_domain.to_string(),
                source: url::ParseError::EmptyHost,
            });
        }

        let origin = if base.contains("://") {
            base.to_string()
        } else {
            format!("{}://{}", self.default_scheme, base)
        };
        let path = self.path_template.replace(BLOCK_PLACEHOLDER, block_name);

        Url::parse(&format!("{origin}{path}")).map_err(|source| LoadError::InvalidUrl {
            base_domain: base_domain.to_string(),
            source,
        })
    }
}

/// Block names are kebab/snake case identifiers; anything else could escape the path.
fn is_valid_block_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
