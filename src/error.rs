//! Typed errors for schema validation, extraction and schema loading.

use thiserror::Error;

/// The schema document could not be turned into a [`crate::BlockSchema`].
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema document is not a JSON object
    #[error("schema document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// Root property is not of type `object`
    #[error("schema root must be an `object` property, found `{found}`")]
    RootNotObject { found: String },

    /// Root property failed shape validation
    #[error("invalid schema root: {reason}")]
    InvalidRoot { reason: String },
}

/// A single field could not be extracted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("malformed property: {reason}")]
    MalformedProperty { reason: String },
}

/// Reasons a schema could not be loaded. Never surfaced past
/// [`crate::SchemaLoader::load`], which degrades them to `None`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid block name: {name:?}")]
    InvalidBlockName { name: String },

    #[error("invalid schema URL for {base_domain}: {source}")]
    InvalidUrl {
        base_domain: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("schema at {url} is unusable: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

pub type LoadResult<T> = std::result::Result<T, LoadError>;
