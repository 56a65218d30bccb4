//! Schema-driven block extraction
//!
//! Turns a content block's markup into structured JSON using a block schema:
//! - Schema validation (`object` / `array` / `string` properties)
//! - Recursive extraction with CSS selectors, attributes and shared elements
//! - Schema loading over HTTP (async and blocking) or from inline documents
//! - FFI entry point for C/C++ hosts

pub mod block;
pub mod config;
pub mod dom;
pub mod error;
pub mod extractors;
pub mod ffi;
pub mod loader;
pub mod schema;

pub use block::extract_block_with_schema;
pub use config::SchemaLoaderConfig;
pub use error::{ExtractError, LoadError, SchemaError};
pub use extractors::{extract, Scope};
pub use ffi::*;
pub use loader::{BlockingSchemaLoader, HttpSchemaLoader, SchemaLoader, StaticSchemaLoader};
pub use schema::{AttributeSource, BlockSchema, SchemaProperty};
