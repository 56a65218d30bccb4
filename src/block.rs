//! Block extraction driver

use scraper::ElementRef;
use serde_json::{Map, Value};
use tracing::{debug, info_span};

use crate::extractors::collect_fields;
use crate::schema::BlockSchema;

/// Extract a block's structured fields using its schema.
///
/// Top-level fields are resolved against the block element with nothing
/// shared; a root-level selector is ignored. Returns `None` when no field
/// produced a value so the caller can fall back to generic extraction.
/// `block_name` is only used for diagnostics.
pub fn extract_block_with_schema(
    block: ElementRef<'_>,
    schema: &BlockSchema,
    block_name: &str,
) -> Option<Map<String, Value>> {
    let _span = info_span!("extract_block", block = %block_name).entered();

    let values = collect_fields(block, None, schema.fields());
    if values.is_empty() {
        debug!(fields = schema.fields().len(), "No schema fields matched");
        return None;
    }

    Some(values)
}
