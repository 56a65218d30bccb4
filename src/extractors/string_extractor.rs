//! String properties
//!
//! Reads a single attribute or the text content of one element.

use serde_json::Value;

use super::Scope;
use crate::dom::{attr_or_text, first_match, text_content};
use crate::schema::{AttributeSource, StringProperty};

/// Extract a string property.
///
/// A declared selector always wins: a miss omits the value and is not
/// retried against the shared element. Without a selector the shared
/// element is read, or the scope element when nothing is shared.
pub fn extract_string(scope: Scope<'_, '_>, property: &StringProperty) -> Option<Value> {
    let element = match &property.selector {
        Some(selector) => first_match(scope.element, selector)?,
        None => scope.shared.unwrap_or(scope.element),
    };

    // Explicit attribute > the field's own name > text content
    let value = match (&property.attribute, scope.field_name) {
        (Some(AttributeSource::TextContent), _) | (None, None) => text_content(element),
        (Some(AttributeSource::Named(name)), _) => attr_or_text(element, name),
        (None, Some(field_name)) => attr_or_text(element, field_name),
    };

    if value.trim().is_empty() {
        None
    } else {
        Some(Value::String(value))
    }
}
