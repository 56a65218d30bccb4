//! Array properties

use serde_json::Value;

use super::{extract, Scope};
use crate::dom::all_matches;
use crate::error::{ExtractError, ExtractResult};
use crate::schema::{ArrayProperty, SchemaProperty};

/// Extract every element matching the array's selector with its `items` shape.
///
/// Items are scoped to their own element with nothing shared. Items that
/// resolve to nothing are dropped, and an array with no items is omitted.
/// A malformed `items` shape is an error even when nothing matches.
pub fn extract_array(scope: Scope<'_, '_>, property: &ArrayProperty) -> ExtractResult<Option<Value>> {
    let (Some(selector), Some(items)) = (&property.selector, property.items.as_deref()) else {
        return Ok(None);
    };

    if let SchemaProperty::Malformed { reason } = items {
        return Err(ExtractError::MalformedProperty {
            reason: reason.clone(),
        });
    }

    let mut values = Vec::new();
    for element in all_matches(scope.element, selector) {
        if let Some(value) = extract(Scope::new(element), items)? {
            values.push(value);
        }
    }

    if values.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Value::Array(values)))
    }
}
