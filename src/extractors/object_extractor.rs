//! Object properties

use serde_json::Value;

use super::{collect_fields, Scope};
use crate::dom::first_match;
use crate::schema::ObjectProperty;

/// Extract an object property's fields into a mapping.
///
/// When the object declares a selector its first match becomes the shared
/// element for every child field. If it matches nothing the children fall
/// back to the current scope element.
pub fn extract_object(scope: Scope<'_, '_>, property: &ObjectProperty) -> Option<Value> {
    if property.properties.is_empty() {
        return None;
    }

    let shared = property
        .selector
        .as_ref()
        .and_then(|selector| first_match(scope.element, selector));
    let element = shared.unwrap_or(scope.element);

    let values = collect_fields(element, shared, &property.properties);
    if values.is_empty() {
        None
    } else {
        Some(Value::Object(values))
    }
}
