//! Schema-driven extraction engine
//!
//! Each property kind has its own extractor. [`extract`] dispatches on the
//! kind and recurses through nested object and array shapes. A value that
//! comes back as `None` is omitted by the caller, never emitted as null.

mod array_extractor;
mod object_extractor;
mod string_extractor;

pub use array_extractor::*;
pub use object_extractor::*;
pub use string_extractor::*;

use scraper::ElementRef;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ExtractError, ExtractResult};
use crate::schema::SchemaProperty;

/// Where a property is resolved from.
///
/// Passed by value down the recursion; `shared` is the element an enclosing
/// object property resolved once for all of its children.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a, 'n> {
    pub element: ElementRef<'a>,
    pub shared: Option<ElementRef<'a>>,
    pub field_name: Option<&'n str>,
}

impl<'a, 'n> Scope<'a, 'n> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Self {
            element,
            shared: None,
            field_name: None,
        }
    }

    pub fn with_shared(mut self, shared: Option<ElementRef<'a>>) -> Self {
        self.shared = shared;
        self
    }

    pub fn with_field(mut self, field_name: &'n str) -> Self {
        self.field_name = Some(field_name);
        self
    }
}

/// Extract one property. `Ok(None)` means the property is omitted.
pub fn extract(scope: Scope<'_, '_>, property: &SchemaProperty) -> ExtractResult<Option<Value>> {
    match property {
        SchemaProperty::String(string) => Ok(extract_string(scope, string)),
        SchemaProperty::Array(array) => extract_array(scope, array),
        SchemaProperty::Object(object) => Ok(extract_object(scope, object)),
        SchemaProperty::Malformed { reason } => Err(ExtractError::MalformedProperty {
            reason: reason.clone(),
        }),
    }
}

/// Extract every field against `element`, keeping values that resolved.
///
/// A failing field is logged and skipped; it never stops its siblings.
pub(crate) fn collect_fields<'a>(
    element: ElementRef<'a>,
    shared: Option<ElementRef<'a>>,
    fields: &[(String, SchemaProperty)],
) -> Map<String, Value> {
    let mut values = Map::new();

    for (name, property) in fields {
        let scope = Scope::new(element).with_shared(shared).with_field(name);
        match extract(scope, property) {
            Ok(Some(value)) => {
                values.insert(name.clone(), value);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(field = %name, error = %e, "Skipping field");
            }
        }
    }

    values
}
