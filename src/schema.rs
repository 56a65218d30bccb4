//! Block schema model
//!
//! Schemas arrive as untrusted JSON. The root must be a well-formed `object`
//! property; below the root every property is validated on its own and a bad
//! one becomes [`SchemaProperty::Malformed`] so its siblings stay usable.

use scraper::Selector;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Attribute value that means "use the element's text content".
pub const TEXT_CONTENT: &str = "textContent";

/// Where a string property reads its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSource {
    /// Named attribute, falling back to text content when the attribute is absent
    Named(String),
    TextContent,
}

impl AttributeSource {
    fn from_setting(name: String) -> Self {
        match name.as_str() {
            TEXT_CONTENT => AttributeSource::TextContent,
            _ => AttributeSource::Named(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StringProperty {
    pub selector: Option<Selector>,
    pub description: Option<String>,
    pub attribute: Option<AttributeSource>,
}

#[derive(Debug, Clone)]
pub struct ArrayProperty {
    pub selector: Option<Selector>,
    pub description: Option<String>,
    pub items: Option<Box<SchemaProperty>>,
}

#[derive(Debug, Clone)]
pub struct ObjectProperty {
    pub selector: Option<Selector>,
    pub description: Option<String>,
    /// Child fields in declaration order
    pub properties: Vec<(String, SchemaProperty)>,
    /// Informational only, never enforced
    pub required: Vec<String>,
}

/// One node of a block schema.
#[derive(Debug, Clone)]
pub enum SchemaProperty {
    String(StringProperty),
    Array(ArrayProperty),
    Object(ObjectProperty),
    /// A property that failed validation; extracting it is an error
    Malformed { reason: String },
}

impl SchemaProperty {
    /// Validate a single property and everything below it.
    pub fn from_value(value: &Value) -> Self {
        parse_property(value, None).unwrap_or_else(|reason| SchemaProperty::Malformed { reason })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SchemaProperty::String(_) => "string",
            SchemaProperty::Array(_) => "array",
            SchemaProperty::Object(_) => "object",
            SchemaProperty::Malformed { .. } => "malformed",
        }
    }
}

/// Raw shape of a property as it appears in the schema document
#[derive(Debug, Deserialize)]
struct RawProperty {
    #[serde(rename = "type")]
    type_tag: Option<String>,
    selector: Option<String>,
    description: Option<String>,
    attribute: Option<String>,
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    required: Vec<String>,
    items: Option<Value>,
}

fn parse_property(value: &Value, default_tag: Option<&str>) -> Result<SchemaProperty, String> {
    let raw = RawProperty::deserialize(value).map_err(|e| e.to_string())?;

    let tag = match raw.type_tag.as_deref().or(default_tag) {
        Some(tag) => tag,
        None => return Err("missing `type`".to_string()),
    };

    let selector = raw.selector.as_deref().map(compile_selector).transpose()?;

    match tag {
        "string" => Ok(SchemaProperty::String(StringProperty {
            selector,
            description: raw.description,
            attribute: raw.attribute.map(AttributeSource::from_setting),
        })),
        "array" => Ok(SchemaProperty::Array(ArrayProperty {
            selector,
            description: raw.description,
            items: raw
                .items
                .as_ref()
                .map(|items| Box::new(SchemaProperty::from_value(items))),
        })),
        "object" => Ok(SchemaProperty::Object(ObjectProperty {
            selector,
            description: raw.description,
            properties: raw
                .properties
                .iter()
                .flatten()
                .map(|(name, child)| (name.clone(), SchemaProperty::from_value(child)))
                .collect(),
            required: raw.required,
        })),
        other => Err(format!("unsupported type tag `{other}`")),
    }
}

fn compile_selector(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("invalid selector `{selector}`: {e}"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Schema describing how to map one block's markup to structured fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Value")]
pub struct BlockSchema {
    pub title: Option<String>,
    pub root: ObjectProperty,
}

impl BlockSchema {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Top-level fields in declaration order
    pub fn fields(&self) -> &[(String, SchemaProperty)] {
        &self.root.properties
    }

    pub fn description(&self) -> Option<&str> {
        self.root.description.as_deref()
    }
}

impl TryFrom<Value> for BlockSchema {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = &value else {
            return Err(SchemaError::NotAnObject {
                found: json_kind(&value),
            });
        };

        // The root may omit `type`, but anything other than `object` is rejected
        if let Some(tag) = map.get("type") {
            if tag.as_str() != Some("object") {
                return Err(SchemaError::RootNotObject {
                    found: tag.as_str().map_or_else(|| tag.to_string(), String::from),
                });
            }
        }

        let title = map.get("title").and_then(Value::as_str).map(String::from);

        match parse_property(&value, Some("object")) {
            Ok(SchemaProperty::Object(root)) => Ok(BlockSchema { title, root }),
            Ok(other) => Err(SchemaError::RootNotObject {
                found: other.kind().to_string(),
            }),
            Err(reason) => Err(SchemaError::InvalidRoot { reason }),
        }
    }
}
