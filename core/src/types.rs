//! Schema type definitions for OpenAPI component modeling.
//!
//! This module defines the output data model of the engine: the schema
//! objects stored in a [`SchemaRegistry`](crate::SchemaRegistry) and the
//! [`SchemaTag`] handle the type walker returns. The types serialize with
//! [`serde`] into the OpenAPI 3 `components.schemas` shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of every component schema reference.
pub const COMPONENTS_SCHEMAS_PREFIX: &str = "#/components/schemas/";

/// Name of the placeholder returned when the depth budget runs out.
pub const DEPTH_SENTINEL_NAME: &str = "default";

/// Name of the placeholder registered for absent types.
pub const UNKNOWN_INTERFACE_NAME: &str = "unknown-interface";

/// Builds the component reference for a schema name.
///
/// # Examples
///
/// ```
/// use schema_synth_core::component_ref;
///
/// assert_eq!(component_ref("Health"), "#/components/schemas/Health");
/// ```
pub fn component_ref(name: &str) -> String {
    format!("{COMPONENTS_SCHEMAS_PREFIX}{name}")
}

/// Kind of value a schema describes.
///
/// The annotator matches on this to decide which bound fields a
/// `min=`/`max=` directive maps to, so the set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Object with named properties.
    Object,
    /// Ordered sequence described by `items`.
    Array,
    /// Text value.
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Number,
    /// `true` or `false`.
    Boolean,
}

/// XML serialization metadata for a property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xml {
    /// Serialized element (or attribute) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Serialize as an attribute instead of a child element.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub attribute: bool,
}

/// Structural description of a value.
///
/// Every field is optional so the same type models objects, arrays and
/// primitives. Empty fields are omitted when serialized.
///
/// # Examples
///
/// ```
/// use schema_synth_core::{Schema, SchemaKind, SchemaRef};
///
/// let mut schema = Schema::object();
/// schema
///     .properties
///     .insert("name".into(), SchemaRef::inline(Schema::of_kind(SchemaKind::String)));
/// schema.required.push("name".into());
///
/// let json = serde_json::to_value(&schema).unwrap();
/// assert_eq!(json["type"], "object");
/// assert_eq!(json["properties"]["name"]["type"], "string");
/// assert_eq!(json["required"][0], "name");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Value kind (`type` in OpenAPI).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,
    /// Format hint such as `int64` or `double`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Object properties keyed by serialized field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaRef>,
    /// Required property names. Not deduplicated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Element schema, only for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaRef>>,
    /// Value schema of map-like objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaRef>>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Whether `null` is accepted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    /// Inclusive numeric lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive numeric upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// XML serialization metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml: Option<Xml>,
}

impl Schema {
    /// Creates a schema of the given kind with every other field empty.
    pub fn of_kind(kind: SchemaKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// Creates an empty object schema.
    pub fn object() -> Self {
        Self::of_kind(SchemaKind::Object)
    }

    /// Creates an array schema with the given items.
    pub fn array(items: SchemaRef) -> Self {
        Self {
            kind: Some(SchemaKind::Array),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Sets the format hint.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Returns `true` if this schema has the given kind.
    pub fn is(&self, kind: SchemaKind) -> bool {
        self.kind == Some(kind)
    }
}

/// A schema, either inline or by reference into the registry.
///
/// # Examples
///
/// ```
/// use schema_synth_core::SchemaRef;
///
/// let r = SchemaRef::component("MyInput");
/// assert_eq!(r.reference(), Some("#/components/schemas/MyInput"));
///
/// let json = serde_json::to_value(&r).unwrap();
/// assert_eq!(json["$ref"], "#/components/schemas/MyInput");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    /// Reference into `components.schemas`.
    Ref {
        /// Reference path (e.g., `#/components/schemas/User`).
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// Inline schema.
    Inline(Box<Schema>),
}

impl SchemaRef {
    /// Wraps an inline schema.
    pub fn inline(schema: Schema) -> Self {
        Self::Inline(Box::new(schema))
    }

    /// Creates a component reference for a schema name.
    pub fn component(name: &str) -> Self {
        Self::Ref {
            reference: component_ref(name),
        }
    }

    /// Returns the reference path, if this is a reference.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Ref { reference } => Some(reference),
            Self::Inline(_) => None,
        }
    }

    /// Returns the inline schema, if this is not a reference.
    pub fn as_inline(&self) -> Option<&Schema> {
        match self {
            Self::Ref { .. } => None,
            Self::Inline(schema) => Some(schema),
        }
    }

    /// Mutable access to the inline schema, if this is not a reference.
    pub fn as_inline_mut(&mut self) -> Option<&mut Schema> {
        match self {
            Self::Ref { .. } => None,
            Self::Inline(schema) => Some(schema),
        }
    }
}

/// The engine's handle to a derived schema.
///
/// Leaf tags carry a registry reference plus a copy of the registered
/// schema. Array tags carry no reference; their `value` is the transient
/// array schema. The depth sentinel carries only its reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTag {
    /// Human-readable schema name.
    pub name: String,
    /// Reference into `components.schemas`.
    pub reference: Option<String>,
    /// Inline schema value.
    pub value: Option<Schema>,
}

impl SchemaTag {
    /// Tag returned when the depth budget is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_synth_core::SchemaTag;
    ///
    /// let tag = SchemaTag::depth_sentinel();
    /// assert_eq!(tag.name, "default");
    /// assert_eq!(tag.reference.as_deref(), Some("#/components/schemas/default"));
    /// assert!(tag.value.is_none());
    /// ```
    pub fn depth_sentinel() -> Self {
        Self {
            name: DEPTH_SENTINEL_NAME.to_string(),
            reference: Some(component_ref(DEPTH_SENTINEL_NAME)),
            value: None,
        }
    }

    /// Returns `true` if this is the depth sentinel.
    pub fn is_depth_sentinel(&self) -> bool {
        self.name == DEPTH_SENTINEL_NAME && self.value.is_none()
    }

    /// Converts the tag into the form embedded in documents.
    ///
    /// A reference wins over the inline value, so registry-backed tags
    /// always serialize as `$ref`.
    pub fn schema_ref(&self) -> SchemaRef {
        match &self.reference {
            Some(reference) => SchemaRef::Ref {
                reference: reference.clone(),
            },
            None => SchemaRef::inline(self.value.clone().unwrap_or_default()),
        }
    }
}
