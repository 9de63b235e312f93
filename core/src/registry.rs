//! Name-keyed store of derived component schemas.
//!
//! The [`SchemaRegistry`] is owned by one API-description build and
//! populated lazily: the first request for a name synthesizes, describes
//! and annotates the schema, and every later request returns the stored
//! value untouched.
//!
//! Recursive structs found while synthesizing a schema are emitted as
//! references and registered under their own names right after it, so
//! every reference the registry hands out resolves.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::synth::synthesize_bounded;
use crate::{
    DEFAULT_MAX_DEPTH, DEPTH_SENTINEL_NAME, Schema, StructDesc, TypeDesc, UNKNOWN_INTERFACE_NAME,
    Xml, annotate,
};

/// Identity recorded for the absent-type placeholder.
const UNKNOWN_INTERFACE_IDENTITY: &str = "<unknown-interface>";

/// Store of component schemas keyed by schema name.
///
/// Serializes as the OpenAPI `components.schemas` map.
///
/// # Examples
///
/// ```
/// use schema_synth_core::{FieldDesc, SchemaRegistry, StructDesc, TypeDesc};
///
/// let ty: TypeDesc = StructDesc::new("MyValue")
///     .field(FieldDesc::of::<String>("Value").tags(r#"json:"value""#))
///     .into();
///
/// let mut registry = SchemaRegistry::new();
/// let first = registry.get_or_create("MyValue", &ty).unwrap().clone();
/// let second = registry.get_or_create("MyValue", &ty).unwrap().clone();
///
/// assert_eq!(first, second);
/// assert_eq!(first.description.as_deref(), Some("MyValue schema"));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
    #[serde(skip)]
    identities: HashMap<String, String>,
    #[serde(skip)]
    max_depth: usize,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry whose synthesized schemas follow at most
    /// `max_depth` indirections in a row.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            schemas: BTreeMap::new(),
            identities: HashMap::new(),
            max_depth,
        }
    }

    /// Returns the schema registered under `name`, creating it from `ty`
    /// on first use.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ReservedName`] if `name` is one of the
    /// placeholder names, or [`SchemaError::NameCollision`] if `name` (or
    /// a recursive struct it references) is already registered for a type
    /// with a different identity.
    pub fn get_or_create(&mut self, name: &str, ty: &TypeDesc) -> Result<&Schema> {
        if name == DEPTH_SENTINEL_NAME || name == UNKNOWN_INTERFACE_NAME {
            return Err(SchemaError::ReservedName(name.to_string()));
        }
        self.get_or_create_as(name, ty.identity(), ty)
    }

    /// Returns the placeholder schema used when no type is available,
    /// registering it on first use.
    pub(crate) fn unknown_interface(&mut self) -> Result<&Schema> {
        let ty = TypeDesc::Struct(StructDesc::new(UNKNOWN_INTERFACE_NAME));
        self.get_or_create_as(UNKNOWN_INTERFACE_NAME, UNKNOWN_INTERFACE_IDENTITY, &ty)
    }

    fn get_or_create_as(&mut self, name: &str, identity: &str, ty: &TypeDesc) -> Result<&Schema> {
        if let Some(existing) = self.identities.get(name) {
            if existing != identity {
                return Err(SchemaError::NameCollision {
                    name: name.to_string(),
                    existing: existing.clone(),
                    incoming: identity.to_string(),
                });
            }
            return Ok(&self.schemas[name]);
        }

        let (schema, cycles) = create_schema(name, ty, self.max_depth);
        debug!(schema = %name, properties = schema.properties.len(), "Registered schema");
        self.identities.insert(name.to_string(), identity.to_string());
        self.schemas.insert(name.to_string(), schema);

        for desc in cycles {
            let target = desc.name.clone();
            debug!(schema = %name, target = %target, "Registering referenced schema");
            self.get_or_create(&target, &TypeDesc::Struct(desc))?;
        }

        Ok(&self.schemas[name])
    }

    /// Returns the schema registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Returns `true` if a schema is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Iterates over `(name, schema)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }
}

fn create_schema(name: &str, ty: &TypeDesc, max_depth: usize) -> (Schema, Vec<StructDesc>) {
    let (mut schema, cycles) = synthesize_bounded(ty, max_depth);
    let desc = ty.as_struct();
    schema.description = Some(
        desc.and_then(|desc| desc.description.clone())
            .unwrap_or_else(|| format!("{name} schema")),
    );
    if let Some(root) = desc.and_then(|desc| desc.xml_name.clone()) {
        schema.xml = Some(Xml {
            name: Some(root),
            attribute: false,
        });
    }
    annotate(ty, &mut schema);
    (schema, cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldDesc, Reflect, SchemaKind, TypeRef};

    #[test]
    fn test_custom_description_replaces_default() {
        let ty: TypeDesc = StructDesc::new("Health").describe("Service health").into();
        let mut registry = SchemaRegistry::new();
        let schema = registry.get_or_create("Health", &ty).unwrap();
        assert_eq!(schema.description.as_deref(), Some("Service health"));
    }

    #[test]
    fn test_second_call_does_not_reannotate() {
        let ty: TypeDesc = StructDesc::new("Input")
            .field(FieldDesc::of::<String>("Name").tags(r#"json:"name" validate:"required""#))
            .into();
        let mut registry = SchemaRegistry::new();
        registry.get_or_create("Input", &ty).unwrap();
        let schema = registry.get_or_create("Input", &ty).unwrap();
        assert_eq!(schema.required, vec!["name"]);
    }

    #[test]
    fn test_xml_root_names_the_schema() {
        let ty: TypeDesc = StructDesc::new("MyOutput").xml_root("Output").into();
        let mut registry = SchemaRegistry::new();
        let schema = registry.get_or_create("MyOutput", &ty).unwrap();
        let xml = schema.xml.as_ref().unwrap();
        assert_eq!(xml.name.as_deref(), Some("Output"));
        assert!(!xml.attribute);
    }

    #[test]
    fn test_recursive_field_struct_is_registered() {
        fn inner() -> TypeDesc {
            StructDesc::new("Inner")
                .field(FieldDesc::new("Next", TypeRef::new(next)))
                .into()
        }
        fn next() -> TypeDesc {
            TypeDesc::Pointer(TypeRef::new(inner))
        }
        let outer: TypeDesc = StructDesc::new("Outer")
            .field(FieldDesc::new("Inner", TypeRef::new(inner)).tags(r#"json:"inner""#))
            .into();

        let mut registry = SchemaRegistry::new();
        registry.get_or_create("Outer", &outer).unwrap();
        assert_eq!(registry.names(), vec!["Inner", "Outer"]);

        let inner = registry.get("Inner").unwrap();
        assert_eq!(
            inner.properties["Next"].reference(),
            Some("#/components/schemas/Inner")
        );
    }

    #[test]
    fn test_recursive_field_struct_collision_is_reported() {
        fn inner() -> TypeDesc {
            StructDesc::new("Inner")
                .field(FieldDesc::new("Next", TypeRef::new(next)))
                .into()
        }
        fn next() -> TypeDesc {
            TypeDesc::Pointer(TypeRef::new(inner))
        }
        let outer: TypeDesc = StructDesc::new("Outer")
            .field(FieldDesc::new("Inner", TypeRef::new(inner)))
            .into();
        let mut other = StructDesc::new("Inner");
        other.identity = "other::Inner".into();

        let mut registry = SchemaRegistry::new();
        registry.get_or_create("Inner", &other.into()).unwrap();
        let err = registry.get_or_create("Outer", &outer).unwrap_err();
        assert!(matches!(err, SchemaError::NameCollision { ref name, .. } if name == "Inner"));
    }

    #[test]
    fn test_primitive_registers_under_its_name() {
        let mut registry = SchemaRegistry::new();
        let schema = registry.get_or_create("String", &String::type_desc()).unwrap();
        assert!(schema.is(SchemaKind::String));
        assert_eq!(schema.description.as_deref(), Some("String schema"));
    }

    #[test]
    fn test_name_collision_is_rejected() {
        let first: TypeDesc = StructDesc::new("Item").into();
        let mut second = StructDesc::new("Item");
        second.identity = "other::Item".into();
        let second: TypeDesc = second.into();

        let mut registry = SchemaRegistry::new();
        registry.get_or_create("Item", &first).unwrap();
        let err = registry.get_or_create("Item", &second).unwrap_err();
        assert!(matches!(err, SchemaError::NameCollision { ref name, .. } if name == "Item"));
    }

    #[test]
    fn test_reserved_names_are_rejected() {
        let mut registry = SchemaRegistry::new();
        for name in [DEPTH_SENTINEL_NAME, UNKNOWN_INTERFACE_NAME] {
            let ty: TypeDesc = StructDesc::new(name).into();
            let err = registry.get_or_create(name, &ty).unwrap_err();
            assert!(matches!(err, SchemaError::ReservedName(_)));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_interface_is_empty_object() {
        let mut registry = SchemaRegistry::new();
        let schema = registry.unknown_interface().unwrap().clone();
        assert!(schema.is(SchemaKind::Object));
        assert!(schema.properties.is_empty());
        assert!(registry.contains(UNKNOWN_INTERFACE_NAME));
    }

    #[test]
    fn test_serializes_as_schema_map() {
        let mut registry = SchemaRegistry::new();
        registry.get_or_create("bool", &bool::type_desc()).unwrap();
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json["bool"]["type"], "boolean");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }
}
