//! Field-metadata annotation of synthesized schemas.
//!
//! [`annotate`] walks a struct's declared fields and enriches the matching
//! schema properties from their tags:
//!
//! | tag | schema effect |
//! |-----|---------------|
//! | `json:"name"` | property key (`-` skips the field) |
//! | `json:",omitempty"` | `nullable` |
//! | `xml:"name,attr"` | `xml.name`, `xml.attribute` (`-` skips the field) |
//! | `example:"..."` | `example` (parsed for integers) |
//! | `validate:"required"` | appended to `required` |
//! | `validate:"min=N,max=N"` | `minimum`/`maximum` (integers), `minLength`/`maxLength` (strings) |
//! | `description:"..."` | `description` |
//!
//! Annotation never fabricates a property: a field whose property is
//! missing from the schema is logged and skipped.

use serde_json::Value;
use tracing::{debug, warn};

use crate::tags::{DESCRIPTION_TAG, EXAMPLE_TAG, JSON_TAG, VALIDATE_TAG, XML_TAG, split_tag_value};
use crate::{FieldDesc, Schema, SchemaKind, TypeDesc, Xml};

/// Enriches `schema`'s properties from the field tags of `ty`.
///
/// One level of pointer indirection is followed. Non-struct types leave
/// the schema untouched. Embedded structs are annotated against the same
/// schema, so their properties are treated as the owner's.
///
/// # Examples
///
/// ```
/// use schema_synth_core::{FieldDesc, StructDesc, TypeDesc, annotate, synthesize};
///
/// let ty: TypeDesc = StructDesc::new("MyInput")
///     .field(
///         FieldDesc::of::<String>("Name")
///             .tags(r#"json:"name" xml:"name,attr" validate:"required,min=1,max=10" example:"Carmack""#),
///     )
///     .into();
///
/// let mut schema = synthesize(&ty);
/// annotate(&ty, &mut schema);
///
/// let name = schema.properties["name"].as_inline().unwrap();
/// assert_eq!(schema.required, vec!["name"]);
/// assert_eq!(name.min_length, Some(1));
/// assert_eq!(name.max_length, Some(10));
/// assert_eq!(name.example, Some("Carmack".into()));
/// assert!(name.xml.as_ref().unwrap().attribute);
/// ```
pub fn annotate(ty: &TypeDesc, schema: &mut Schema) {
    let resolved;
    let ty = match ty {
        TypeDesc::Pointer(target) => {
            resolved = target.resolve();
            &resolved
        }
        other => other,
    };

    let Some(desc) = ty.as_struct() else {
        return;
    };

    for field in &desc.fields {
        annotate_field(field, schema);
    }
}

fn annotate_field(field: &FieldDesc, schema: &mut Schema) {
    if field.embedded {
        annotate(&field.ty.resolve(), schema);
        return;
    }

    let (json_name, json_options) = split_tag_value(field.tags.get(JSON_TAG));
    if json_name == "-" {
        return;
    }
    let name = if json_name.is_empty() {
        field.name.as_str()
    } else {
        json_name
    };

    let Some(original) = schema.properties.get(name) else {
        warn!(property = %name, "Property not found in schema");
        return;
    };

    // The XML skip happens after the lookup and discards the whole field.
    if let Some(xml_tag) = field.tags.lookup(XML_TAG) {
        if split_tag_value(xml_tag).0 == "-" {
            return;
        }
    }

    let mut property = original.clone();
    match property.as_inline_mut() {
        Some(inline) => {
            annotate_property(field, inline);
            if json_options.contains(&"omitempty") {
                inline.nullable = true;
            }
        }
        None => debug!(property = %name, "Property is a reference, skipping property tags"),
    }

    if let Some(validate) = field.tags.lookup(VALIDATE_TAG) {
        if validate.split(',').any(|directive| directive == "required") {
            schema.required.push(name.to_string());
        }
    }

    schema.properties.insert(name.to_string(), property);
}

fn annotate_property(field: &FieldDesc, property: &mut Schema) {
    if let Some(xml_tag) = field.tags.lookup(XML_TAG) {
        let (xml_name, xml_options) = split_tag_value(xml_tag);
        let xml_name = if xml_name.is_empty() {
            field.name.as_str()
        } else {
            xml_name
        };
        property.xml = Some(Xml {
            name: Some(xml_name.to_string()),
            attribute: xml_options.contains(&"attr"),
        });
    }

    if let Some(example) = field.tags.lookup(EXAMPLE_TAG) {
        property.example = Some(example_value(example, property));
    }

    for directive in field.tags.get(VALIDATE_TAG).split(',') {
        if let Some(raw) = directive.strip_prefix("min=") {
            apply_bound(property, Bound::Min, raw);
        } else if let Some(raw) = directive.strip_prefix("max=") {
            apply_bound(property, Bound::Max, raw);
        }
    }

    if let Some(description) = field.tags.lookup(DESCRIPTION_TAG) {
        property.description = Some(description.to_string());
    }
}

/// Integer properties get a parsed example. An unparseable literal still
/// yields `0`.
fn example_value(example: &str, property: &Schema) -> Value {
    if !property.is(SchemaKind::Integer) {
        return Value::String(example.to_string());
    }

    match example.parse::<i64>() {
        Ok(number) => Value::from(number),
        Err(err) => {
            warn!(example = %example, error = %err, "Example might be incorrect (should be integer)");
            Value::from(0)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Min,
    Max,
}

fn apply_bound(property: &mut Schema, bound: Bound, raw: &str) {
    let value = match raw.parse::<i64>() {
        Ok(value) => value,
        Err(err) => {
            warn!(bound = ?bound, value = %raw, error = %err, "Bound might be incorrect (should be integer)");
            return;
        }
    };

    match property.kind {
        Some(SchemaKind::Integer) => {
            let value = Some(value as f64);
            match bound {
                Bound::Min => property.minimum = value,
                Bound::Max => property.maximum = value,
            }
        }
        Some(SchemaKind::String) => {
            let Ok(length) = u64::try_from(value) else {
                warn!(bound = ?bound, value, "Length bound cannot be negative");
                return;
            };
            match bound {
                Bound::Min => property.min_length = Some(length),
                Bound::Max => property.max_length = Some(length),
            }
        }
        Some(
            SchemaKind::Object | SchemaKind::Array | SchemaKind::Number | SchemaKind::Boolean,
        )
        | None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldDesc, Reflect, StructDesc, synthesize};

    fn annotated(ty: &TypeDesc) -> Schema {
        let mut schema = synthesize(ty);
        annotate(ty, &mut schema);
        schema
    }

    fn property<'a>(schema: &'a Schema, name: &str) -> &'a Schema {
        schema.properties[name].as_inline().unwrap()
    }

    #[test]
    fn test_integer_example_is_parsed() {
        let ty: TypeDesc = StructDesc::new("Page")
            .field(FieldDesc::of::<i32>("Number").tags(r#"json:"number" example:"42""#))
            .into();
        assert_eq!(property(&annotated(&ty), "number").example, Some(Value::from(42)));
    }

    #[test]
    fn test_bad_integer_example_becomes_zero() {
        let ty: TypeDesc = StructDesc::new("Page")
            .field(FieldDesc::of::<i32>("Number").tags(r#"json:"number" example:"forty""#))
            .into();
        assert_eq!(property(&annotated(&ty), "number").example, Some(Value::from(0)));
    }

    #[test]
    fn test_integer_bounds_set_minimum_and_maximum() {
        let ty: TypeDesc = StructDesc::new("Page")
            .field(FieldDesc::of::<i64>("Size").tags(r#"json:"size" validate:"min=1,max=100""#))
            .into();
        let size = property(&annotated(&ty), "size").clone();
        assert_eq!(size.minimum, Some(1.0));
        assert_eq!(size.maximum, Some(100.0));
        assert_eq!(size.min_length, None);
    }

    #[test]
    fn test_unparseable_bound_is_ignored() {
        let ty: TypeDesc = StructDesc::new("Page")
            .field(FieldDesc::of::<String>("Token").tags(r#"json:"token" validate:"min=x,max=8""#))
            .into();
        let token = property(&annotated(&ty), "token").clone();
        assert_eq!(token.min_length, None);
        assert_eq!(token.max_length, Some(8));
    }

    #[test]
    fn test_bounds_ignored_for_other_kinds() {
        let ty: TypeDesc = StructDesc::new("Reading")
            .field(FieldDesc::of::<f64>("Value").tags(r#"json:"value" validate:"min=1""#))
            .field(FieldDesc::of::<bool>("Flag").tags(r#"json:"flag" validate:"max=1""#))
            .into();
        let schema = annotated(&ty);
        assert_eq!(property(&schema, "value").minimum, None);
        assert_eq!(property(&schema, "flag").maximum, None);
    }

    #[test]
    fn test_json_skip_happens_before_lookup() {
        let ty: TypeDesc = StructDesc::new("Hidden")
            .field(FieldDesc::of::<String>("Secret").tags(r#"json:"-" validate:"required""#))
            .into();
        let schema = annotated(&ty);
        assert!(schema.properties.is_empty());
        assert!(schema.required.is_empty());
    }

    #[test]
    fn test_xml_skip_discards_field_annotations() {
        let ty: TypeDesc = StructDesc::new("Hidden")
            .field(
                FieldDesc::of::<String>("Note")
                    .tags(r#"json:"note,omitempty" xml:"-" validate:"required" description:"kept out""#),
            )
            .into();
        let schema = annotated(&ty);
        let note = property(&schema, "note");
        assert!(note.xml.is_none());
        assert!(note.description.is_none());
        assert!(!note.nullable);
        assert!(schema.required.is_empty());
    }

    #[test]
    fn test_xml_name_falls_back_to_field_name() {
        let ty: TypeDesc = StructDesc::new("Doc")
            .field(FieldDesc::of::<String>("Title").tags(r#"json:"title" xml:",attr""#))
            .into();
        let xml = property(&annotated(&ty), "title").xml.clone().unwrap();
        assert_eq!(xml.name.as_deref(), Some("Title"));
        assert!(xml.attribute);
    }

    #[test]
    fn test_untagged_field_uses_declared_name() {
        let ty: TypeDesc = StructDesc::new("Doc")
            .field(FieldDesc::of::<String>("Body").tags(r#"description:"Main text""#))
            .into();
        assert_eq!(
            property(&annotated(&ty), "Body").description.as_deref(),
            Some("Main text")
        );
    }

    #[test]
    fn test_omitempty_marks_nullable() {
        let ty: TypeDesc = StructDesc::new("Doc")
            .field(FieldDesc::of::<String>("Body").tags(r#"json:"body,omitempty""#))
            .into();
        assert!(property(&annotated(&ty), "body").nullable);
    }

    #[test]
    fn test_missing_property_is_skipped() {
        let ty: TypeDesc = StructDesc::new("Doc")
            .field(FieldDesc::of::<String>("Body").tags(r#"json:"body" validate:"required""#))
            .into();
        let mut schema = Schema::object();
        annotate(&ty, &mut schema);
        assert!(schema.properties.is_empty());
        assert!(schema.required.is_empty());
    }

    #[test]
    fn test_non_struct_is_untouched() {
        let mut schema = Schema::of_kind(SchemaKind::String);
        annotate(&String::type_desc(), &mut schema);
        assert_eq!(schema, Schema::of_kind(SchemaKind::String));
    }

    struct Base;

    impl Reflect for Base {
        fn type_desc() -> TypeDesc {
            StructDesc::of::<Self>("Base")
                .field(FieldDesc::of::<String>("Id").tags(r#"json:"id" validate:"required""#))
                .into()
        }
    }

    #[test]
    fn test_embedded_required_is_not_deduplicated() {
        let ty: TypeDesc = StructDesc::new("Derived")
            .field(FieldDesc::embed::<Base>())
            .field(FieldDesc::embed::<Box<Base>>())
            .into();
        let schema = annotated(&ty);
        assert_eq!(schema.required, vec!["id", "id"]);
    }

    struct Node;

    impl Reflect for Node {
        fn type_desc() -> TypeDesc {
            StructDesc::of::<Self>("Node")
                .field(
                    FieldDesc::of::<Box<Node>>("Next")
                        .tags(r#"json:"next" validate:"required" description:"lost on refs""#),
                )
                .into()
        }
    }

    #[test]
    fn test_reference_property_keeps_schema_level_effects() {
        let schema = annotated(&Node::type_desc());
        assert_eq!(
            schema.properties["next"].reference(),
            Some("#/components/schemas/Node")
        );
        assert_eq!(schema.required, vec!["next"]);
    }
}
