//! Registry validation.
//!
//! Walks registered schemas (and, for a whole document, response schemas)
//! and reports references that will not resolve in the emitted document:
//! references to the depth sentinel and to components that were never
//! registered.
//!
//! # Examples
//!
//! ```
//! use schema_synth_core::*;
//!
//! let mut registry = SchemaRegistry::new();
//! schema_tag_for::<Vec<String>>(&mut registry, DEFAULT_MAX_DEPTH).unwrap();
//! assert!(validate_registry(&registry).is_empty());
//!
//! // A nested struct pointing at itself is referenced by name and
//! // registered alongside the schema that contains it.
//! fn inner() -> TypeDesc {
//!     StructDesc::new("Inner")
//!         .field(FieldDesc::new("Next", TypeRef::new(|| TypeDesc::Pointer(TypeRef::new(inner)))))
//!         .into()
//! }
//! let outer: TypeDesc = StructDesc::new("Outer")
//!     .field(FieldDesc::new("Inner", TypeRef::new(inner)))
//!     .into();
//! registry.get_or_create("Outer", &outer).unwrap();
//! assert!(registry.contains("Inner"));
//! assert!(validate_registry(&registry).is_empty());
//!
//! // A pointer to itself never reaches a struct and runs out of budget.
//! fn link() -> TypeDesc {
//!     TypeDesc::Pointer(TypeRef::new(link))
//! }
//! let holder: TypeDesc = StructDesc::new("Holder")
//!     .field(FieldDesc::new("Link", TypeRef::new(link)))
//!     .into();
//! registry.get_or_create("Holder", &holder).unwrap();
//!
//! let errors = validate_registry(&registry);
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::DepthTruncated("Holder.properties.Link".into())]
//! );
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    COMPONENTS_SCHEMAS_PREFIX, DEPTH_SENTINEL_NAME, MediaType, OpenApiDocument, Schema, SchemaRef,
    SchemaRegistry,
};

/// Registry validation findings.
///
/// Paths are dotted, starting at the component name, e.g.
/// `MyOutput.properties.values.items`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A reference to the depth sentinel: a walk ran out of budget.
    #[error("type truncated by depth budget at {0}")]
    DepthTruncated(String),
    /// A reference to a component missing from the registry.
    #[error("dangling reference {reference} at {path}")]
    DanglingReference {
        /// Location of the reference.
        path: String,
        /// The unresolved `$ref` value.
        reference: String,
    },
}

/// Validates every schema in `registry`.
///
/// Findings are reported in component name order. The walk does not stop
/// at the first finding.
pub fn validate_registry(registry: &SchemaRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (name, schema) in registry.iter() {
        let mut path = vec![name.to_string()];
        validate_schema(registry, schema, &mut path, &mut errors);
    }
    errors
}

/// Validates a finished document: its components, then the parameter,
/// request body and response schemas under `paths`.
///
/// Operation schemas are where truncated collections show up, since the
/// walker never registers array schemas.
pub fn validate_document(document: &OpenApiDocument) -> Vec<ValidationError> {
    let registry = &document.components.schemas;
    let mut errors = validate_registry(registry);

    for (route, operations) in &document.paths {
        for (method, operation) in operations {
            let mut path = vec!["paths".to_string(), route.clone(), method.clone()];

            for parameter in &operation.parameters {
                path.extend([
                    "parameters".to_string(),
                    parameter.name.clone(),
                    "schema".to_string(),
                ]);
                validate_ref(registry, &parameter.schema, &mut path, &mut errors);
                path.truncate(3);
            }

            if let Some(body) = &operation.request_body {
                path.push("requestBody".to_string());
                validate_content(registry, &body.content, &mut path, &mut errors);
                path.truncate(3);
            }

            for (code, response) in &operation.responses {
                path.extend(["responses".to_string(), code.clone()]);
                validate_content(registry, &response.content, &mut path, &mut errors);
                path.truncate(3);
            }
        }
    }

    errors
}

fn validate_content(
    registry: &SchemaRegistry,
    content: &BTreeMap<String, MediaType>,
    path: &mut Vec<String>,
    errors: &mut Vec<ValidationError>,
) {
    for (content_type, media) in content {
        path.extend([
            "content".to_string(),
            content_type.clone(),
            "schema".to_string(),
        ]);
        validate_ref(registry, &media.schema, path, errors);
        path.truncate(path.len() - 3);
    }
}

fn validate_schema(
    registry: &SchemaRegistry,
    schema: &Schema,
    path: &mut Vec<String>,
    errors: &mut Vec<ValidationError>,
) {
    for (property, value) in &schema.properties {
        path.push("properties".to_string());
        path.push(property.clone());
        validate_ref(registry, value, path, errors);
        path.truncate(path.len() - 2);
    }

    if let Some(items) = &schema.items {
        path.push("items".to_string());
        validate_ref(registry, items, path, errors);
        path.pop();
    }

    if let Some(values) = &schema.additional_properties {
        path.push("additionalProperties".to_string());
        validate_ref(registry, values, path, errors);
        path.pop();
    }
}

fn validate_ref(
    registry: &SchemaRegistry,
    value: &SchemaRef,
    path: &mut Vec<String>,
    errors: &mut Vec<ValidationError>,
) {
    match value {
        SchemaRef::Inline(schema) => validate_schema(registry, schema, path, errors),
        SchemaRef::Ref { reference } => {
            let target = reference.strip_prefix(COMPONENTS_SCHEMAS_PREFIX);
            if target == Some(DEPTH_SENTINEL_NAME) {
                errors.push(ValidationError::DepthTruncated(path.join(".")));
            } else if !target.is_some_and(|name| registry.contains(name)) {
                errors.push(ValidationError::DanglingReference {
                    path: path.join("."),
                    reference: reference.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ApiBuilder, FieldDesc, Info, Method, Operation, Parameter, Reflect, SchemaConfig,
        StructDesc, TypeDesc, TypeRef,
    };

    fn wide() -> TypeDesc {
        StructDesc::new("Wide")
            .field(FieldDesc::of::<Vec<Vec<Vec<Vec<bool>>>>>("Deep"))
            .into()
    }

    fn inner() -> TypeDesc {
        StructDesc::new("Inner")
            .field(FieldDesc::new("Next", TypeRef::new(next)))
            .into()
    }

    fn next() -> TypeDesc {
        TypeDesc::Pointer(TypeRef::new(inner))
    }

    fn outer() -> TypeDesc {
        StructDesc::new("Outer")
            .field(FieldDesc::new("Inner", TypeRef::new(inner)))
            .into()
    }

    #[test]
    fn test_registered_references_are_valid() {
        let ty: TypeDesc = StructDesc::new("Parent")
            .field(FieldDesc::of::<String>("Name").tags(r#"json:"name""#))
            .into();
        let mut registry = SchemaRegistry::new();
        registry.get_or_create("Parent", &ty).unwrap();
        registry.get_or_create("bool", &bool::type_desc()).unwrap();
        assert!(validate_registry(&registry).is_empty());
    }

    #[test]
    fn test_sentinel_reference_is_depth_truncated() {
        let registry = SchemaRegistry::new();
        let mut schema = Schema::object();
        schema
            .properties
            .insert("deep".into(), SchemaRef::component(DEPTH_SENTINEL_NAME));
        let mut path = vec!["Holder".to_string()];
        let mut errors = Vec::new();
        validate_schema(&registry, &schema, &mut path, &mut errors);

        assert_eq!(
            errors,
            vec![ValidationError::DepthTruncated("Holder.properties.deep".to_string())]
        );
        assert_eq!(path, vec!["Holder"]);
    }

    #[test]
    fn test_document_response_schemas_are_checked() {
        let mut api = ApiBuilder::new(Info::new("t", "1"), SchemaConfig::default());
        let mut op = Operation::new();
        api.add_response(
            &mut op,
            200,
            "Deep",
            &["application/json"],
            Some(&Vec::<Vec<Vec<Vec<Vec<bool>>>>>::type_desc()),
        )
        .unwrap();
        api.route(Method::Get, "/deep", op);

        let errors = validate_document(&api.build());
        assert_eq!(
            errors,
            vec![ValidationError::DepthTruncated(
                "paths./deep.get.responses.200.content.application/json.schema.items.items.items.items.items"
                    .to_string()
            )]
        );
    }

    #[test]
    fn test_request_side_schemas_are_checked() {
        let config = SchemaConfig {
            max_depth: 2,
            ..SchemaConfig::default()
        };
        let mut api = ApiBuilder::new(Info::new("t", "1"), config);
        let mut op = Operation::new().with_parameter(Parameter::query(
            "ids",
            "",
            &Vec::<Vec<Vec<Vec<Vec<Vec<i64>>>>>>::type_desc(),
        ));
        api.request_body(
            &mut op,
            "",
            &["application/json"],
            Some(&Vec::<Vec<bool>>::type_desc()),
        )
        .unwrap();
        api.route(Method::Put, "/items", op);

        let errors = validate_document(&api.build());
        assert_eq!(
            errors,
            vec![
                ValidationError::DepthTruncated(
                    "paths./items.put.parameters.ids.schema.items.items.items.items.items".into()
                ),
                ValidationError::DepthTruncated(
                    "paths./items.put.requestBody.content.application/json.schema.items.items"
                        .into()
                ),
            ]
        );
    }

    #[test]
    fn test_nested_inline_schemas_are_walked() {
        let mut registry = SchemaRegistry::new();
        registry.get_or_create("Wide", &wide()).unwrap();
        let errors = validate_registry(&registry);
        assert!(errors.is_empty(), "synthesized arrays are fully inline: {errors:?}");

        let mut schema = Schema::object();
        schema.properties.insert(
            "values".into(),
            SchemaRef::inline(Schema::array(SchemaRef::component("Missing"))),
        );
        let mut path = vec!["Outer".to_string()];
        let mut errors = Vec::new();
        validate_schema(&registry, &schema, &mut path, &mut errors);
        assert_eq!(
            errors,
            vec![ValidationError::DanglingReference {
                path: "Outer.properties.values.items".to_string(),
                reference: "#/components/schemas/Missing".to_string(),
            }]
        );
    }

    #[test]
    fn test_nested_recursive_struct_resolves() {
        let mut registry = SchemaRegistry::new();
        registry.get_or_create("Outer", &outer()).unwrap();
        assert_eq!(registry.names(), vec!["Inner", "Outer"]);
        assert!(validate_registry(&registry).is_empty());
    }

    #[test]
    fn test_document_with_nested_recursive_struct_is_valid() {
        let mut api = ApiBuilder::new(Info::new("t", "1"), SchemaConfig::default());
        let mut op = Operation::new();
        api.add_response(
            &mut op,
            200,
            "Outer",
            &["application/json"],
            Some(&outer()),
        )
        .unwrap();
        api.route(Method::Get, "/outer", op);

        let doc = api.build();
        assert_eq!(doc.components.schemas.names(), vec!["Inner", "Outer"]);
        assert!(validate_document(&doc).is_empty());
    }

    #[test]
    fn test_foreign_reference_is_dangling() {
        let mut schema = Schema::object();
        schema.additional_properties = Some(Box::new(SchemaRef::Ref {
            reference: "https://example.com/schema.json".to_string(),
        }));
        let registry = SchemaRegistry::new();
        let mut path = vec!["Map".to_string()];
        let mut errors = Vec::new();
        validate_schema(&registry, &schema, &mut path, &mut errors);
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::DanglingReference { path, .. }] if path == "Map.additionalProperties"
        ));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ValidationError::DepthTruncated("A.items".into()).to_string(),
            "type truncated by depth budget at A.items"
        );
    }
}
