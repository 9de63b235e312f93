//! Response descriptors attached to API operations.
//!
//! A [`ResponseDescriptor`] pairs a description with one media type entry
//! per content type, all pointing at the same schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::{FieldDesc, Reflect, SchemaConfig, SchemaRef, SchemaRegistry, StructDesc, TypeDesc};

/// Schema of one content type in a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Response body schema.
    pub schema: SchemaRef,
}

/// A documented response: description plus content-type → schema map.
///
/// # Examples
///
/// ```
/// use schema_synth_core::{Reflect, SchemaConfig, SchemaRegistry, build_response};
///
/// let mut registry = SchemaRegistry::new();
/// let response = build_response(
///     &mut registry,
///     &SchemaConfig::default(),
///     "Greeting",
///     &["application/json", "application/xml"],
///     Some(&String::type_desc()),
/// )
/// .unwrap();
///
/// assert_eq!(response.content.len(), 2);
/// assert_eq!(
///     response.content["application/json"].schema,
///     response.content["application/xml"].schema,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    /// Human-readable description.
    pub description: String,
    /// Media types keyed by content type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

impl ResponseDescriptor {
    /// Creates a descriptor that maps every content type to `schema`.
    pub fn new(description: &str, content_types: &[&str], schema: &SchemaRef) -> Self {
        let content = content_types
            .iter()
            .map(|content_type| {
                (
                    content_type.to_string(),
                    MediaType {
                        schema: schema.clone(),
                    },
                )
            })
            .collect();

        Self {
            description: description.to_string(),
            content,
        }
    }
}

/// Builds a response descriptor for `ty`.
///
/// When `content_types` is empty the configured default content type is
/// used.
///
/// # Errors
///
/// Returns [`SchemaError::MissingResponseType`] if `ty` is `None`, and
/// propagates registry errors.
pub fn build_response(
    registry: &mut SchemaRegistry,
    config: &SchemaConfig,
    description: &str,
    content_types: &[&str],
    ty: Option<&TypeDesc>,
) -> Result<ResponseDescriptor> {
    let ty = ty.ok_or(SchemaError::MissingResponseType)?;
    let tag = crate::resolve(registry, ty, config.max_depth)?;

    let default_content_type = [config.response.default_content_type.as_str()];
    let content_types = if content_types.is_empty() {
        &default_content_type[..]
    } else {
        content_types
    };

    debug!(schema = %tag.name, content_types = ?content_types, "Built response");
    Ok(ResponseDescriptor::new(
        description,
        content_types,
        &tag.schema_ref(),
    ))
}

/// Builds an error response for at most one error type.
///
/// Without an error type the built-in [`HttpError`] schema is used. The
/// response always carries the configured default content type.
///
/// # Errors
///
/// Returns [`SchemaError::TooManyErrorTypes`] if more than one type is
/// supplied, and propagates registry errors.
#[deprecated(note = "use `build_response` with an explicit error type instead")]
pub fn build_error_response(
    registry: &mut SchemaRegistry,
    config: &SchemaConfig,
    description: &str,
    error_types: &[TypeDesc],
) -> Result<ResponseDescriptor> {
    let ty = match error_types {
        [] => HttpError::type_desc(),
        [ty] => ty.clone(),
        _ => return Err(SchemaError::TooManyErrorTypes(error_types.len())),
    };
    build_response(registry, config, description, &[], Some(&ty))
}

/// Built-in generic error body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpError {
    /// URL of the error type.
    pub error_type: String,
    /// Short title of the error.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Human readable error message.
    pub detail: String,
    /// Occurrence identifier.
    pub instance: String,
    /// Per-item failures.
    pub errors: Vec<ErrorItem>,
}

/// One failure inside an [`HttpError`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorItem {
    /// Name of the offending item, such as a parameter.
    pub name: String,
    /// Human readable error message.
    pub reason: String,
    /// Additional information.
    pub more: BTreeMap<String, String>,
}

impl Reflect for HttpError {
    fn type_desc() -> TypeDesc {
        StructDesc::of::<Self>("HTTPError")
            .field(FieldDesc::of::<String>("Type").tags(
                r#"json:"type,omitempty" xml:"type,omitempty" description:"URL of the error type. Can be used to lookup the error in a documentation""#,
            ))
            .field(FieldDesc::of::<String>("Title").tags(
                r#"json:"title,omitempty" xml:"title,omitempty" description:"Short title of the error""#,
            ))
            .field(FieldDesc::of::<u16>("Status").tags(
                r#"json:"status,omitempty" xml:"status,omitempty" description:"HTTP status code" example:"403""#,
            ))
            .field(FieldDesc::of::<String>("Detail").tags(
                r#"json:"detail,omitempty" xml:"detail,omitempty" description:"Human readable error message""#,
            ))
            .field(
                FieldDesc::of::<String>("Instance")
                    .tags(r#"json:"instance,omitempty" xml:"instance,omitempty""#),
            )
            .field(
                FieldDesc::of::<Vec<ErrorItem>>("Errors")
                    .tags(r#"json:"errors,omitempty" xml:"errors,omitempty""#),
            )
            .into()
    }
}

impl Reflect for ErrorItem {
    fn type_desc() -> TypeDesc {
        StructDesc::of::<Self>("ErrorItem")
            .field(FieldDesc::of::<String>("Name").tags(
                r#"json:"name" xml:"name" description:"For example, name of the parameter that caused the error""#,
            ))
            .field(FieldDesc::of::<String>("Reason").tags(
                r#"json:"reason" xml:"reason" description:"Human readable error message""#,
            ))
            .field(FieldDesc::of::<BTreeMap<String, String>>("More").tags(
                r#"json:"more,omitempty" xml:"more,omitempty" description:"Additional information about the error""#,
            ))
            .into()
    }
}
