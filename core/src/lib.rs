//! Schema synthesis for API documentation.
//!
//! This crate derives OpenAPI component schemas from type descriptions:
//!
//! - [`Reflect`] / [`TypeDesc`]: explicit description of a type's shape,
//!   including struct fields with Go-style [`FieldTags`].
//! - [`resolve`]: the bounded type walker, turning a description into a
//!   [`SchemaTag`] (name, reference, schema value).
//! - [`SchemaRegistry`]: name-keyed store of component schemas, filled
//!   lazily by [`synthesize`] and [`annotate`].
//! - [`build_response`]: response descriptors for API operations.
//! - [`Parameter`] / [`RequestBody`]: the request side of an operation.
//! - [`ApiBuilder`]: assembles an [`OpenApiDocument`].
//!
//! Validation ([`validate_registry`], [`validate_document`]) reports
//! truncated types and dangling references before a document is emitted.
//!
//! # Example
//!
//! ```
//! use schema_synth_core::*;
//!
//! struct MyInput;
//!
//! impl Reflect for MyInput {
//!     fn type_desc() -> TypeDesc {
//!         StructDesc::of::<Self>("MyInput")
//!             .field(FieldDesc::of::<String>("Name").tags(
//!                 r#"json:"name" xml:"name,attr" example:"Napoleon" validate:"required,min=2,max=10" description:"The name of the user""#,
//!             ))
//!             .into()
//!     }
//! }
//!
//! let mut registry = SchemaRegistry::new();
//! let tag = schema_tag_for::<MyInput>(&mut registry, DEFAULT_MAX_DEPTH).unwrap();
//! assert_eq!(tag.reference.as_deref(), Some("#/components/schemas/MyInput"));
//!
//! let schema = registry.get("MyInput").unwrap();
//! assert_eq!(schema.required, vec!["name"]);
//!
//! let name = schema.properties["name"].as_inline().unwrap();
//! assert_eq!(name.min_length, Some(2));
//! assert_eq!(name.max_length, Some(10));
//! assert!(name.xml.as_ref().unwrap().attribute);
//! assert_eq!(name.description.as_deref(), Some("The name of the user"));
//! ```

mod annotate;
mod config;
mod document;
mod error;
mod reflect;
mod registry;
mod response;
mod synth;
pub mod tags;
mod types;
mod validate;
mod walker;

pub use annotate::annotate;
pub use config::{DEFAULT_CONTENT_TYPE, ResponseConfig, SchemaConfig};
pub use document::{
    ApiBuilder, Components, Info, Method, OPENAPI_VERSION, OpenApiDocument, Operation, Parameter,
    ParameterLocation, RequestBody,
};
pub use error::{Result, SchemaError};
pub use reflect::{FieldDesc, PrimitiveDesc, PrimitiveKind, Reflect, StructDesc, TypeDesc, TypeRef};
pub use registry::SchemaRegistry;
#[allow(deprecated)]
pub use response::build_error_response;
pub use response::{ErrorItem, HttpError, MediaType, ResponseDescriptor, build_response};
pub use synth::synthesize;
pub use tags::{FieldTags, split_tag_value};
pub use types::*;
pub use validate::{ValidationError, validate_document, validate_registry};
pub use walker::{DEFAULT_MAX_DEPTH, resolve, schema_tag_for, schema_tag_from_type};
