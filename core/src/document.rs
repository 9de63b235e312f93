//! API-description assembly.
//!
//! [`ApiBuilder`] is the build context: it owns the [`SchemaRegistry`]
//! and [`SchemaConfig`] for one document, attaches responses to
//! operations and finally emits an [`OpenApiDocument`].
//!
//! # Example
//!
//! ```
//! use schema_synth_core::*;
//!
//! let mut api = ApiBuilder::new(Info::new("My API", "1.0.0"), SchemaConfig::default());
//!
//! let mut health = Operation::new().with_operation_id("health");
//! api.add_response(&mut health, 200, "Health check", &["application/json"], Some(&String::type_desc()))
//!     .unwrap();
//! api.route(Method::Get, "/health", health);
//!
//! let doc = api.build();
//! let json = serde_json::to_value(&doc).unwrap();
//! assert_eq!(
//!     json["paths"]["/health"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
//!     "#/components/schemas/String"
//! );
//! assert!(json["components"]["schemas"]["String"].is_object());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::{
    MediaType, ResponseDescriptor, SchemaConfig, SchemaRef, SchemaRegistry, SchemaTag, TypeDesc,
    build_response, schema_tag_from_type, synthesize,
};

/// OpenAPI version emitted in documents.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// Longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Info {
    /// Creates metadata with a title and version.
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: title.to_string(),
            version: version.to_string(),
            description: None,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl Method {
    /// Lowercase name used as the path item key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Path segment.
    Path,
    /// Cookie.
    Cookie,
}

/// A documented operation parameter.
///
/// Parameter schemas are synthesized inline and never registered.
///
/// # Examples
///
/// ```
/// use schema_synth_core::{Parameter, ParameterLocation, Reflect};
///
/// let page = Parameter::query("page", "Page number", &i64::type_desc()).with_example(1.into());
/// assert_eq!(page.location, ParameterLocation::Query);
/// assert!(!page.required);
///
/// let json = serde_json::to_value(&page).unwrap();
/// assert_eq!(json["in"], "query");
/// assert_eq!(json["schema"]["type"], "integer");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location of the parameter.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter must be supplied.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Value schema.
    pub schema: SchemaRef,
    /// Example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Parameter {
    /// Creates a parameter whose schema is synthesized from `ty`.
    ///
    /// Path parameters are always required.
    pub fn new(name: &str, location: ParameterLocation, description: &str, ty: &TypeDesc) -> Self {
        Self {
            name: name.to_string(),
            location,
            description: (!description.is_empty()).then(|| description.to_string()),
            required: location == ParameterLocation::Path,
            schema: SchemaRef::inline(synthesize(ty)),
            example: None,
        }
    }

    /// Creates a query parameter.
    pub fn query(name: &str, description: &str, ty: &TypeDesc) -> Self {
        Self::new(name, ParameterLocation::Query, description, ty)
    }

    /// Creates a header parameter.
    pub fn header(name: &str, description: &str, ty: &TypeDesc) -> Self {
        Self::new(name, ParameterLocation::Header, description, ty)
    }

    /// Creates a path parameter.
    pub fn path(name: &str, description: &str, ty: &TypeDesc) -> Self {
        Self::new(name, ParameterLocation::Path, description, ty)
    }

    /// Marks the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets an example value.
    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }
}

/// A documented request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the body must be supplied.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Media types keyed by content type.
    pub content: BTreeMap<String, MediaType>,
}

/// A documented API operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Short summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Grouping tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Query, header, path and cookie parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: BTreeMap<String, ResponseDescriptor>,
}

impl Operation {
    /// Creates an operation with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation identifier.
    pub fn with_operation_id(mut self, id: &str) -> Self {
        self.operation_id = Some(id.to_string());
        self
    }

    /// Sets the summary.
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Adds a parameter, replacing one with the same name and location.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters
            .retain(|p| p.name != parameter.name || p.location != parameter.location);
        self.parameters.push(parameter);
        self
    }

    /// Sets the response for `code`, replacing any previous one.
    pub fn add_response(&mut self, code: u16, response: ResponseDescriptor) {
        self.responses.insert(code.to_string(), response);
    }
}

/// `components` section of a document.
#[derive(Debug, Clone, Serialize)]
pub struct Components {
    /// Registered component schemas.
    pub schemas: SchemaRegistry,
}

/// A complete API description.
#[derive(Debug, Clone, Serialize)]
pub struct OpenApiDocument {
    /// OpenAPI version.
    pub openapi: String,
    /// Document metadata.
    pub info: Info,
    /// Operations keyed by path, then by method.
    pub paths: BTreeMap<String, BTreeMap<String, Operation>>,
    /// Reusable components.
    pub components: Components,
}

impl OpenApiDocument {
    /// Serializes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](crate::SchemaError::JsonError) if serialization
    /// fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](crate::SchemaError::YamlError) if serialization
    /// fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Build context for one API description.
#[derive(Debug, Clone)]
pub struct ApiBuilder {
    info: Info,
    config: SchemaConfig,
    registry: SchemaRegistry,
    paths: BTreeMap<String, BTreeMap<String, Operation>>,
}

impl ApiBuilder {
    /// Creates a build context with an empty registry bounded by the
    /// configured depth.
    pub fn new(info: Info, config: SchemaConfig) -> Self {
        Self {
            info,
            registry: SchemaRegistry::with_max_depth(config.max_depth),
            config,
            paths: BTreeMap::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Schemas registered so far.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Resolves a type with the configured depth budget.
    ///
    /// # Errors
    ///
    /// Propagates registry errors.
    pub fn schema_tag(&mut self, ty: Option<&TypeDesc>) -> Result<SchemaTag> {
        schema_tag_from_type(&mut self.registry, ty, self.config.max_depth)
    }

    /// Builds a response descriptor for `ty`.
    ///
    /// # Errors
    ///
    /// See [`build_response`].
    pub fn response(
        &mut self,
        description: &str,
        content_types: &[&str],
        ty: Option<&TypeDesc>,
    ) -> Result<ResponseDescriptor> {
        build_response(
            &mut self.registry,
            &self.config,
            description,
            content_types,
            ty,
        )
    }

    /// Builds a response for `ty` and sets it on `operation` under `code`.
    ///
    /// # Errors
    ///
    /// See [`build_response`].
    pub fn add_response(
        &mut self,
        operation: &mut Operation,
        code: u16,
        description: &str,
        content_types: &[&str],
        ty: Option<&TypeDesc>,
    ) -> Result<()> {
        let response = self.response(description, content_types, ty)?;
        operation.add_response(code, response);
        Ok(())
    }

    /// Resolves `ty` and sets it as the required request body of
    /// `operation`.
    ///
    /// An absent type documents the `unknown-interface` placeholder. When
    /// `content_types` is empty the configured default content type is
    /// used.
    ///
    /// # Errors
    ///
    /// Propagates registry errors.
    pub fn request_body(
        &mut self,
        operation: &mut Operation,
        description: &str,
        content_types: &[&str],
        ty: Option<&TypeDesc>,
    ) -> Result<()> {
        let tag = self.schema_tag(ty)?;
        let content_types = if content_types.is_empty() {
            vec![self.config.response.default_content_type.as_str()]
        } else {
            content_types.to_vec()
        };

        let schema = tag.schema_ref();
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

        debug!(schema = %tag.name, content_types = ?content_types, "Built request body");
        operation.request_body = Some(RequestBody {
            description: (!description.is_empty()).then(|| description.to_string()),
            required: true,
            content,
        });
        Ok(())
    }

    /// Sets an error response on `operation` under `code`.
    ///
    /// # Errors
    ///
    /// See [`build_error_response`](crate::build_error_response).
    #[deprecated(note = "use `ApiBuilder::add_response` instead")]
    pub fn add_error(
        &mut self,
        operation: &mut Operation,
        code: u16,
        description: &str,
        error_types: &[TypeDesc],
    ) -> Result<()> {
        #[allow(deprecated)]
        let response = crate::build_error_response(
            &mut self.registry,
            &self.config,
            description,
            error_types,
        )?;
        operation.add_response(code, response);
        Ok(())
    }

    /// Registers `operation` under `method` and `path`, replacing any
    /// existing one.
    pub fn route(&mut self, method: Method, path: &str, operation: Operation) {
        self.paths
            .entry(path.to_string())
            .or_default()
            .insert(method.as_str().to_string(), operation);
    }

    /// Finishes the build.
    pub fn build(self) -> OpenApiDocument {
        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            paths: self.paths,
            components: Components {
                schemas: self.registry,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reflect, SchemaError};

    #[test]
    fn test_add_response_replaces_same_code() {
        let mut api = ApiBuilder::new(Info::new("t", "1"), SchemaConfig::default());
        let mut op = Operation::new();
        api.add_response(&mut op, 200, "first", &[], Some(&bool::type_desc())).unwrap();
        api.add_response(&mut op, 200, "second", &[], Some(&i64::type_desc())).unwrap();
        assert_eq!(op.responses.len(), 1);
        assert_eq!(op.responses["200"].description, "second");
    }

    #[test]
    fn test_missing_type_leaves_operation_untouched() {
        let mut api = ApiBuilder::new(Info::new("t", "1"), SchemaConfig::default());
        let mut op = Operation::new();
        let err = api.add_response(&mut op, 200, "x", &[], None).unwrap_err();
        assert!(matches!(err, SchemaError::MissingResponseType));
        assert!(op.responses.is_empty());
    }

    #[test]
    #[allow(deprecated)]
    fn test_add_error_registers_http_error() {
        let mut api = ApiBuilder::new(Info::new("t", "1"), SchemaConfig::default());
        let mut op = Operation::new();
        api.add_error(&mut op, 400, "Bad request", &[]).unwrap();
        assert!(api.registry().contains("HTTPError"));
        assert!(op.responses["400"].content.contains_key("application/xml"));
    }

    #[test]
    fn test_configured_depth_is_used() {
        let config = SchemaConfig {
            max_depth: 1,
            ..SchemaConfig::default()
        };
        let mut api = ApiBuilder::new(Info::new("t", "1"), config);
        let tag = api.schema_tag(Some(&Option::<bool>::type_desc())).unwrap();
        assert!(tag.is_depth_sentinel());
    }

    #[test]
    fn test_request_body_goes_through_the_walker() {
        let mut api = ApiBuilder::new(Info::new("t", "1"), SchemaConfig::default());
        let mut op = Operation::new();
        api.request_body(
            &mut op,
            "",
            &["application/json"],
            Some(&Vec::<bool>::type_desc()),
        )
        .unwrap();

        let body = op.request_body.as_ref().unwrap();
        assert!(body.required);
        assert!(body.description.is_none());
        let schema = body.content["application/json"].schema.as_inline().unwrap();
        assert_eq!(
            schema.items.as_ref().unwrap().reference(),
            Some("#/components/schemas/bool")
        );
        assert!(api.registry().contains("bool"));
    }

    #[test]
    fn test_request_body_defaults() {
        let mut api = ApiBuilder::new(Info::new("t", "1"), SchemaConfig::default());
        let mut op = Operation::new();
        api.request_body(&mut op, "Anything", &[], None).unwrap();

        let json = serde_json::to_value(&op).unwrap();
        let body = &json["requestBody"];
        assert_eq!(body["description"], "Anything");
        assert_eq!(
            body["content"]["application/xml"]["schema"]["$ref"],
            "#/components/schemas/unknown-interface"
        );
    }

    #[test]
    fn test_parameters_serialize_inline() {
        let op = Operation::new()
            .with_parameter(Parameter::query("name", "Name to greet", &String::type_desc()))
            .with_parameter(
                Parameter::header("Authorization", "Bearer token", &String::type_desc()).required(),
            )
            .with_parameter(Parameter::path("user", "", &String::type_desc()));

        let json = serde_json::to_value(&op).unwrap();
        let params = json["parameters"].as_array().unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0]["in"], "query");
        assert!(params[0].get("required").is_none());
        assert_eq!(params[1]["in"], "header");
        assert_eq!(params[1]["required"], true);
        assert_eq!(params[2]["required"], true);
        assert!(params[2].get("description").is_none());
        assert_eq!(params[2]["schema"]["type"], "string");
    }

    #[test]
    fn test_parameter_with_same_name_and_location_is_replaced() {
        let op = Operation::new()
            .with_parameter(Parameter::query("page", "first", &i64::type_desc()))
            .with_parameter(Parameter::header("page", "header", &i64::type_desc()))
            .with_parameter(Parameter::query("page", "second", &i64::type_desc()));

        assert_eq!(op.parameters.len(), 2);
        assert_eq!(op.parameters[1].description.as_deref(), Some("second"));
    }

    #[test]
    fn test_document_yaml_has_components() {
        let mut api = ApiBuilder::new(
            Info::new("My API", "1.0.0").with_description("Sample"),
            SchemaConfig::default(),
        );
        let mut op = Operation::new().with_summary("Flag").with_tag("flags");
        api.add_response(
            &mut op,
            200,
            "ok",
            &["application/json"],
            Some(&bool::type_desc()),
        )
        .unwrap();
        api.route(Method::Post, "/flag", op);

        let yaml = api.build().to_yaml().unwrap();
        assert!(yaml.contains("openapi: 3.0.3"));
        assert!(yaml.contains("post:"));
        assert!(yaml.contains("bool:"));
    }
}
