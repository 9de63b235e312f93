//! Demo API described by the CLI.

use std::marker::PhantomData;

use schema_synth_core::{
    ApiBuilder, FieldDesc, HttpError, Info, Method, OpenApiDocument, Operation, Parameter,
    Reflect, SchemaConfig, StructDesc, TypeDesc,
};

pub struct Health;

pub struct MyInput;

pub struct MyValue;

pub struct MyOutput;

/// Either a rendered template or raw data. Documented as the data only.
pub struct DataOrTemplate<T>(PhantomData<T>);

impl Reflect for Health {
    fn type_desc() -> TypeDesc {
        StructDesc::of::<Self>("Health")
            .describe("Service health")
            .field(
                FieldDesc::of::<String>("Status")
                    .tags(r#"json:"status" xml:"Status,attr" example:"ok""#),
            )
            .field(FieldDesc::of::<MyInput>("Input").tags(r#"json:"input" xml:"input""#))
            .into()
    }
}

impl Reflect for MyInput {
    fn type_desc() -> TypeDesc {
        StructDesc::of::<Self>("MyInput")
            .field(FieldDesc::of::<String>("Name").tags(
                r#"json:"name" xml:"name,attr" validate:"required,min=1,max=64" example:"Hello, Carmack" description:"Name of the caller""#,
            ))
            .field(FieldDesc::of::<Vec<MyValue>>("Values").tags(r#"json:"values" xml:"values""#))
            .into()
    }
}

impl Reflect for MyValue {
    fn type_desc() -> TypeDesc {
        StructDesc::of::<Self>("MyValue")
            .field(
                FieldDesc::of::<String>("Value")
                    .tags(r#"json:"value" xml:"value,attr" example:"example value""#),
            )
            .into()
    }
}

impl Reflect for MyOutput {
    fn type_desc() -> TypeDesc {
        StructDesc::of::<Self>("MyOutput")
            .xml_root("Output")
            .field(
                FieldDesc::of::<String>("Data")
                    .tags(r#"json:"data" xml:"data,attr" example:"example data""#),
            )
            .field(FieldDesc::of::<MyInput>("Message").tags(r#"json:"message" xml:"message""#))
            .into()
    }
}

impl<T: Reflect + 'static> Reflect for DataOrTemplate<T> {
    fn type_desc() -> TypeDesc {
        StructDesc::of::<Self>("DataOrTemplate")
            .payload(FieldDesc::of::<T>("Data"))
            .field(FieldDesc::of::<String>("Template").tags(r#"json:"-""#))
            .into()
    }
}

/// Builds the demo API document.
pub fn build(config: SchemaConfig) -> schema_synth_core::Result<OpenApiDocument> {
    let mut api = ApiBuilder::new(
        Info::new("My API", "1.0.0").with_description("This is a sample server."),
        config,
    );

    let mut health = Operation::new()
        .with_operation_id("health")
        .with_summary("Returns a status message")
        .with_description("Health check")
        .with_tag("health");
    api.add_response(
        &mut health,
        200,
        "Health check",
        &["application/xml", "application/json"],
        Some(&Health::type_desc()),
    )?;
    api.route(Method::Get, "/health", health);

    let mut user = Operation::new()
        .with_summary("This is my summary")
        .with_description("This route does something...")
        .with_tag("MyTag")
        .with_parameter(Parameter::path("user", "", &String::type_desc()))
        .with_parameter(
            Parameter::query("name", "Declares a query parameter", &String::type_desc())
                .with_example("Carmack".into()),
        )
        .with_parameter(
            Parameter::header("Authorization", "Bearer token", &String::type_desc()).required(),
        )
        .with_parameter(
            Parameter::query("page", "Page number", &i64::type_desc()).with_example(1.into()),
        )
        .with_parameter(Parameter::query(
            "perPage",
            "Number of items per page",
            &i64::type_desc(),
        ));
    api.request_body(
        &mut user,
        "Request body",
        &["application/json", "application/xml"],
        Some(&MyInput::type_desc()),
    )?;
    api.add_response(
        &mut user,
        200,
        "OK",
        &["application/json", "application/xml"],
        Some(&DataOrTemplate::<MyOutput>::type_desc()),
    )?;
    api.add_response(
        &mut user,
        400,
        "Bad Request",
        &[],
        Some(&HttpError::type_desc()),
    )?;
    api.route(Method::Post, "/user/{user}", user);

    Ok(api.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_registers_expected_schemas() {
        let doc = build(SchemaConfig::default()).unwrap();
        assert_eq!(
            doc.components.schemas.names(),
            vec!["HTTPError", "Health", "MyInput", "MyOutput"]
        );
        assert!(schema_synth_core::validate_document(&doc).is_empty());
    }

    #[test]
    fn test_user_route_documents_request_side() {
        let doc = build(SchemaConfig::default()).unwrap();
        let user = &doc.paths["/user/{user}"]["post"];

        let names: Vec<_> = user.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["user", "name", "Authorization", "page", "perPage"]);
        assert!(user.parameters[2].required);

        let body = user.request_body.as_ref().unwrap();
        assert_eq!(
            body.content["application/json"].schema.reference(),
            Some("#/components/schemas/MyInput")
        );

        let output = doc.components.schemas.get("MyOutput").unwrap();
        assert_eq!(output.xml.as_ref().unwrap().name.as_deref(), Some("Output"));
    }
}
