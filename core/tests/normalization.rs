use pretty_assertions::assert_eq;
use s2r_core::{
    normalize_value, parse_document, AppError, DocumentSource, HttpMethod, SchemaKind,
    SpecVersion,
};
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

const PETS_SWAGGER2: &str = r#"
swagger: "2.0"
info: {title: Pets, version: "1.0"}
basePath: /api
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - name: limit
          in: query
          description: Page size
          type: integer
          format: int32
          maximum: 100
        - name: status
          in: query
          type: array
          items: {type: string, enum: [available, sold]}
      responses:
        '200':
          description: ok
          schema:
            type: array
            items: {$ref: '#/definitions/Pet'}
  /pets/{petId}:
    parameters:
      - {name: petId, in: path, type: string}
    get:
      responses:
        '200':
          description: ok
          schema: {$ref: '#/definitions/Pet'}
definitions:
  Pet:
    type: object
    required: [id]
    properties:
      id: {type: integer, format: int64}
      name: {type: string}
"#;

const PETS_OAS3: &str = r#"
openapi: 3.0.3
info: {title: Pets, version: "1.0"}
servers:
  - url: /api
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - name: limit
          in: query
          description: Page size
          schema: {type: integer, format: int32, maximum: 100}
        - name: status
          in: query
          schema:
            type: array
            items: {type: string, enum: [available, sold]}
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: array
                items: {$ref: '#/components/schemas/Pet'}
  /pets/{petId}:
    parameters:
      - name: petId
        in: path
        required: true
        schema: {type: string}
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pet'}
components:
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id: {type: integer, format: int64}
        name: {type: string}
"#;

#[test]
fn test_swagger2_and_oas3_normalize_to_the_same_shape() {
    let v2 = normalize_value(yaml(PETS_SWAGGER2)).unwrap();
    let v3 = normalize_value(yaml(PETS_OAS3)).unwrap();

    assert_eq!(v2.version, SpecVersion::Swagger2);
    assert_eq!(v3.version, SpecVersion::OpenApi30);
    assert_eq!(v2.servers, v3.servers);
    assert_eq!(v2.schemas, v3.schemas);
    assert_eq!(v2.endpoints, v3.endpoints);

    let by_id = v3.endpoint(HttpMethod::Get, "/pets/{petId}").unwrap();
    assert!(by_id.parameters[0].required);
    assert_eq!(
        by_id.responses[0].content["application/json"]
            .schema
            .as_ref()
            .map(|s| &s.kind),
        Some(&SchemaKind::Ref { name: "Pet".into() })
    );
}

#[test]
fn test_normalization_is_idempotent_over_key_order() {
    let original = yaml(PETS_OAS3);

    let mut reordered = original.clone();
    let paths = reordered["paths"].as_object().unwrap().clone();
    let mut reversed = serde_json::Map::new();
    for (path, item) in paths.into_iter().rev() {
        reversed.insert(path, item);
    }
    reordered["paths"] = Value::Object(reversed);

    let first = normalize_value(original.clone()).unwrap();
    let again = normalize_value(original).unwrap();
    let shuffled = normalize_value(reordered).unwrap();

    assert_eq!(first.endpoints, again.endpoints);
    assert_eq!(first.endpoints, shuffled.endpoints);
}

#[test]
fn test_methods_are_ordered_within_a_path() {
    let doc = normalize_value(json!({
        "openapi": "3.1.0",
        "info": { "title": "Order", "version": "1" },
        "paths": { "/items": {
            "patch": { "responses": {} },
            "delete": { "responses": {} },
            "get": { "responses": {} },
            "post": { "responses": {} }
        } }
    }))
    .unwrap();
    let methods: Vec<HttpMethod> = doc.endpoints.iter().map(|ep| ep.method).collect();
    assert_eq!(
        methods,
        vec![
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Delete,
            HttpMethod::Patch
        ]
    );
}

#[test]
fn test_cross_document_references_are_imported() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("openapi.yaml"),
        r#"
openapi: 3.0.0
info: {title: Split, version: "1"}
paths:
  /pets/{id}:
    get:
      parameters:
        - $ref: './common.yaml#/components/parameters/PetId'
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: './models/pet.yaml#/components/schemas/Pet'}
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("common.yaml"),
        r#"
components:
  parameters:
    PetId: {name: id, in: path, schema: {type: integer}}
"#,
    )
    .unwrap();
    fs::create_dir(dir.path().join("models")).unwrap();
    fs::write(
        dir.path().join("models/pet.yaml"),
        r#"
components:
  schemas:
    Pet:
      type: object
      properties:
        owner: {$ref: '#/components/schemas/Owner'}
        parent: {$ref: '#/components/schemas/Pet'}
    Owner:
      type: object
      properties:
        name: {type: string}
"#,
    )
    .unwrap();

    let doc = parse_document(&DocumentSource::Path(dir.path().join("openapi.yaml"))).unwrap();

    let names: Vec<&str> = doc.schemas.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Owner", "Pet"]);

    let endpoint = &doc.endpoints[0];
    assert_eq!(endpoint.parameters[0].name, "id");
    assert!(endpoint.parameters[0].required);
    assert!(matches!(
        endpoint.parameters[0].schema.kind,
        SchemaKind::Integer(_)
    ));

    let SchemaKind::Object(pet) = &doc.schemas["Pet"].kind else {
        panic!("Pet should be an object");
    };
    assert_eq!(
        pet.properties["parent"].kind,
        SchemaKind::Ref { name: "Pet".into() }
    );
}

#[test]
fn test_acquisition_errors() {
    let dir = tempdir().unwrap();

    let missing = parse_document(&DocumentSource::Path(dir.path().join("absent.yaml")));
    assert!(matches!(missing, Err(AppError::Fetch(_))));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ \"openapi\": ").unwrap();
    assert!(matches!(
        parse_document(&DocumentSource::Path(broken)),
        Err(AppError::Parse(_))
    ));

    let unsupported = normalize_value(json!({ "openapi": "4.0.0", "info": {} }));
    assert!(matches!(unsupported, Err(AppError::UnsupportedVersion(_))));
}

#[test]
fn test_missing_sections_are_not_errors() {
    let doc = normalize_value(json!({
        "swagger": "2.0",
        "info": { "title": "Empty", "version": "0" }
    }))
    .unwrap();
    assert!(doc.endpoints.is_empty());
    assert!(doc.servers.is_empty());
    assert!(doc.schemas.is_empty());
}
