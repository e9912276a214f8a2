#![deny(missing_docs)]

//! # Document Normalizer
//!
//! Entry point of the pipeline: acquisition, version detection, reference
//! resolution and shape unification into a [`ParsedDocument`].
//!
//! The output does not depend on source key order: endpoints are sorted by path
//! then method, responses by status code, schemas by name.

use crate::error::{AppError, AppResult};
use crate::oas::models::{
    ApiInfo, Endpoint, HttpMethod, MediaType, ParamLocation, Parameter, ParsedDocument,
    RequestBody, ResponseDef, ServerInfo,
};
use crate::oas::params::{
    from_oas3, from_swagger2, inline_schema, swagger2_request_body, JSON_MEDIA_TYPE,
};
use crate::oas::resolver::{Resolver, ROOT_DOC};
use crate::oas::schema::SchemaNode;
use crate::oas::source::{load_document, DefaultFetcher, DocumentFetcher, DocumentSource, LoadedDocument};
use crate::oas::version::{detect_version, SpecVersion};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Loads and normalizes a document.
///
/// # Errors
///
/// * `Fetch` when the source cannot be read.
/// * `Parse` when the content is not a JSON/YAML object with an `info` object.
/// * `UnsupportedVersion` for anything but Swagger 2.0 and OpenAPI 3.0/3.1.
pub fn parse_document(source: &DocumentSource) -> AppResult<ParsedDocument> {
    parse_document_with_fetcher(source, &DefaultFetcher)
}

/// Same as [`parse_document`] with a caller-provided fetcher for the entry
/// document and every cross-document reference.
pub fn parse_document_with_fetcher(
    source: &DocumentSource,
    fetcher: &dyn DocumentFetcher,
) -> AppResult<ParsedDocument> {
    let loaded = load_document(source, fetcher)?;
    let doc = normalize_loaded(loaded, fetcher)?;
    log::debug!(
        "Normalized {} ({} endpoints, {} schemas)",
        source.describe(),
        doc.endpoints.len(),
        doc.schemas.len()
    );
    Ok(doc)
}

/// Normalizes an in-memory document.
///
/// Relative cross-document references cannot be resolved without a base URI
/// and degrade to untyped schemas.
pub fn normalize_value(raw: Value) -> AppResult<ParsedDocument> {
    normalize_loaded(LoadedDocument { uri: None, root: raw }, &DefaultFetcher)
}

fn normalize_loaded(loaded: LoadedDocument, fetcher: &dyn DocumentFetcher) -> AppResult<ParsedDocument> {
    if !loaded.root.is_object() {
        return Err(AppError::Parse("Document root must be an object".into()));
    }
    let version = detect_version(&loaded.root)?;
    let info = parse_info(&loaded.root)?;
    let raw = loaded.root.clone();

    let mut resolver = Resolver::new(loaded, fetcher);
    let root = resolver.root().clone();

    let section: &[&str] = if version.is_oas3() {
        &["components", "schemas"]
    } else {
        &["definitions"]
    };
    resolver.register_local_schemas(section);

    let servers = parse_servers(&root, version);
    let mut endpoints = parse_paths(&root, version, &mut resolver);
    endpoints.sort_by(|a, b| a.path.cmp(&b.path).then(a.method.cmp(&b.method)));
    for endpoint in &endpoints {
        for name in undeclared_path_params(endpoint) {
            log::debug!("{}: path parameter '{}' is not declared", endpoint.key(), name);
        }
    }

    Ok(ParsedDocument {
        version,
        info,
        servers,
        endpoints,
        schemas: resolver.into_schemas(),
        raw,
    })
}

fn parse_info(root: &Value) -> AppResult<ApiInfo> {
    let Some(info) = root.get("info").and_then(Value::as_object) else {
        return Err(AppError::Parse("Document is missing the 'info' object".into()));
    };
    Ok(ApiInfo {
        title: str_field(info, "title").unwrap_or_default(),
        version: match info.get("version") {
            Some(Value::String(v)) => v.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        },
        description: str_field(info, "description"),
    })
}

fn parse_servers(root: &Value, version: SpecVersion) -> Vec<ServerInfo> {
    if version.is_oas3() {
        return root
            .get("servers")
            .and_then(Value::as_array)
            .map(|servers| {
                servers
                    .iter()
                    .filter_map(Value::as_object)
                    .filter_map(|server| {
                        Some(ServerInfo {
                            url: expand_server_variables(server, str_field(server, "url")?),
                            description: str_field(server, "description"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
    }

    let base_path = root.get("basePath").and_then(Value::as_str).unwrap_or("");
    let url = match root.get("host").and_then(Value::as_str) {
        Some(host) => {
            let scheme = root
                .get("schemes")
                .and_then(Value::as_array)
                .and_then(|s| s.first())
                .and_then(Value::as_str)
                .unwrap_or("https");
            format!("{}://{}{}", scheme, host, base_path)
        }
        None if !base_path.is_empty() => base_path.to_string(),
        None => return Vec::new(),
    };
    vec![ServerInfo {
        url,
        description: None,
    }]
}

/// Replaces `{name}` placeholders with the variable's `default`.
fn expand_server_variables(server: &Map<String, Value>, mut url: String) -> String {
    if let Some(vars) = server.get("variables").and_then(Value::as_object) {
        for (name, var) in vars {
            if let Some(default) = var.get("default").and_then(Value::as_str) {
                url = url.replace(&format!("{{{}}}", name), default);
            }
        }
    }
    url
}

fn parse_paths(root: &Value, version: SpecVersion, resolver: &mut Resolver<'_>) -> Vec<Endpoint> {
    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let doc_consumes = string_list(root.get("consumes"));
    let doc_produces = string_list(root.get("produces"));
    let mut endpoints = Vec::new();

    for (path, raw_item) in paths {
        if path.starts_with("x-") {
            continue;
        }
        let Some((item, item_doc)) = resolver.resolve_object(raw_item, ROOT_DOC) else {
            continue;
        };
        let path_params = resolve_list(item.get("parameters"), item_doc, resolver);

        for method in HttpMethod::ALL {
            let Some(op) = item.get(method.path_item_key()).filter(|op| op.is_object()) else {
                continue;
            };
            let op_params = resolve_list(op.get("parameters"), item_doc, resolver);
            let merged = merge_parameters(path_params.clone(), op_params);

            let (parameters, request_body, responses) = if version.is_oas3() {
                let parameters: Vec<Parameter> = merged
                    .iter()
                    .filter_map(|(p, doc)| from_oas3(p, resolver, *doc))
                    .collect();
                let request_body = op
                    .get("requestBody")
                    .and_then(|rb| resolver.resolve_object(rb, item_doc))
                    .map(|(rb, doc)| parse_request_body(&rb, doc, resolver));
                let responses = parse_responses(op, item_doc, resolver, |resp, doc, r| {
                    parse_oas3_response(resp, doc, r)
                });
                (parameters, request_body, responses)
            } else {
                let consumes = string_list(op.get("consumes"))
                    .or_else(|| doc_consumes.clone())
                    .unwrap_or_default();
                let produces = string_list(op.get("produces"))
                    .or_else(|| doc_produces.clone())
                    .unwrap_or_default();
                let parameters: Vec<Parameter> = merged
                    .iter()
                    .filter_map(|(p, doc)| from_swagger2(p, resolver, *doc))
                    .collect();
                let request_body = swagger2_request_body(&merged, &consumes, resolver);
                let responses = parse_responses(op, item_doc, resolver, |resp, doc, r| {
                    parse_swagger2_response(resp, doc, &produces, r)
                });
                (parameters, request_body, responses)
            };

            endpoints.push(Endpoint {
                path: path.clone(),
                method,
                operation_id: op.get("operationId").and_then(Value::as_str).map(str::to_string),
                summary: op.get("summary").and_then(Value::as_str).map(str::to_string),
                description: op.get("description").and_then(Value::as_str).map(str::to_string),
                deprecated: op.get("deprecated").and_then(Value::as_bool).unwrap_or(false),
                parameters,
                request_body,
                responses,
                tags: string_list(op.get("tags")).unwrap_or_default(),
            });
        }
    }

    endpoints
}

/// Resolves every entry of a `parameters` array, keeping the document each
/// one was read from.
fn resolve_list(list: Option<&Value>, doc: usize, resolver: &mut Resolver<'_>) -> Vec<(Value, usize)> {
    list.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|p| resolver.resolve_object(p, doc))
                .collect()
        })
        .unwrap_or_default()
}

/// Operation parameters override path-level ones with the same `(name, in)`.
fn merge_parameters(
    mut path_level: Vec<(Value, usize)>,
    operation_level: Vec<(Value, usize)>,
) -> Vec<(Value, usize)> {
    fn identity(p: &Value) -> (Option<&str>, Option<&str>) {
        (
            p.get("name").and_then(Value::as_str),
            p.get("in").and_then(Value::as_str),
        )
    }

    for (param, doc) in operation_level {
        let overridden = path_level
            .iter()
            .position(|(existing, _)| identity(existing) == identity(&param));
        match overridden {
            Some(idx) => path_level[idx] = (param, doc),
            None => path_level.push((param, doc)),
        }
    }
    path_level
}

fn parse_responses<F>(
    op: &Value,
    doc: usize,
    resolver: &mut Resolver<'_>,
    mut parse_one: F,
) -> Vec<ResponseDef>
where
    F: FnMut(&Value, usize, &mut Resolver<'_>) -> ResponseParts,
{
    let Some(responses) = op.get("responses").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut out: Vec<ResponseDef> = responses
        .iter()
        .filter(|(code, _)| !code.starts_with("x-"))
        .filter_map(|(code, raw)| {
            let (resp, resp_doc) = resolver.resolve_object(raw, doc)?;
            let (content, headers) = parse_one(&resp, resp_doc, resolver);
            Some(ResponseDef {
                status_code: code.clone(),
                description: resp
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                content,
                headers,
            })
        })
        .collect();

    out.sort_by(compare_status_codes);
    out
}

/// Numeric codes first, then `2XX`-style ranges, then `default`.
fn compare_status_codes(a: &ResponseDef, b: &ResponseDef) -> Ordering {
    fn rank(r: &ResponseDef) -> (u8, u16) {
        match (r.status_code.parse::<u16>(), r.status()) {
            (Ok(code), _) => (0, code),
            (Err(_), Some(range)) => (1, range),
            _ if r.status_code == "default" => (2, 0),
            _ => (3, 0),
        }
    }
    rank(a).cmp(&rank(b)).then_with(|| a.status_code.cmp(&b.status_code))
}

/// `(content, headers)` of one response.
type ResponseParts = (IndexMap<String, MediaType>, IndexMap<String, SchemaNode>);

fn parse_oas3_response(resp: &Value, doc: usize, resolver: &mut Resolver<'_>) -> ResponseParts {
    let content = parse_content_map(resp.get("content"), doc, resolver);

    let mut headers = IndexMap::new();
    if let Some(raw_headers) = resp.get("headers").and_then(Value::as_object) {
        for (name, raw) in raw_headers {
            let Some((header, header_doc)) = resolver.resolve_object(raw, doc) else {
                continue;
            };
            let schema = match header.get("schema") {
                Some(s) => resolver.parse_schema(s, header_doc),
                None => SchemaNode::any(),
            };
            headers.insert(name.clone(), schema);
        }
    }

    (content, headers)
}

fn parse_swagger2_response(
    resp: &Value,
    doc: usize,
    produces: &[String],
    resolver: &mut Resolver<'_>,
) -> ResponseParts {
    let media_type = produces
        .first()
        .cloned()
        .unwrap_or_else(|| JSON_MEDIA_TYPE.to_string());
    let examples = resp.get("examples").and_then(Value::as_object);
    let schema = resp.get("schema").map(|s| resolver.parse_schema(s, doc));
    let example = examples.and_then(|ex| ex.get(&media_type).or_else(|| ex.values().next()).cloned());

    let mut content = IndexMap::new();
    if schema.is_some() || example.is_some() {
        content.insert(media_type, MediaType { schema, example });
    }

    let mut headers = IndexMap::new();
    if let Some(raw_headers) = resp.get("headers").and_then(Value::as_object) {
        for (name, header) in raw_headers {
            headers.insert(name.clone(), inline_schema(header, resolver, doc));
        }
    }

    (content, headers)
}

fn parse_request_body(raw: &Value, doc: usize, resolver: &mut Resolver<'_>) -> RequestBody {
    RequestBody {
        required: raw.get("required").and_then(Value::as_bool).unwrap_or(false),
        description: raw.get("description").and_then(Value::as_str).map(str::to_string),
        content: parse_content_map(raw.get("content"), doc, resolver),
    }
}

/// Parses an OAS 3.x `content` map. A media `example` wins over the first
/// named `examples` entry.
fn parse_content_map(
    content: Option<&Value>,
    doc: usize,
    resolver: &mut Resolver<'_>,
) -> IndexMap<String, MediaType> {
    let Some(content) = content.and_then(Value::as_object) else {
        return IndexMap::new();
    };

    content
        .iter()
        .map(|(media_type, media)| {
            let schema = media.get("schema").map(|s| resolver.parse_schema(s, doc));
            let example = media.get("example").cloned().or_else(|| {
                media
                    .get("examples")
                    .and_then(Value::as_object)
                    .and_then(|named| named.values().next())
                    .and_then(|first| resolver.resolve_object(first, doc))
                    .and_then(|(ex, _)| ex.get("value").cloned())
            });
            (media_type.clone(), MediaType { schema, example })
        })
        .collect()
}

fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value.and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

/// Path parameter names declared in a template, in order.
pub(crate) fn template_params(template: &str) -> Vec<&str> {
    template
        .split('/')
        .filter_map(|seg| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
        .collect()
}

/// Path template parameters that have no matching `Parameter`.
pub(crate) fn undeclared_path_params(endpoint: &Endpoint) -> Vec<&str> {
    let declared: Vec<&Parameter> = endpoint.parameters_in(ParamLocation::Path).collect();
    template_params(&endpoint.path)
        .into_iter()
        .filter(|name| !declared.iter().any(|p| p.name == *name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::schema::SchemaKind;
    use pretty_assertions::assert_eq;

    fn parse_yaml(yaml: &str) -> AppResult<ParsedDocument> {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        normalize_value(raw)
    }

    const PETSTORE_V3: &str = r#"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
servers:
  - url: https://{env}.example.com/v1
    variables:
      env: { default: api }
paths:
  /pets/{petId}:
    parameters:
      - name: petId
        in: path
        schema: { type: integer }
      - name: verbose
        in: query
        schema: { type: boolean }
    get:
      operationId: getPet
      tags: [pets]
      parameters:
        - name: verbose
          in: query
          description: overridden
          schema: { type: string }
      responses:
        default:
          description: error
        '404':
          description: not found
        '200':
          description: ok
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Pet' }
    delete:
      responses:
        '204': { description: gone }
  /pets:
    post:
      requestBody:
        $ref: '#/components/requestBodies/PetBody'
      responses:
        '201':
          $ref: '#/components/responses/Created'
  x-internal: {}
components:
  requestBodies:
    PetBody:
      required: true
      content:
        application/json:
          schema: { $ref: '#/components/schemas/Pet' }
  responses:
    Created:
      description: created
      content:
        application/json:
          example: { id: 1 }
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id: { type: integer, format: int64 }
        parent: { $ref: '#/components/schemas/Pet' }
"#;

    #[test]
    fn test_oas3_document() {
        let doc = parse_yaml(PETSTORE_V3).unwrap();
        assert_eq!(doc.version, SpecVersion::OpenApi30);
        assert_eq!(doc.info.title, "Petstore");
        assert_eq!(doc.servers[0].url, "https://api.example.com/v1");

        let keys: Vec<String> = doc.endpoints.iter().map(Endpoint::key).collect();
        assert_eq!(
            keys,
            vec!["POST /pets", "GET /pets/{petId}", "DELETE /pets/{petId}"]
        );

        let get = doc.endpoint(HttpMethod::Get, "/pets/{petId}").unwrap();
        let codes: Vec<&str> = get.responses.iter().map(|r| r.status_code.as_str()).collect();
        assert_eq!(codes, vec!["200", "404", "default"]);
        assert_eq!(get.parameters.len(), 2);
        assert!(get.parameters[0].required);
        assert_eq!(get.parameters[1].description.as_deref(), Some("overridden"));
        assert!(matches!(get.parameters[1].schema.kind, SchemaKind::String(_)));

        let post = doc.endpoint(HttpMethod::Post, "/pets").unwrap();
        assert!(post.request_body.as_ref().unwrap().required);
        let created = post.response("201").unwrap();
        assert_eq!(created.description, "created");
        assert_eq!(
            created.content["application/json"].example,
            Some(serde_json::json!({"id": 1}))
        );

        let SchemaKind::Object(pet) = &doc.schema("Pet").unwrap().kind else {
            panic!("expected object");
        };
        assert_eq!(pet.properties["parent"].ref_name(), Some("Pet"));
    }

    const PETSTORE_V2: &str = r#"
swagger: '2.0'
info: { title: Petstore, version: 1.0.0 }
host: petstore.swagger.io
basePath: /v2
schemes: [http, https]
produces: [application/json]
paths:
  /pet:
    post:
      consumes: [application/json, application/xml]
      parameters:
        - in: body
          name: body
          required: true
          schema: { $ref: '#/definitions/Pet' }
      responses:
        '405': { description: Invalid input }
  /pet/{petId}:
    get:
      parameters:
        - name: petId
          in: path
          type: integer
          format: int64
      responses:
        '200':
          description: ok
          schema: { $ref: '#/definitions/Pet' }
          headers:
            X-Rate-Limit: { type: integer, format: int32 }
definitions:
  Pet:
    type: object
    properties:
      name: { type: string, x-nullable: true }
"#;

    #[test]
    fn test_swagger2_document() {
        let doc = parse_yaml(PETSTORE_V2).unwrap();
        assert_eq!(doc.version, SpecVersion::Swagger2);
        assert_eq!(doc.servers[0].url, "http://petstore.swagger.io/v2");
        assert_eq!(doc.base_path().as_deref(), Some("/v2"));

        let post = doc.endpoint(HttpMethod::Post, "/pet").unwrap();
        assert!(post.parameters.is_empty());
        let body = post.request_body.as_ref().unwrap();
        assert_eq!(
            body.content["application/json"].schema.as_ref().unwrap().ref_name(),
            Some("Pet")
        );

        let get = doc.endpoint(HttpMethod::Get, "/pet/{petId}").unwrap();
        assert!(matches!(get.parameters[0].schema.kind, SchemaKind::Integer(_)));
        let ok = get.response("200").unwrap();
        assert_eq!(
            ok.content["application/json"].schema.as_ref().unwrap().ref_name(),
            Some("Pet")
        );
        assert!(matches!(ok.headers["X-Rate-Limit"].kind, SchemaKind::Integer(_)));

        let SchemaKind::Object(pet) = &doc.schema("Pet").unwrap().kind else {
            panic!("expected object");
        };
        assert!(pet.properties["name"].meta.nullable);
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let doc = parse_yaml("openapi: 3.1.0\ninfo: {title: Empty, version: '0'}\n").unwrap();
        assert!(doc.endpoints.is_empty());
        assert!(doc.servers.is_empty());
        assert!(doc.schemas.is_empty());
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            parse_yaml("openapi: 3.0.0\npaths: {}\n").unwrap_err(),
            AppError::Parse(_)
        ));
        assert!(matches!(
            normalize_value(Value::Array(vec![])).unwrap_err(),
            AppError::Parse(_)
        ));
        assert!(matches!(
            parse_yaml("openapi: 2.5.0\ninfo: {title: T, version: '1'}\n").unwrap_err(),
            AppError::UnsupportedVersion(_)
        ));
    }

    #[test]
    fn test_undeclared_path_params() {
        let doc = parse_yaml(
            "openapi: 3.0.0\ninfo: {title: T, version: '1'}\npaths:\n  /a/{x}/{y}:\n    get:\n      parameters:\n        - {name: x, in: path}\n      responses: {}\n",
        )
        .unwrap();
        let ep = &doc.endpoints[0];
        assert_eq!(undeclared_path_params(ep), vec!["y"]);
        assert!(ep.responses.is_empty());
    }
}
