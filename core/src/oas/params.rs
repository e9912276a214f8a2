//! # Parameter Adapters
//!
//! Swagger 2.0 and OpenAPI 3.x describe parameters differently: 2.0 puts
//! `type`/`format`/`items`/`enum`/bounds inline on the parameter and carries
//! payloads as `in: body` / `in: formData` parameters, 3.x nests a `schema`
//! and moves payloads to `requestBody`. Both shapes end up as the same
//! [`Parameter`] and [`RequestBody`].

use crate::oas::models::{MediaType, ParamLocation, Parameter, RequestBody};
use crate::oas::resolver::Resolver;
use crate::oas::schema::{ObjectSchema, SchemaKind, SchemaNode};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Keys of a Swagger 2.0 non-body parameter that belong to its value schema.
const SWAGGER2_SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "items",
    "enum",
    "default",
    "nullable",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
];

pub(crate) const JSON_MEDIA_TYPE: &str = "application/json";
const MULTIPART: &str = "multipart/form-data";
const URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Adapts a Swagger 2.0 `path`/`query`/`header` parameter.
///
/// Returns `None` for `body` and `formData` parameters; those become the
/// request body through [`swagger2_request_body`].
pub(crate) fn from_swagger2(raw: &Value, resolver: &mut Resolver<'_>, doc: usize) -> Option<Parameter> {
    let (name, location) = name_and_location(raw)?;
    let schema = inline_schema(raw, resolver, doc);
    Some(build_parameter(raw, name, location, schema))
}

/// Parses the schema keywords carried inline by a Swagger 2.0 parameter or
/// header object.
pub(crate) fn inline_schema(raw: &Value, resolver: &mut Resolver<'_>, doc: usize) -> SchemaNode {
    let schema_map: Map<String, Value> = SWAGGER2_SCHEMA_KEYS
        .iter()
        .filter_map(|key| raw.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect();
    resolver.parse_schema(&Value::Object(schema_map), doc)
}

/// Adapts an OpenAPI 3.x parameter (`schema`, or `content.<media type>.schema`).
pub(crate) fn from_oas3(raw: &Value, resolver: &mut Resolver<'_>, doc: usize) -> Option<Parameter> {
    let (name, location) = name_and_location(raw)?;

    let raw_schema = raw.get("schema").or_else(|| {
        raw.get("content")
            .and_then(Value::as_object)
            .and_then(|content| content.values().next())
            .and_then(|media| media.get("schema"))
    });
    let schema = match raw_schema {
        Some(s) => resolver.parse_schema(s, doc),
        None => SchemaNode::any(),
    };

    Some(build_parameter(raw, name, location, schema))
}

fn name_and_location(raw: &Value) -> Option<(String, ParamLocation)> {
    let name = raw.get("name").and_then(Value::as_str)?;
    let location = raw
        .get("in")
        .and_then(Value::as_str)
        .and_then(ParamLocation::parse)?;
    Some((name.to_string(), location))
}

fn build_parameter(raw: &Value, name: String, location: ParamLocation, schema: SchemaNode) -> Parameter {
    // Path parameters are always required, whatever the source says.
    let required = location == ParamLocation::Path
        || raw.get("required").and_then(Value::as_bool).unwrap_or(false);

    Parameter {
        name,
        location,
        required,
        description: raw
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        deprecated: raw
            .get("deprecated")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        schema,
    }
}

/// Builds a request body from Swagger 2.0 `in: body` or `in: formData`
/// parameters.
///
/// `params` pairs each raw parameter with the document it was read from.
/// `consumes` is the operation's list, falling back to the document's.
pub(crate) fn swagger2_request_body(
    params: &[(Value, usize)],
    consumes: &[String],
    resolver: &mut Resolver<'_>,
) -> Option<RequestBody> {
    let in_kind = |p: &Value, kind: &str| p.get("in").and_then(Value::as_str) == Some(kind);

    if let Some((body, doc)) = params.iter().find(|(p, _)| in_kind(p, "body")) {
        let doc = *doc;
        let media_type = consumes
            .first()
            .cloned()
            .unwrap_or_else(|| JSON_MEDIA_TYPE.to_string());
        let schema = body
            .get("schema")
            .map(|s| resolver.parse_schema(s, doc))
            .unwrap_or_else(SchemaNode::any);

        let mut content = IndexMap::new();
        content.insert(
            media_type,
            MediaType {
                schema: Some(schema),
                example: None,
            },
        );
        return Some(RequestBody {
            required: body.get("required").and_then(Value::as_bool).unwrap_or(false),
            description: body
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            content,
        });
    }

    let form: Vec<&(Value, usize)> = params
        .iter()
        .filter(|(p, _)| in_kind(p, "formData"))
        .collect();
    if form.is_empty() {
        return None;
    }

    let has_file = form
        .iter()
        .any(|(p, _)| p.get("type").and_then(Value::as_str) == Some("file"));
    let media_type = if has_file || consumes.iter().any(|c| c == MULTIPART) {
        MULTIPART
    } else {
        URL_ENCODED
    };

    let mut object = ObjectSchema::default();
    for (field, doc) in form {
        let Some(name) = field.get("name").and_then(Value::as_str) else {
            continue;
        };
        let mut schema = inline_schema(field, resolver, *doc);
        if schema.meta.description.is_none() {
            schema.meta.description = field
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        if field.get("required").and_then(Value::as_bool).unwrap_or(false) {
            object.required.insert(name.to_string());
        }
        object.properties.insert(name.to_string(), schema);
    }

    let required = !object.required.is_empty();
    let mut content = IndexMap::new();
    content.insert(
        media_type.to_string(),
        MediaType {
            schema: Some(SchemaNode::new(SchemaKind::Object(object))),
            example: None,
        },
    );
    Some(RequestBody {
        required,
        description: None,
        content,
    })
}
