#![deny(missing_docs)]

//! # OpenAPI Models
//!
//! Intermediate Representation produced by the normalizer.
//!
//! The same structures are produced for Swagger 2.0, OpenAPI 3.0 and 3.1
//! documents; downstream consumers (mock dispatcher, emitters, search tooling)
//! never see version-specific shapes.

use crate::error::AppError;
use crate::oas::schema::SchemaNode;
use crate::oas::version::SpecVersion;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A fully normalized document. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    /// Detected source version.
    pub version: SpecVersion,
    /// Document metadata.
    pub info: ApiInfo,
    /// Base URLs, in declaration order.
    pub servers: Vec<ServerInfo>,
    /// Operations ordered by path, then method.
    pub endpoints: Vec<Endpoint>,
    /// Named schemas (`components/schemas` or `definitions`).
    pub schemas: BTreeMap<String, SchemaNode>,
    /// The source document as loaded, for serving to documentation UIs.
    #[serde(skip)]
    pub raw: Value,
}

impl ParsedDocument {
    /// Looks up a named schema.
    pub fn schema(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    /// Finds an endpoint by method and exact path template.
    pub fn endpoint(&self, method: HttpMethod, path: &str) -> Option<&Endpoint> {
        self.endpoints
            .iter()
            .find(|ep| ep.method == method && ep.path == path)
    }

    /// Path component of the first server URL (e.g. `/v2`), if it is not `/`.
    pub fn base_path(&self) -> Option<String> {
        let url = &self.servers.first()?.url;
        let without_scheme = match url.split_once("://") {
            Some((_, rest)) => rest.find('/').map(|idx| &rest[idx..]).unwrap_or(""),
            None => url.as_str(),
        };
        let trimmed = without_scheme.trim_end_matches('/');
        if trimmed.is_empty() || !trimmed.starts_with('/') {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// `info` object subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiInfo {
    /// API title.
    pub title: String,
    /// API version string (not the OpenAPI version).
    pub version: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A server entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    /// Base URL.
    pub url: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// HTTP methods an operation may be declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
}

impl HttpMethod {
    /// Every method in path-item declaration order.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    /// Upper-case name (`GET`).
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Lower-case key used in path item objects (`get`).
    pub fn path_item_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }

    /// Whether the method conventionally creates or replaces a resource.
    pub fn is_write(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::General(format!("Unknown HTTP method: {}", s)))
    }
}

/// One (path, method) operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Raw path template, e.g. `/pets/{petId}`.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// `operationId`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// `summary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `deprecated`.
    pub deprecated: bool,
    /// Path-level and operation-level parameters, merged.
    pub parameters: Vec<Parameter>,
    /// Request body, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses ordered by status code.
    pub responses: Vec<ResponseDef>,
    /// Tags.
    pub tags: Vec<String>,
}

impl Endpoint {
    /// `METHOD /path` key used for custom responses and logs.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Finds a response by its exact status code string.
    pub fn response(&self, status_code: &str) -> Option<&ResponseDef> {
        self.responses.iter().find(|r| r.status_code == status_code)
    }

    /// Parameters declared in a given location.
    pub fn parameters_in(&self, location: ParamLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// URL path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParamLocation {
    /// Parses the `in` field; returns `None` for `body`/`formData` and unknown values.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }
}

/// A normalized parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Name in the source.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Always true for path parameters.
    pub required: bool,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Deprecated flag.
    pub deprecated: bool,
    /// Value schema, identical in shape for every source version.
    pub schema: SchemaNode,
}

/// Request body definition keyed by media type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    /// `required`.
    pub required: bool,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Media type -> schema/example.
    pub content: IndexMap<String, MediaType>,
}

/// A media type entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaType {
    /// Payload schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
    /// Literal example payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// A response keyed by status code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDef {
    /// `"200"`, `"2XX"` or `"default"`.
    pub status_code: String,
    /// Description.
    pub description: String,
    /// Media type -> schema/example.
    pub content: IndexMap<String, MediaType>,
    /// Response headers and their schemas.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, SchemaNode>,
}

impl ResponseDef {
    /// Numeric status for explicit codes; `2XX`-style ranges map to `x00`.
    pub fn status(&self) -> Option<u16> {
        if let Ok(code) = self.status_code.parse::<u16>() {
            return Some(code);
        }
        let bytes = self.status_code.as_bytes();
        if bytes.len() == 3 && bytes[1..].eq_ignore_ascii_case(b"xx") {
            let class = char::from(bytes[0]).to_digit(10)?;
            return u16::try_from(class * 100).ok();
        }
        None
    }

    /// True for `2xx` codes and the `2XX` range.
    pub fn is_success(&self) -> bool {
        matches!(self.status(), Some(200..=299))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(code: &str) -> ResponseDef {
        ResponseDef {
            status_code: code.to_string(),
            description: String::new(),
            content: IndexMap::new(),
            headers: IndexMap::new(),
        }
    }

    #[test]
    fn test_response_status_parsing() {
        assert_eq!(response("201").status(), Some(201));
        assert_eq!(response("2XX").status(), Some(200));
        assert_eq!(response("4xx").status(), Some(400));
        assert_eq!(response("default").status(), None);
        assert!(response("2XX").is_success());
        assert!(!response("404").is_success());
    }

    #[test]
    fn test_http_method_round_trip() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("TRACE".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_base_path_from_first_server() {
        let mut doc = ParsedDocument {
            version: SpecVersion::Swagger2,
            info: ApiInfo::default(),
            servers: vec![ServerInfo {
                url: "https://petstore.swagger.io/v2/".into(),
                description: None,
            }],
            endpoints: Vec::new(),
            schemas: BTreeMap::new(),
            raw: Value::Null,
        };
        assert_eq!(doc.base_path().as_deref(), Some("/v2"));

        doc.servers[0].url = "https://api.example.com".into();
        assert_eq!(doc.base_path(), None);

        doc.servers[0].url = "/api/v1".into();
        assert_eq!(doc.base_path().as_deref(), Some("/api/v1"));
    }
}
