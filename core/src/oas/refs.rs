#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Shared helpers for splitting `$ref` strings into a document part and a JSON
//! Pointer fragment, decoding pointer segments and walking raw documents.
//!
//! Nothing here performs I/O; cross-document loading lives in the resolver.

use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Where a `$ref` points relative to the referencing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReferenceKind {
    /// `#/...`: same document.
    Local,
    /// `other.yaml#/...` or `../common.json`: resolved against the base URI.
    Relative,
    /// `https://host/doc.json#/...`: absolute URI.
    Remote,
}

/// A `$ref` split into its document and fragment parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParsedReference<'a> {
    /// Document part (empty for local references).
    pub document: &'a str,
    /// Fragment without the leading `#`, if any.
    pub fragment: Option<&'a str>,
    /// Classification of the reference.
    pub kind: ReferenceKind,
}

/// Splits a `$ref` into document and fragment.
pub(crate) fn parse_reference(ref_str: &str) -> ParsedReference<'_> {
    let (document, fragment) = match ref_str.split_once('#') {
        Some((doc, frag)) => (doc, Some(frag)),
        None => (ref_str, None),
    };

    let kind = if document.is_empty() {
        ReferenceKind::Local
    } else if document.contains("://") {
        ReferenceKind::Remote
    } else {
        ReferenceKind::Relative
    };

    ParsedReference {
        document,
        fragment,
        kind,
    }
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Splits a JSON Pointer (`/a/b~1c`) into decoded segments.
pub(crate) fn pointer_segments(pointer: &str) -> Vec<String> {
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(decode_pointer_segment).collect()
}

/// Returns the schema dictionary name if the pointer targets a named schema entry.
///
/// Accepts `/components/schemas/{name}` (OAS 3.x) and `/definitions/{name}` (Swagger 2.0).
/// Deeper pointers such as `/components/schemas/Pet/properties/id` return `None`.
pub(crate) fn schema_component_name(pointer: &str) -> Option<String> {
    let segments = pointer_segments(pointer);
    let name = match segments.as_slice() {
        [components, schemas, name] if components == "components" && schemas == "schemas" => name,
        [definitions, name] if definitions == "definitions" => name,
        _ => return None,
    };
    if name.is_empty() {
        None
    } else {
        Some(name.clone())
    }
}

/// Walks a JSON Pointer fragment through a raw document.
pub(crate) fn resolve_pointer<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in pointer_segments(pointer) {
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Extracts the simple name from a reference string.
/// e.g. `#/components/schemas/User` -> `User`
pub(crate) fn extract_ref_name(ref_str: &str) -> String {
    let last = ref_str.rsplit('/').next().unwrap_or(ref_str);
    decode_pointer_segment(last)
}
