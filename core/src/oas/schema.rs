#![deny(missing_docs)]

//! # Schema Model
//!
//! `SchemaNode` is a tagged union over the declared `type` discriminant with
//! explicit variants for unresolved named references and composition.
//! Nodes form a graph: `SchemaKind::Ref` edges point into
//! `ParsedDocument::schemas` and may lead back to an ancestor.

use crate::oas::refs::extract_ref_name;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A normalized schema node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    /// Shape of the node.
    #[serde(flatten)]
    pub kind: SchemaKind,
    /// Annotations shared by every kind.
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

/// The declared shape of a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaKind {
    /// Reference to a named entry in the schema dictionary.
    Ref {
        /// Dictionary key.
        name: String,
    },
    /// `type: object`.
    Object(ObjectSchema),
    /// `type: array`.
    Array(ArraySchema),
    /// `type: string`.
    String(StringSchema),
    /// `type: number`.
    Number(NumericSchema),
    /// `type: integer`.
    Integer(NumericSchema),
    /// `type: boolean`.
    Boolean,
    /// `type: null` (or the unsatisfiable `false` schema).
    Null,
    /// `allOf` / `oneOf` / `anyOf`.
    Composite {
        /// Combination rule.
        mode: CompositionMode,
        /// Member schemas in declaration order.
        members: Vec<SchemaNode>,
    },
    /// No type information (absent or unrecognized `type`).
    Any,
}

/// Combination rule of a composite schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositionMode {
    /// Every member applies.
    AllOf,
    /// Exactly one member applies.
    OneOf,
    /// At least one member applies.
    AnyOf,
}

/// Annotations that may appear on any schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMeta {
    /// `title`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `enum` literal values, in declaration order.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// `example` (or the first entry of 3.1 `examples`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// `default`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// `readOnly`.
    #[serde(skip_serializing_if = "is_false")]
    pub read_only: bool,
    /// `writeOnly`: request-only, never part of a mocked response.
    #[serde(skip_serializing_if = "is_false")]
    pub write_only: bool,
    /// `nullable`, `x-nullable` or a `"null"` member of a 3.1 type array.
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
}

/// `type: object` details.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    /// Declared properties, in declaration order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    /// Names listed in `required`.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub required: BTreeSet<String>,
    /// Schema of undeclared keys (`additionalProperties: {...}`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaNode>>,
    /// `minProperties`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<usize>,
    /// `maxProperties`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<usize>,
}

/// `type: array` details.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArraySchema {
    /// Element schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// `minItems`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    /// `maxItems`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// `uniqueItems`.
    #[serde(skip_serializing_if = "is_false")]
    pub unique_items: bool,
}

/// `type: string` details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringSchema {
    /// `format` hint (email, date, date-time, uri, uuid, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// `minLength`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// `maxLength`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// `pattern`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// `type: number` / `type: integer` details.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericSchema {
    /// `format` hint (int32, int64, float, double).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// `minimum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// `maximum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// `exclusiveMinimum` (numeric form).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    /// `exclusiveMaximum` (numeric form).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    /// `multipleOf`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl SchemaNode {
    /// Creates a node of the given kind with empty annotations.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            meta: SchemaMeta::default(),
        }
    }

    /// A node with no type information.
    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    /// A reference to a named dictionary entry.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(SchemaKind::Ref { name: name.into() })
    }

    /// Parses a raw schema object, treating every `$ref` as a dictionary name
    /// (its last pointer segment).
    ///
    /// Used for schemas that are not part of a loaded document, e.g. in tests
    /// or ad-hoc generation.
    pub fn from_json(value: &Value) -> Self {
        parse_schema_with(value, &mut |ref_str: &str| {
            SchemaNode::reference(extract_ref_name(ref_str))
        })
    }

    /// Returns the referenced dictionary name if this node is a `$ref`.
    pub fn ref_name(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Ref { name } => Some(name),
            _ => None,
        }
    }

    /// True for `writeOnly` nodes.
    pub fn is_write_only(&self) -> bool {
        self.meta.write_only
    }
}

impl SchemaMeta {
    /// Copies flags and annotations present on `$ref` siblings onto the resolved node.
    fn overlay(&mut self, siblings: SchemaMeta) {
        self.read_only |= siblings.read_only;
        self.write_only |= siblings.write_only;
        self.nullable |= siblings.nullable;
        if siblings.title.is_some() {
            self.title = siblings.title;
        }
        if siblings.description.is_some() {
            self.description = siblings.description;
        }
        if siblings.example.is_some() {
            self.example = siblings.example;
        }
        if siblings.default.is_some() {
            self.default = siblings.default;
        }
        if siblings.enum_values.is_some() {
            self.enum_values = siblings.enum_values;
        }
    }
}

/// Parses a raw schema, delegating every `$ref` to `on_ref`.
///
/// `on_ref` decides whether a reference stays a named `Ref` or is inlined.
pub(crate) fn parse_schema_with<F>(value: &Value, on_ref: &mut F) -> SchemaNode
where
    F: FnMut(&str) -> SchemaNode,
{
    let map = match value {
        Value::Object(map) => map,
        Value::Bool(false) => return SchemaNode::new(SchemaKind::Null),
        _ => return SchemaNode::any(),
    };

    let meta = parse_meta(map);

    if let Some(ref_str) = map.get("$ref").and_then(Value::as_str) {
        let mut node = on_ref(ref_str);
        node.meta.overlay(meta);
        return node;
    }

    for (key, mode) in [
        ("allOf", CompositionMode::AllOf),
        ("oneOf", CompositionMode::OneOf),
        ("anyOf", CompositionMode::AnyOf),
    ] {
        let Some(list) = map.get(key).and_then(Value::as_array) else {
            continue;
        };
        let mut members: Vec<SchemaNode> = list
            .iter()
            .map(|member| parse_schema_with(member, on_ref))
            .collect();
        if mode == CompositionMode::AllOf && map.contains_key("properties") {
            // Sibling properties act as one more allOf member.
            let mut sibling = map.clone();
            sibling.remove("allOf");
            members.push(parse_schema_with(&Value::Object(sibling), on_ref));
        }
        return SchemaNode {
            kind: SchemaKind::Composite { mode, members },
            meta,
        };
    }

    let (type_name, nullable_union) = declared_type(map);
    let mut meta = meta;
    meta.nullable |= nullable_union;

    let kind = match type_name.as_deref() {
        Some("object") => SchemaKind::Object(parse_object(map, on_ref)),
        Some("array") => SchemaKind::Array(parse_array(map, on_ref)),
        Some("string") => SchemaKind::String(parse_string(map)),
        Some("number") => SchemaKind::Number(parse_numeric(map)),
        Some("integer") => SchemaKind::Integer(parse_numeric(map)),
        Some("boolean") => SchemaKind::Boolean,
        Some("null") => SchemaKind::Null,
        Some(_) => SchemaKind::Any,
        None => {
            if map.contains_key("properties") || map.contains_key("additionalProperties") {
                SchemaKind::Object(parse_object(map, on_ref))
            } else if map.contains_key("items") {
                SchemaKind::Array(parse_array(map, on_ref))
            } else {
                SchemaKind::Any
            }
        }
    };

    SchemaNode { kind, meta }
}

/// Reads `type` as a string or a 3.1 type array.
///
/// Returns the first non-null type and whether `"null"` was part of a union.
fn declared_type(map: &Map<String, Value>) -> (Option<String>, bool) {
    match map.get("type") {
        Some(Value::String(t)) => (Some(t.clone()), false),
        Some(Value::Array(types)) => {
            let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            let has_null = names.contains(&"null");
            let first = names.iter().find(|t| **t != "null").copied();
            match first {
                Some(t) => (Some(t.to_string()), has_null),
                None if has_null => (Some("null".to_string()), false),
                None => (None, false),
            }
        }
        _ => (None, false),
    }
}

fn parse_meta(map: &Map<String, Value>) -> SchemaMeta {
    let example = map.get("example").cloned().or_else(|| {
        map.get("examples")
            .and_then(Value::as_array)
            .and_then(|list| list.first().cloned())
    });

    SchemaMeta {
        title: string_field(map, "title"),
        description: string_field(map, "description"),
        enum_values: map
            .get("enum")
            .and_then(Value::as_array)
            .filter(|values| !values.is_empty())
            .cloned(),
        example,
        default: map.get("default").cloned(),
        read_only: bool_field(map, "readOnly"),
        write_only: bool_field(map, "writeOnly"),
        nullable: bool_field(map, "nullable"),
    }
}

fn parse_object<F>(map: &Map<String, Value>, on_ref: &mut F) -> ObjectSchema
where
    F: FnMut(&str) -> SchemaNode,
{
    let properties = map
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| (name.clone(), parse_schema_with(prop, on_ref)))
                .collect()
        })
        .unwrap_or_default();

    let required = map
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let additional_properties = match map.get("additionalProperties") {
        Some(value @ Value::Object(_)) => Some(Box::new(parse_schema_with(value, on_ref))),
        Some(Value::Bool(true)) => Some(Box::new(SchemaNode::any())),
        _ => None,
    };

    ObjectSchema {
        properties,
        required,
        additional_properties,
        min_properties: usize_field(map, "minProperties"),
        max_properties: usize_field(map, "maxProperties"),
    }
}

fn parse_array<F>(map: &Map<String, Value>, on_ref: &mut F) -> ArraySchema
where
    F: FnMut(&str) -> SchemaNode,
{
    ArraySchema {
        items: map
            .get("items")
            .map(|items| Box::new(parse_schema_with(items, on_ref))),
        min_items: usize_field(map, "minItems"),
        max_items: usize_field(map, "maxItems"),
        unique_items: bool_field(map, "uniqueItems"),
    }
}

fn parse_string(map: &Map<String, Value>) -> StringSchema {
    StringSchema {
        format: string_field(map, "format"),
        min_length: usize_field(map, "minLength"),
        max_length: usize_field(map, "maxLength"),
        pattern: string_field(map, "pattern"),
    }
}

fn parse_numeric(map: &Map<String, Value>) -> NumericSchema {
    NumericSchema {
        format: string_field(map, "format"),
        minimum: f64_field(map, "minimum"),
        maximum: f64_field(map, "maximum"),
        exclusive_minimum: f64_field(map, "exclusiveMinimum"),
        exclusive_maximum: f64_field(map, "exclusiveMaximum"),
        multiple_of: f64_field(map, "multipleOf"),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_field(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn usize_field(map: &Map<String, Value>, key: &str) -> Option<usize> {
    map.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

fn f64_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}
