#![deny(missing_docs)]

//! # Mock Data Generator
//!
//! Synthesizes a JSON value conforming to a [`SchemaNode`].
//!
//! Named references are expanded through the schema dictionary. A reference to
//! a schema already being expanded on the current path is replaced by a cycle
//! sentinel, so generation always terminates and never fails.

use crate::mock::context::{MockGenerationContext, MockOptions};
use crate::mock::strings::{cycle_sentinel, format_value, phrase};
use crate::oas::schema::{
    ArraySchema, CompositionMode, NumericSchema, ObjectSchema, SchemaKind, SchemaNode, StringSchema,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Generates mock values against one document's schema dictionary.
#[derive(Debug, Clone)]
pub struct MockGenerator<'a> {
    schemas: &'a BTreeMap<String, SchemaNode>,
    options: MockOptions,
}

impl<'a> MockGenerator<'a> {
    /// Generator with default options.
    pub fn new(schemas: &'a BTreeMap<String, SchemaNode>) -> Self {
        Self::with_options(schemas, MockOptions::default())
    }

    /// Generator with explicit options.
    pub fn with_options(schemas: &'a BTreeMap<String, SchemaNode>, options: MockOptions) -> Self {
        Self { schemas, options }
    }

    /// Options in use.
    pub fn options(&self) -> &MockOptions {
        &self.options
    }

    /// Produces one value for `schema`.
    pub fn generate<R: Rng + ?Sized>(&self, schema: &SchemaNode, rng: &mut R) -> Value {
        let mut ctx = MockGenerationContext::new(self.schemas, &self.options, rng);
        generate_value(schema, None, &mut ctx)
    }
}

/// Recursive entry point. `field` is the name of the property holding `node`,
/// used to shape cycle sentinels.
pub fn generate_value<R: Rng + ?Sized>(
    node: &SchemaNode,
    field: Option<&str>,
    ctx: &mut MockGenerationContext<'_, R>,
) -> Value {
    if let Some(values) = node.meta.enum_values.as_deref().filter(|v| !v.is_empty()) {
        if let Some(choice) = values.choose(&mut *ctx.rng) {
            return choice.clone();
        }
    }

    if ctx.options.use_examples {
        if let Some(literal) = matching_literal(node) {
            return literal.clone();
        }
    }

    match &node.kind {
        SchemaKind::Ref { name } => generate_ref(name, field, ctx),
        SchemaKind::Object(obj) => generate_object(obj, ctx),
        SchemaKind::Array(arr) => generate_array(arr, field, ctx),
        SchemaKind::String(s) => generate_string(s, &mut *ctx.rng),
        SchemaKind::Integer(n) => generate_integer(n, &mut *ctx.rng),
        SchemaKind::Number(n) => generate_number(n, &mut *ctx.rng),
        SchemaKind::Boolean => Value::Bool(ctx.rng.gen_bool(0.5)),
        SchemaKind::Null => Value::Null,
        SchemaKind::Composite { mode, members } => generate_composite(*mode, members, field, ctx),
        SchemaKind::Any => Value::Null,
    }
}

fn generate_ref<R: Rng + ?Sized>(
    name: &str,
    field: Option<&str>,
    ctx: &mut MockGenerationContext<'_, R>,
) -> Value {
    let schemas = ctx.schemas;
    let Some(target) = schemas.get(name) else {
        log::debug!("Unknown schema reference '{}', generating null", name);
        return Value::Null;
    };

    if !ctx.enter(name) {
        return cycle_sentinel(field, &mut *ctx.rng);
    }
    let value = generate_value(target, field, ctx);
    ctx.leave(name);
    value
}

fn generate_object<R: Rng + ?Sized>(
    obj: &ObjectSchema,
    ctx: &mut MockGenerationContext<'_, R>,
) -> Value {
    let probability = ctx.options.optional_probability.clamp(0.0, 1.0);
    let mut out = Map::new();

    for (name, prop) in &obj.properties {
        if is_write_only(prop, ctx.schemas) {
            continue;
        }
        if obj.required.contains(name) || ctx.rng.gen_bool(probability) {
            out.insert(name.clone(), generate_value(prop, Some(name.as_str()), ctx));
        }
    }

    if out.is_empty() {
        if let Some(extra) = &obj.additional_properties {
            let count = ctx.rng.gen_range(1..=3);
            for i in 1..=count {
                let key = format!("key{}", i);
                let value = generate_value(extra, Some(key.as_str()), ctx);
                out.insert(key, value);
            }
        }
    }

    Value::Object(out)
}

/// `writeOnly` on the property itself, on its `$ref` siblings or on the
/// referenced definition.
fn is_write_only(prop: &SchemaNode, schemas: &BTreeMap<String, SchemaNode>) -> bool {
    prop.is_write_only()
        || prop
            .ref_name()
            .and_then(|name| schemas.get(name))
            .is_some_and(SchemaNode::is_write_only)
}

fn generate_array<R: Rng + ?Sized>(
    arr: &ArraySchema,
    field: Option<&str>,
    ctx: &mut MockGenerationContext<'_, R>,
) -> Value {
    let min = arr.min_items.unwrap_or(ctx.options.default_min_items);
    let max = arr.max_items.unwrap_or(ctx.options.default_max_items);
    let len = if max <= min {
        min
    } else {
        ctx.rng.gen_range(min..=max)
    };

    let items = (1..=len)
        .map(|i| match &arr.items {
            Some(items) => generate_value(items, field, ctx),
            None => Value::String(format!("item_{}", i)),
        })
        .collect();
    Value::Array(items)
}

fn generate_string<R: Rng + ?Sized>(s: &StringSchema, rng: &mut R) -> Value {
    if let Some(value) = s.format.as_deref().and_then(|f| format_value(f, rng)) {
        return Value::String(value);
    }
    Value::String(phrase(rng, s.min_length, s.max_length))
}

/// Sampling window of a numeric schema. Defaults to `[0, 1000]`; on each
/// side an exclusive bound wins over an inclusive one.
#[derive(Debug, Clone, Copy)]
struct NumericBounds {
    low: f64,
    high: f64,
    low_open: bool,
    high_open: bool,
}

impl NumericBounds {
    fn of(n: &NumericSchema) -> Self {
        let (low, low_open) = match n.exclusive_minimum {
            Some(bound) => (bound, true),
            None => (n.minimum.unwrap_or(0.0), false),
        };
        let (high, high_open) = match n.exclusive_maximum {
            Some(bound) => (bound, true),
            None => (n.maximum.unwrap_or(1000.0), false),
        };
        if low <= high {
            Self { low, high, low_open, high_open }
        } else {
            Self { low: high, high: low, low_open: high_open, high_open: low_open }
        }
    }

    fn contains(&self, value: f64) -> bool {
        let above = if self.low_open { value > self.low } else { value >= self.low };
        let below = if self.high_open { value < self.high } else { value <= self.high };
        above && below
    }
}

fn generate_integer<R: Rng + ?Sized>(n: &NumericSchema, rng: &mut R) -> Value {
    let bounds = NumericBounds::of(n);
    let low = if bounds.low_open {
        (bounds.low.floor() as i64).saturating_add(1)
    } else {
        bounds.low.ceil() as i64
    };
    let high = if bounds.high_open {
        (bounds.high.ceil() as i64).saturating_sub(1)
    } else {
        bounds.high.floor() as i64
    };
    if high < low {
        return Value::from(low);
    }

    let mut value = rng.gen_range(low..=high);
    if let Some(step) = n.multiple_of.filter(|m| *m >= 1.0).map(|m| m as i64) {
        let snapped = value - value.rem_euclid(step);
        if snapped >= low {
            value = snapped;
        }
    }
    Value::from(value)
}

fn generate_number<R: Rng + ?Sized>(n: &NumericSchema, rng: &mut R) -> Value {
    let bounds = NumericBounds::of(n);
    if bounds.high <= bounds.low {
        return Value::from(bounds.low);
    }

    // A span wider than f64::MAX is sampled at half scale.
    let raw = if (bounds.high - bounds.low).is_finite() {
        rng.gen_range(bounds.low..=bounds.high)
    } else {
        rng.gen_range(bounds.low / 2.0..=bounds.high / 2.0) * 2.0
    };
    let rounded = if raw.abs() < 1e15 {
        (raw * 100.0).round() / 100.0
    } else {
        raw
    };
    let value = [rounded, raw]
        .into_iter()
        .find(|v| bounds.contains(*v))
        .unwrap_or(bounds.low / 2.0 + bounds.high / 2.0);
    Value::from(value)
}

fn generate_composite<R: Rng + ?Sized>(
    mode: CompositionMode,
    members: &[SchemaNode],
    field: Option<&str>,
    ctx: &mut MockGenerationContext<'_, R>,
) -> Value {
    match mode {
        CompositionMode::AllOf => {
            let mut acc = Value::Object(Map::new());
            for member in members {
                let value = generate_value(member, field, ctx);
                match (&mut acc, value) {
                    (Value::Object(merged), Value::Object(part)) => merged.extend(part),
                    (_, other) => acc = other,
                }
            }
            acc
        }
        CompositionMode::OneOf | CompositionMode::AnyOf => {
            let Some(member) = members.choose(&mut *ctx.rng) else {
                return Value::Null;
            };
            generate_value(member, field, ctx)
        }
    }
}

/// The `example` (then `default`) of a scalar or untyped node, if it matches
/// the type.
fn matching_literal(node: &SchemaNode) -> Option<&Value> {
    let fits = |value: &Value| match &node.kind {
        SchemaKind::String(_) => value.is_string(),
        SchemaKind::Integer(_) => value.is_i64() || value.is_u64(),
        SchemaKind::Number(_) => value.is_number(),
        SchemaKind::Boolean => value.is_boolean(),
        SchemaKind::Any => true,
        _ => false,
    };
    [node.meta.example.as_ref(), node.meta.default.as_ref()]
        .into_iter()
        .flatten()
        .find(|&value| fits(value))
}
