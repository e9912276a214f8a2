//! Generation options and the per-call recursion context.

use crate::oas::schema::SchemaNode;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};

/// Tuning knobs of the mock generator.
#[derive(Debug, Clone, PartialEq)]
pub struct MockOptions {
    /// Probability that an optional property is emitted.
    pub optional_probability: f64,
    /// Lower array length bound when `minItems` is absent.
    pub default_min_items: usize,
    /// Upper array length bound when `maxItems` is absent.
    pub default_max_items: usize,
    /// Return a scalar's `example`/`default` when it matches the declared type.
    pub use_examples: bool,
    /// Nested named expansions allowed on one path before a sentinel is returned.
    pub max_ref_depth: usize,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            optional_probability: 0.95,
            default_min_items: 1,
            default_max_items: 5,
            use_examples: true,
            max_ref_depth: 32,
        }
    }
}

/// State threaded through one top-level generation call.
///
/// `visited` holds the schema names being expanded on the active call path
/// only: a name is inserted before descending into its definition and removed
/// on the way back, so siblings may expand the same schema.
pub struct MockGenerationContext<'a, R: Rng + ?Sized> {
    pub(crate) schemas: &'a BTreeMap<String, SchemaNode>,
    pub(crate) options: &'a MockOptions,
    pub(crate) rng: &'a mut R,
    visited: HashSet<String>,
}

impl<'a, R: Rng + ?Sized> MockGenerationContext<'a, R> {
    /// Creates an empty context.
    pub fn new(
        schemas: &'a BTreeMap<String, SchemaNode>,
        options: &'a MockOptions,
        rng: &'a mut R,
    ) -> Self {
        Self {
            schemas,
            options,
            rng,
            visited: HashSet::new(),
        }
    }

    /// Marks `name` as being expanded. Returns `false` when it already is, or
    /// when the expansion chain reached `max_ref_depth`.
    pub(crate) fn enter(&mut self, name: &str) -> bool {
        if self.visited.contains(name) || self.visited.len() >= self.options.max_ref_depth {
            return false;
        }
        self.visited.insert(name.to_string());
        true
    }

    /// Ends the expansion of `name`.
    pub(crate) fn leave(&mut self, name: &str) {
        self.visited.remove(name);
    }

    /// Number of named schemas on the active path.
    pub fn depth(&self) -> usize {
        self.visited.len()
    }
}
