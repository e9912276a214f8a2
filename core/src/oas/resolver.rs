#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Owns every document taking part in one normalization run (the entry
//! document plus any cross-document `$ref` targets) and the schema dictionary
//! being built.
//!
//! - References to named schema entries (`#/components/schemas/X`,
//!   `#/definitions/X`) stay named so cyclic schemas remain representable.
//!   Named entries in other documents are imported into the dictionary.
//! - References to anything else (parameters, responses, request bodies,
//!   path items, nested schema locations) are inlined.

use crate::oas::normalization::normalize_document;
use crate::oas::refs::{parse_reference, resolve_pointer, schema_component_name, ReferenceKind};
use crate::oas::schema::{parse_schema_with, SchemaNode};
use crate::oas::source::{parse_content, DocumentFetcher, LoadedDocument};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use url::Url;

/// Index of the entry document.
pub(crate) const ROOT_DOC: usize = 0;

/// Upper bound on `$ref -> $ref -> ...` hops for non-schema objects.
const MAX_REF_HOPS: usize = 16;

/// Cross-document reference resolver for one normalization run.
pub(crate) struct Resolver<'f> {
    fetcher: &'f dyn DocumentFetcher,
    docs: Vec<LoadedDocument>,
    index: HashMap<String, usize>,
    schemas: BTreeMap<String, SchemaNode>,
    imported: HashSet<(usize, String)>,
    inline_stack: Vec<(usize, String)>,
}

impl<'f> Resolver<'f> {
    /// Creates a resolver rooted at the entry document.
    pub(crate) fn new(mut root: LoadedDocument, fetcher: &'f dyn DocumentFetcher) -> Self {
        normalize_document(&mut root.root);
        let mut index = HashMap::new();
        if let Some(uri) = &root.uri {
            index.insert(document_key(uri), ROOT_DOC);
        }
        Self {
            fetcher,
            docs: vec![root],
            index,
            schemas: BTreeMap::new(),
            imported: HashSet::new(),
            inline_stack: Vec::new(),
        }
    }

    /// The entry document after raw normalization.
    pub(crate) fn root(&self) -> &Value {
        &self.docs[ROOT_DOC].root
    }

    /// Parses every named schema of the entry document into the dictionary.
    ///
    /// Must run before endpoints are parsed so local names take precedence over
    /// imported ones.
    pub(crate) fn register_local_schemas(&mut self, section: &[&str]) {
        let Some(Value::Object(entries)) = section
            .iter()
            .try_fold(self.root(), |node, key| node.get(*key))
            .cloned()
        else {
            return;
        };

        for (name, raw) in entries {
            let node = self.parse_schema(&raw, ROOT_DOC);
            self.schemas.insert(name, node);
        }
    }

    /// Consumes the resolver, returning the schema dictionary.
    pub(crate) fn into_schemas(self) -> BTreeMap<String, SchemaNode> {
        self.schemas
    }

    /// Follows `$ref` chains on a non-schema object (parameter, response,
    /// request body, path item) and returns the target plus the document it
    /// lives in. Returns `None` when a reference cannot be resolved.
    pub(crate) fn resolve_object(&mut self, value: &Value, doc: usize) -> Option<(Value, usize)> {
        let mut current = value.clone();
        let mut current_doc = doc;

        for _ in 0..MAX_REF_HOPS {
            let Some(ref_str) = current.get("$ref").and_then(Value::as_str) else {
                return Some((current, current_doc));
            };
            let ref_str = ref_str.to_string();
            let (target_doc, pointer) = self.locate(&ref_str, current_doc)?;
            match resolve_pointer(&self.docs[target_doc].root, &pointer) {
                Some(target) => {
                    current = target.clone();
                    current_doc = target_doc;
                }
                None => {
                    log::warn!("Unresolved reference '{}'", ref_str);
                    return None;
                }
            }
        }

        log::warn!("Reference chain too long, giving up at {}", current);
        None
    }

    /// Parses a schema that lives in document `doc`.
    pub(crate) fn parse_schema(&mut self, value: &Value, doc: usize) -> SchemaNode {
        parse_schema_with(value, &mut |ref_str: &str| self.schema_ref(ref_str, doc))
    }

    fn schema_ref(&mut self, ref_str: &str, doc: usize) -> SchemaNode {
        let Some((target_doc, pointer)) = self.locate(ref_str, doc) else {
            return SchemaNode::any();
        };

        if let Some(name) = schema_component_name(&pointer) {
            if target_doc != ROOT_DOC {
                self.import_schema(target_doc, &pointer, &name);
            }
            return SchemaNode::reference(name);
        }

        let key = (target_doc, pointer);
        if self.inline_stack.contains(&key) {
            log::warn!("Self-referencing inline schema '{}' replaced by an untyped schema", ref_str);
            return SchemaNode::any();
        }
        let Some(raw) = resolve_pointer(&self.docs[target_doc].root, &key.1).cloned() else {
            log::warn!("Unresolved schema reference '{}'", ref_str);
            return SchemaNode::any();
        };

        self.inline_stack.push(key);
        let node = self.parse_schema(&raw, target_doc);
        self.inline_stack.pop();
        node
    }

    /// Imports a named schema from another document; the first registration of
    /// a name wins.
    fn import_schema(&mut self, doc: usize, pointer: &str, name: &str) {
        if !self.imported.insert((doc, pointer.to_string())) {
            return;
        }
        if self.schemas.contains_key(name) {
            log::warn!(
                "Schema '{}' from {} shadowed by an existing schema of the same name",
                name,
                self.describe_doc(doc)
            );
            return;
        }
        let Some(raw) = resolve_pointer(&self.docs[doc].root, pointer).cloned() else {
            log::warn!("Schema '{}' not found in {}", name, self.describe_doc(doc));
            return;
        };
        // Reserve the name before recursing so self-references terminate.
        self.schemas.insert(name.to_string(), SchemaNode::any());
        let node = self.parse_schema(&raw, doc);
        self.schemas.insert(name.to_string(), node);
    }

    /// Maps a `$ref` to `(document index, JSON pointer)`, loading the target
    /// document if needed.
    fn locate(&mut self, ref_str: &str, doc: usize) -> Option<(usize, String)> {
        let parsed = parse_reference(ref_str);
        let pointer = parsed.fragment.unwrap_or("").to_string();

        let target_uri = match parsed.kind {
            ReferenceKind::Local => return Some((doc, pointer)),
            ReferenceKind::Remote => Url::parse(parsed.document).ok(),
            ReferenceKind::Relative => self.docs[doc]
                .uri
                .as_ref()
                .and_then(|base| base.join(parsed.document).ok()),
        };

        let Some(target_uri) = target_uri else {
            log::warn!(
                "Cannot resolve '{}' relative to {}",
                ref_str,
                self.describe_doc(doc)
            );
            return None;
        };

        let target_doc = self.load(target_uri)?;
        Some((target_doc, pointer))
    }

    fn load(&mut self, uri: Url) -> Option<usize> {
        let key = document_key(&uri);
        if let Some(idx) = self.index.get(&key) {
            return Some(*idx);
        }

        let loaded = self
            .fetcher
            .fetch(&uri)
            .and_then(|text| parse_content(&text));
        let mut root = match loaded {
            Ok(root) => root,
            Err(e) => {
                log::warn!("Skipping external document {}: {}", uri, e);
                return None;
            }
        };
        normalize_document(&mut root);
        log::debug!("Loaded external document {}", uri);

        let idx = self.docs.len();
        self.docs.push(LoadedDocument {
            uri: Some(uri),
            root,
        });
        self.index.insert(key, idx);
        Some(idx)
    }

    fn describe_doc(&self, doc: usize) -> String {
        self.docs[doc]
            .uri
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<in-memory document>".to_string())
    }
}

fn document_key(uri: &Url) -> String {
    let mut without_fragment = uri.clone();
    without_fragment.set_fragment(None);
    without_fragment.to_string()
}
