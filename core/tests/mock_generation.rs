use s2r_core::{
    normalize_value, HttpMethod, MockDispatcher, MockGenerator, ParsedDocument, SchemaNode,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::Arc;

fn document(schemas: Value) -> ParsedDocument {
    normalize_value(json!({
        "openapi": "3.0.0",
        "info": { "title": "Mocks", "version": "1" },
        "paths": {
            "/nodes/{id}": { "get": { "responses": { "200": {
                "description": "ok",
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Node" } } }
            } } } }
        },
        "components": { "schemas": schemas }
    }))
    .unwrap()
}

#[test]
fn test_simple_object_required_and_optional_fields() {
    let doc = document(json!({
        "User": {
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": { "type": "integer" },
                "name": { "type": "string" }
            }
        }
    }));
    let generator = MockGenerator::new(&doc.schemas);
    let mut rng = StdRng::seed_from_u64(2024);

    const TRIALS: usize = 2000;
    let mut with_name = 0;
    for _ in 0..TRIALS {
        let user = generator.generate(&SchemaNode::reference("User"), &mut rng);
        let id = &user["id"];
        assert!(id.is_i64() || id.is_u64(), "id must be an integer: {}", user);
        if user.get("name").is_some() {
            assert!(user["name"].is_string());
            with_name += 1;
        }
    }

    let ratio = with_name as f64 / TRIALS as f64;
    assert!(ratio > 0.9 && ratio < 0.99, "name present in {} of runs", ratio);
}

#[test]
fn test_self_referential_tree_terminates() {
    let doc = document(json!({
        "Node": {
            "type": "object",
            "required": ["value", "children", "next"],
            "properties": {
                "value": { "type": "integer" },
                "children": { "type": "array", "items": { "$ref": "#/components/schemas/Node" } },
                "next": { "$ref": "#/components/schemas/Node" }
            }
        }
    }));
    let generator = MockGenerator::new(&doc.schemas);

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let tree = generator.generate(&SchemaNode::reference("Node"), &mut rng);
        assert!(tree.is_object());
        assert!(!tree["next"].is_null());
        for child in tree["children"].as_array().unwrap() {
            assert!(child.is_object() || child.is_string(), "unexpected child {}", child);
        }
    }
}

#[test]
fn test_fixed_seed_gives_identical_responses() {
    let doc = Arc::new(document(json!({
        "Node": {
            "type": "object",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "score": { "type": "number", "minimum": 0, "maximum": 1 }
            }
        }
    })));

    let first = MockDispatcher::new(doc.clone()).with_seed(Some(99));
    let second = MockDispatcher::new(doc).with_seed(Some(99));

    let a = first.dispatch(HttpMethod::Get, "/nodes/1");
    let b = second.dispatch(HttpMethod::Get, "/nodes/1");
    assert_eq!(a.status, 200);
    assert_eq!(a, b);
    assert_eq!(a, first.dispatch(HttpMethod::Get, "/nodes/2"));
}
