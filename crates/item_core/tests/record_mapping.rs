use std::sync::Arc;

use item_core::{Field, Record, RecordError, RecordSchema, SchemaError, ShadowNameError, Value};
use pretty_assertions::assert_eq;

fn repo_schema() -> Arc<RecordSchema> {
    RecordSchema::builder("GithubRepo")
        .field("title", Field::string())
        .field("star_count", Field::integer())
        .field("meta_content", Field::string().with_default("Not found!"))
        .field("fork", Field::integer().nullable())
        .build()
        .unwrap()
}

#[test]
fn schema_rejects_duplicate_fields() {
    let err = RecordSchema::builder("Dup")
        .field("a", Field::string())
        .field("a", Field::integer())
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        SchemaError::DuplicateField {
            record: "Dup".to_string(),
            field: "a".to_string(),
        }
    );
}

#[test]
fn schema_rejects_reserved_names() {
    let err = RecordSchema::builder("Bad")
        .field("__field#x", Field::string())
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::ReservedName {
            source: ShadowNameError::Reserved(_),
            ..
        }
    ));
}

#[test]
fn schema_keeps_declaration_order() {
    let schema = repo_schema();
    let names: Vec<&str> = schema.fields().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["title", "star_count", "meta_content", "fork"]);
    assert_eq!(schema.len(), 4);
}

#[test]
fn defaults_are_present_after_construction() {
    let record = Record::new(repo_schema());
    assert_eq!(record.get("meta_content").unwrap(), &Value::from("Not found!"));
    assert_eq!(record.len(), 1);
}

#[test]
fn caller_values_win_over_defaults() {
    let record = Record::with_values(repo_schema(), [("meta_content", "A crawler")]).unwrap();
    assert_eq!(record.get("meta_content").unwrap(), &Value::from("A crawler"));
}

#[test]
fn missing_key_is_key_not_found() {
    let mut record = Record::new(repo_schema());
    let expected = RecordError::KeyNotFound {
        record: "GithubRepo".to_string(),
        key: "title".to_string(),
    };
    assert_eq!(record.get("title").unwrap_err(), expected);
    assert_eq!(record.remove("title").unwrap_err(), expected);
}

#[test]
fn set_rejects_empty_and_shadow_keys() {
    let mut record = Record::new(repo_schema());
    assert!(matches!(
        record.set("", "x"),
        Err(RecordError::InvalidKey { .. })
    ));
    assert!(matches!(
        record.set("__field#title", "x"),
        Err(RecordError::InvalidKey { .. })
    ));
}

#[test]
fn mapping_operations_follow_insertion_order() {
    let mut record = Record::new(repo_schema());
    assert_eq!(record.set("title", "Ant Nest").unwrap(), None);
    record.set("origin_url", "https://example.com/ant").unwrap();
    assert_eq!(
        record.set("title", "Ant Nest 2").unwrap(),
        Some(Value::from("Ant Nest"))
    );
    let keys: Vec<&str> = record.keys().collect();
    assert_eq!(keys, vec!["meta_content", "title", "origin_url"]);

    assert_eq!(record.remove("meta_content").unwrap(), Value::from("Not found!"));
    assert!(!record.contains_key("meta_content"));
    assert_eq!(record.len(), 2);
    let pairs: Vec<(&str, &Value)> = record.iter().collect();
    assert_eq!(pairs[0], ("title", &Value::from("Ant Nest 2")));
}

#[test]
fn equality_ignores_insertion_order() {
    let schema = repo_schema();
    let a = Record::with_values(schema.clone(), [("title", "x"), ("fork", "1")]).unwrap();
    let b = Record::with_values(schema, [("fork", "1"), ("title", "x")]).unwrap();
    assert_eq!(a, b);
}

#[test]
fn display_includes_type_name_and_contents() {
    let record = Record::with_values(repo_schema(), [("title", Value::from("Ant Nest"))]).unwrap();
    assert_eq!(
        record.to_string(),
        r#"GithubRepo: {"title": "Ant Nest", "meta_content": "Not found!"}"#
    );
}
