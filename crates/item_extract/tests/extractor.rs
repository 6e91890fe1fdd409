use std::sync::{Arc, Once};

use item_core::{CoerceError, Field, FieldValidationError, RecordSchema, Value};
use item_extract::{
    Aggregation, DocumentViews, ExtractError, FetchedDocument, Html, ItemExtractor, RuleSet,
    ViewError,
};
use pretty_assertions::assert_eq;

const REPO_PAGE: &str = r#"<html>
<head><title>Other Title</title></head>
<body>
  <h1>
    <span class="author"><a href="/strawberry">strawberry</a></span>
    <strong><a href="/strawberry/ant-nest">Ant Nest</a></strong>
  </h1>
  <div class="meta"><span>A simple</span><span> crawler</span></div>
  <a class="social-count js-social-count" href="/stargazers">128</a>
  <a class="social-count" href="/network">7</a>
</body>
</html>"#;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(item_logging::initialize_for_tests);
}

fn repo_schema() -> Arc<RecordSchema> {
    RecordSchema::builder("GithubRepo")
        .field("title", Field::string())
        .field("author", Field::string())
        .field("meta_content", Field::string().with_default("Not found!"))
        .field("star_count", Field::integer())
        .field("fork", Field::integer().nullable())
        .build()
        .unwrap()
}

#[test]
fn agreeing_instructions_resolve_to_one_value() {
    init_logging();
    let mut rules = RuleSet::new();
    rules
        .add_tree("star_count", "a.js-social-count::text")
        .add_regex("star_count", r#"href="/stargazers">(\d+)<"#);
    let extractor = ItemExtractor::new(repo_schema(), rules);

    let mut record = extractor
        .extract(&FetchedDocument::from_text(REPO_PAGE))
        .unwrap();
    assert_eq!(record.get("star_count").unwrap(), &Value::from("128"));

    record.set("title", "Ant Nest").unwrap();
    record.set("author", "strawberry").unwrap();
    record.validate().unwrap();
    assert_eq!(record.get("star_count").unwrap(), &Value::Int(128));
}

#[test]
fn disagreeing_instructions_fail_the_pass() {
    init_logging();
    let mut rules = RuleSet::new();
    rules
        .add_tree("title", "h1 strong a::text")
        .add_regex("title", "<title>([^<]+)</title>");
    let extractor = ItemExtractor::new(repo_schema(), rules);

    let err = extractor
        .extract(&FetchedDocument::from_text(REPO_PAGE))
        .unwrap_err();
    match err {
        ExtractError::Conflict {
            field,
            first,
            second,
        } => {
            assert_eq!(field, "title");
            assert_eq!(first, Value::from("Ant Nest"));
            assert_eq!(second, Value::from("Other Title"));
        }
        other => panic!("expected a conflict, got {other}"),
    }
}

#[test]
fn instruction_without_match_falls_through_to_the_next() {
    init_logging();
    let mut rules = RuleSet::new();
    rules
        .add_tree("author", "span.missing::text")
        .add_regex("author", "(fallback)");
    let extractor = ItemExtractor::new(repo_schema(), rules);

    let record = extractor
        .extract(&FetchedDocument::from_text("<p>use the fallback</p>"))
        .unwrap();
    assert_eq!(record.get("author").unwrap(), &Value::from("fallback"));
}

#[test]
fn field_with_no_matches_is_left_unset() {
    init_logging();
    let mut rules = RuleSet::new();
    rules
        .add_tree("title", "h1 strong a::text")
        .add_tree("author", "h1 .author a::text")
        .add_tree("star_count", "a.js-social-count::text")
        .add_tree("fork", "a.forks::text")
        .add_regex("fork", r"(\d+) forks");
    let extractor = ItemExtractor::new(repo_schema(), rules);

    let record = extractor
        .extract_validated(&FetchedDocument::from_text(REPO_PAGE))
        .unwrap();
    assert!(!record.contains_key("fork"));
    assert_eq!(record.get("star_count").unwrap(), &Value::Int(128));
    assert_eq!(record.get("meta_content").unwrap(), &Value::from("Not found!"));
}

#[test]
fn extracted_values_replace_defaults() {
    init_logging();
    let mut rules = RuleSet::new();
    rules.add_tree_with("meta_content", "div.meta span::text", Aggregation::JoinAll);
    let extractor = ItemExtractor::new(repo_schema(), rules);

    let record = extractor
        .extract(&FetchedDocument::from_text(REPO_PAGE))
        .unwrap();
    assert_eq!(
        record.get("meta_content").unwrap(),
        &Value::from("A simple crawler")
    );
}

#[test]
fn extraction_does_not_validate() {
    init_logging();
    let mut rules = RuleSet::new();
    rules.add_tree("star_count", "h1 strong a::text");
    let extractor = ItemExtractor::new(repo_schema(), rules);
    let doc = FetchedDocument::from_text(REPO_PAGE);

    // The raw record is inspectable even though it would not validate.
    let record = extractor.extract(&doc).unwrap();
    assert_eq!(record.get("star_count").unwrap(), &Value::from("Ant Nest"));

    let err = extractor.extract_validated(&doc).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Validation(FieldValidationError::Missing { ref field, .. }) if field == "title"
    ));
}

#[test]
fn structured_null_is_kept_and_compared_like_any_value() {
    init_logging();
    let schema = RecordSchema::builder("Package")
        .field("license", Field::string().nullable())
        .build()
        .unwrap();
    let doc = FetchedDocument::from_text(r#"{"license": null, "meta": {"license": null}}"#);

    let mut rules = RuleSet::new();
    rules
        .add_structured("license", "license")
        .add_structured("license", "$.meta.license");
    let record = ItemExtractor::new(schema.clone(), rules)
        .extract(&doc)
        .unwrap();
    assert_eq!(record.get("license").unwrap(), &Value::Null);

    let mut rules = RuleSet::new();
    rules
        .add_structured("license", "license")
        .add_regex("license", r#""(license)""#);
    let err = ItemExtractor::new(schema, rules).extract(&doc).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Conflict { first: Value::Null, .. }
    ));
}

#[test]
fn unavailable_view_fails_the_pass() {
    init_logging();
    let mut rules = RuleSet::new();
    rules
        .add_tree("title", "h1 strong a::text")
        .add_structured("star_count", "stargazers_count");
    let extractor = ItemExtractor::new(repo_schema(), rules);

    let err = extractor
        .extract(&FetchedDocument::from_text(REPO_PAGE))
        .unwrap_err();
    assert!(matches!(err, ExtractError::View(ViewError::Structured(_))));
}

/// Views served by a collaborator that only has text available.
struct TextOnly(&'static str);

impl DocumentViews for TextOnly {
    fn tree_view(&self) -> Result<&Html, ViewError> {
        Err(ViewError::Unavailable {
            view: "tree",
            reason: "not parsed".into(),
        })
    }

    fn text_view(&self) -> Result<&str, ViewError> {
        Ok(self.0)
    }

    fn structured_view(&self) -> Result<&serde_json::Value, ViewError> {
        Err(ViewError::Unavailable {
            view: "structured",
            reason: "not json".into(),
        })
    }
}

#[test]
fn extractor_accepts_any_view_provider() {
    init_logging();
    let mut rules = RuleSet::new();
    rules.add_regex("title", r"title: (.+)");
    let extractor = ItemExtractor::new(repo_schema(), rules.clone());
    let record = extractor.extract(&TextOnly("title: Ant Nest")).unwrap();
    assert_eq!(record.get("title").unwrap(), &Value::from("Ant Nest"));

    rules.add_tree("title", "h1");
    let err = ItemExtractor::new(repo_schema(), rules)
        .extract(&TextOnly("title: Ant Nest"))
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::View(ViewError::Unavailable { view: "tree", .. })
    ));
}

#[test]
fn oversized_json_integer_fails_validation() {
    init_logging();
    let schema = RecordSchema::builder("Package")
        .field("id", Field::integer())
        .build()
        .unwrap();
    let mut rules = RuleSet::new();
    rules.add_structured("id", "id");
    let extractor = ItemExtractor::new(schema, rules);

    let err = extractor
        .extract_validated(&FetchedDocument::from_text(r#"{"id": 18446744073709551615}"#))
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Validation(FieldValidationError::Coerce {
            source: CoerceError::OutOfRange(_),
            ..
        })
    ));
}

#[test]
fn one_extractor_serves_parallel_passes() {
    init_logging();
    let mut rules = RuleSet::new();
    rules
        .add_tree("title", "h1 strong a::text")
        .add_tree("author", "h1 .author a::text")
        .add_regex("star_count", r#"href="/stargazers">(\d+)<"#);
    let extractor = ItemExtractor::new(repo_schema(), rules);

    let titles: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["Ant Nest", "Bee Hive", "Wasp Den"]
            .into_iter()
            .map(|title| {
                let extractor = &extractor;
                scope.spawn(move || {
                    let page = REPO_PAGE.replace("Ant Nest", title);
                    let record = extractor
                        .extract_validated(&FetchedDocument::from_text(page))
                        .unwrap();
                    record.get("title").unwrap().as_str().unwrap().to_string()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(titles, vec!["Ant Nest", "Bee Hive", "Wasp Den"]);
}
