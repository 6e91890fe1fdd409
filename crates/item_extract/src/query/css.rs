use ego_tree::NodeRef;
use item_core::Value;
use scraper::node::Node;
use scraper::Selector;

use super::QueryEvaluator;
use crate::{DocumentViews, ExtractError, QueryLanguage};

/// CSS selectors over the tree view.
///
/// A selector may end in one of:
/// - `::text`: each direct text child of every matched element
/// - `::attr(name)`: the attribute value of every matched element that has it
/// - `::html`: the outer HTML of every matched element
///
/// Without a suffix each matched element yields all of its descendant text.
/// Any other `::` is left to the selector parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeQueryEvaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target<'a> {
    Text,
    OwnText,
    Attr(&'a str),
    Html,
}

impl QueryEvaluator for TreeQueryEvaluator {
    fn evaluate(
        &self,
        pattern: &str,
        views: &dyn DocumentViews,
    ) -> Result<Vec<Value>, ExtractError> {
        let invalid = |message: String| ExtractError::InvalidPattern {
            language: QueryLanguage::Tree,
            pattern: pattern.to_string(),
            message,
        };
        let (selector, target) = split_target(pattern);
        let selector = Selector::parse(selector).map_err(|e| invalid(e.to_string()))?;
        let document = views.tree_view()?;

        let mut matches = Vec::new();
        for element in document.select(&selector) {
            match target {
                Target::Text => matches.push(Value::Str(element.text().collect())),
                Target::OwnText => matches.extend(element.children().filter_map(text_node)),
                Target::Attr(name) => {
                    if let Some(value) = element.value().attr(name) {
                        matches.push(Value::from(value));
                    }
                }
                Target::Html => matches.push(Value::Str(element.html())),
            }
        }
        Ok(matches)
    }
}

fn split_target(pattern: &str) -> (&str, Target<'_>) {
    pattern
        .rsplit_once("::")
        .and_then(|(selector, suffix)| {
            suffix_target(suffix.trim()).map(|target| (selector.trim_end(), target))
        })
        .unwrap_or((pattern, Target::Text))
}

fn suffix_target(suffix: &str) -> Option<Target<'_>> {
    match suffix {
        "text" => Some(Target::OwnText),
        "html" => Some(Target::Html),
        other => other
            .strip_prefix("attr(")
            .and_then(|rest| rest.strip_suffix(')'))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Target::Attr),
    }
}

fn text_node(node: NodeRef<'_, Node>) -> Option<Value> {
    node.value().as_text().map(|text| Value::from(&**text))
}
