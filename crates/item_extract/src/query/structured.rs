use item_core::Value;
use serde_json::Value as JsonValue;

use super::QueryEvaluator;
use crate::{DocumentViews, ExtractError, QueryLanguage};

/// Dotted paths over the structured view.
///
/// Grammar: an optional leading `$`, then segments separated by `.`:
/// `name`, `*` (every child), `[n]` (0-based, negative counts from the end),
/// `[*]`, or a quoted key `['name']`. Segments that do not resolve simply
/// contribute no matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredPathEvaluator;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(i64),
    Wildcard,
}

impl QueryEvaluator for StructuredPathEvaluator {
    fn evaluate(
        &self,
        pattern: &str,
        views: &dyn DocumentViews,
    ) -> Result<Vec<Value>, ExtractError> {
        let segments = parse_path(pattern).map_err(|message| ExtractError::InvalidPattern {
            language: QueryLanguage::Structured,
            pattern: pattern.to_string(),
            message,
        })?;
        let root = views.structured_view()?;
        Ok(select(root, &segments).into_iter().map(Value::from).collect())
    }
}

fn parse_path(path: &str) -> Result<Vec<Segment>, String> {
    let path = path.trim();
    let mut rest = path.strip_prefix('$').unwrap_or(path);
    let mut segments = Vec::new();

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            if after.is_empty() || after.starts_with('.') {
                return Err("empty path segment".to_string());
            }
            rest = after;
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after
                .find(']')
                .ok_or_else(|| "unclosed '['".to_string())?;
            segments.push(parse_bracket(after[..end].trim())?);
            rest = &after[end + 1..];
        } else {
            let end = rest.find(&['.', '['][..]).unwrap_or(rest.len());
            let name = &rest[..end];
            segments.push(match name {
                "*" => Segment::Wildcard,
                _ => Segment::Key(name.to_string()),
            });
            rest = &rest[end..];
        }
    }
    Ok(segments)
}

fn parse_bracket(inner: &str) -> Result<Segment, String> {
    if inner == "*" {
        return Ok(Segment::Wildcard);
    }
    for quote in ['\'', '"'] {
        if let Some(key) = inner
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return Ok(Segment::Key(key.to_string()));
        }
    }
    inner
        .parse::<i64>()
        .map(Segment::Index)
        .map_err(|_| format!("invalid index '[{inner}]'"))
}

fn select<'a>(root: &'a JsonValue, segments: &[Segment]) -> Vec<&'a JsonValue> {
    let mut current = vec![root];
    for segment in segments {
        current = current
            .into_iter()
            .flat_map(|node| step(node, segment))
            .collect();
    }
    current
}

fn step<'a>(node: &'a JsonValue, segment: &Segment) -> Vec<&'a JsonValue> {
    match (segment, node) {
        (Segment::Key(key), JsonValue::Object(map)) => map.get(key).into_iter().collect(),
        (Segment::Index(index), JsonValue::Array(items)) => resolve_index(*index, items.len())
            .and_then(|i| items.get(i))
            .into_iter()
            .collect(),
        (Segment::Wildcard, JsonValue::Array(items)) => items.iter().collect(),
        (Segment::Wildcard, JsonValue::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        usize::try_from(index).ok()
    } else {
        let len = i64::try_from(len).ok()?;
        usize::try_from(len + index).ok()
    }
}
