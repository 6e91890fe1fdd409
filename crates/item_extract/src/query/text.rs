use item_core::Value;
use regex::Regex;

use super::QueryEvaluator;
use crate::{DocumentViews, ExtractError, QueryLanguage};

/// Regular expressions over the text view, with find-all semantics.
///
/// A pattern without capture groups yields each whole match. With one group
/// each match yields that group (empty if it did not participate); with
/// several, a list of all group values.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexEvaluator;

impl QueryEvaluator for RegexEvaluator {
    fn evaluate(
        &self,
        pattern: &str,
        views: &dyn DocumentViews,
    ) -> Result<Vec<Value>, ExtractError> {
        let regex = Regex::new(pattern).map_err(|e| ExtractError::InvalidPattern {
            language: QueryLanguage::Regex,
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let text = views.text_view()?;
        Ok(find_all(&regex, text))
    }
}

fn find_all(regex: &Regex, text: &str) -> Vec<Value> {
    let groups = regex.captures_len() - 1;
    if groups == 0 {
        return regex
            .find_iter(text)
            .map(|m| Value::from(m.as_str()))
            .collect();
    }

    regex
        .captures_iter(text)
        .map(|caps| {
            let group = |i: usize| Value::from(caps.get(i).map_or("", |m| m.as_str()));
            if groups == 1 {
                group(1)
            } else {
                Value::List((1..=groups).map(group).collect())
            }
        })
        .collect()
}
