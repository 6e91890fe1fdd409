use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use item_core::Value;
use serde::{Deserialize, Serialize};

use crate::ExtractError;

/// Which query language an instruction uses, and so which document view it
/// runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryLanguage {
    /// CSS selector over the tree view.
    #[serde(alias = "css")]
    Tree,
    /// Regular expression over the text view.
    #[serde(alias = "re")]
    Regex,
    /// Dotted path over the structured view.
    #[serde(alias = "json", alias = "jpath")]
    Structured,
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryLanguage::Tree => write!(f, "tree"),
            QueryLanguage::Regex => write!(f, "regex"),
            QueryLanguage::Structured => write!(f, "structured"),
        }
    }
}

impl FromStr for QueryLanguage {
    type Err = ExtractError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "tree" | "css" => Ok(QueryLanguage::Tree),
            "regex" | "re" => Ok(QueryLanguage::Regex),
            "structured" | "json" | "jpath" => Ok(QueryLanguage::Structured),
            _ => Err(ExtractError::UnsupportedQueryLanguage(tag.to_string())),
        }
    }
}

/// How the raw matches of one instruction are reduced to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// First match; zero matches means "no match".
    #[default]
    TakeFirst,
    /// String matches concatenated in order, other matches dropped.
    JoinAll,
    /// Every match, unchanged, as a list.
    #[serde(alias = "do_nothing")]
    NoOp,
}

impl Aggregation {
    /// Reduces `matches`; `None` signals that the instruction matched nothing.
    pub fn apply(self, matches: Vec<Value>) -> Option<Value> {
        match self {
            Aggregation::TakeFirst => matches.into_iter().next(),
            Aggregation::JoinAll => Some(Value::Str(
                matches.iter().filter_map(Value::as_str).collect(),
            )),
            Aggregation::NoOp => Some(Value::List(matches)),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::TakeFirst => write!(f, "take_first"),
            Aggregation::JoinAll => write!(f, "join_all"),
            Aggregation::NoOp => write!(f, "no_op"),
        }
    }
}

impl FromStr for Aggregation {
    type Err = ExtractError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "take_first" => Ok(Aggregation::TakeFirst),
            "join_all" => Ok(Aggregation::JoinAll),
            "no_op" | "do_nothing" => Ok(Aggregation::NoOp),
            _ => Err(ExtractError::UnsupportedAggregation(tag.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub language: QueryLanguage,
    pub pattern: String,
    #[serde(default)]
    pub aggregation: Aggregation,
}

impl Instruction {
    pub fn new(
        language: QueryLanguage,
        pattern: impl Into<String>,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            language,
            pattern: pattern.into(),
            aggregation,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?} ({})", self.language, self.pattern, self.aggregation)
    }
}

/// Extraction instructions for one record type, keyed by field name.
///
/// Instructions for a field run in the order they were added; fields are
/// resolved in the order they first received an instruction.
///
/// A rule set can also be declared as JSON:
///
/// ```json
/// {
///   "title": [{ "language": "css", "pattern": "h1 strong a::text" }],
///   "star": [
///     { "language": "regex", "pattern": "(\\d+) stars" },
///     { "language": "jpath", "pattern": "stargazers_count" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: IndexMap<String, Vec<Instruction>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ExtractError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let json = fs::read_to_string(path).map_err(|source| ExtractError::RuleFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Appends an instruction for `field`; earlier instructions are kept.
    pub fn add_rule(
        &mut self,
        field: impl Into<String>,
        language: QueryLanguage,
        pattern: impl Into<String>,
        aggregation: Aggregation,
    ) -> &mut Self {
        self.rules
            .entry(field.into())
            .or_default()
            .push(Instruction::new(language, pattern, aggregation));
        self
    }

    pub fn add_tree(&mut self, field: impl Into<String>, selector: impl Into<String>) -> &mut Self {
        self.add_rule(field, QueryLanguage::Tree, selector, Aggregation::TakeFirst)
    }

    pub fn add_tree_with(
        &mut self,
        field: impl Into<String>,
        selector: impl Into<String>,
        aggregation: Aggregation,
    ) -> &mut Self {
        self.add_rule(field, QueryLanguage::Tree, selector, aggregation)
    }

    pub fn add_regex(&mut self, field: impl Into<String>, pattern: impl Into<String>) -> &mut Self {
        self.add_rule(field, QueryLanguage::Regex, pattern, Aggregation::TakeFirst)
    }

    pub fn add_regex_with(
        &mut self,
        field: impl Into<String>,
        pattern: impl Into<String>,
        aggregation: Aggregation,
    ) -> &mut Self {
        self.add_rule(field, QueryLanguage::Regex, pattern, aggregation)
    }

    pub fn add_structured(
        &mut self,
        field: impl Into<String>,
        path: impl Into<String>,
    ) -> &mut Self {
        self.add_rule(field, QueryLanguage::Structured, path, Aggregation::TakeFirst)
    }

    pub fn add_structured_with(
        &mut self,
        field: impl Into<String>,
        path: impl Into<String>,
        aggregation: Aggregation,
    ) -> &mut Self {
        self.add_rule(field, QueryLanguage::Structured, path, aggregation)
    }

    pub fn instructions(&self, field: &str) -> &[Instruction] {
        self.rules.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Instruction])> {
        self.rules
            .iter()
            .map(|(field, instructions)| (field.as_str(), instructions.as_slice()))
    }

    /// Number of fields with at least one instruction.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
