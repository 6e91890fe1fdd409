//! Query evaluation: one evaluator per query language, selected by a
//! dispatcher that also applies the instruction's aggregation.
mod css;
mod structured;
mod text;

use std::collections::HashMap;
use std::fmt;

use item_core::Value;

use crate::{Aggregation, DocumentViews, ExtractError, Instruction, QueryLanguage};

pub use css::TreeQueryEvaluator;
pub use structured::StructuredPathEvaluator;
pub use text::RegexEvaluator;

/// Runs a pattern of one query language against the matching document view.
pub trait QueryEvaluator: Send + Sync {
    /// Returns every match in document order. Zero matches is `Ok(vec![])`;
    /// malformed patterns and unavailable views are errors.
    fn evaluate(&self, pattern: &str, views: &dyn DocumentViews)
        -> Result<Vec<Value>, ExtractError>;
}

pub struct QueryDispatcher {
    evaluators: HashMap<QueryLanguage, Box<dyn QueryEvaluator>>,
}

impl QueryDispatcher {
    /// A dispatcher with no evaluators; every language is unsupported until
    /// registered.
    pub fn empty() -> Self {
        Self {
            evaluators: HashMap::new(),
        }
    }

    /// Installs `evaluator` for `language`, replacing any previous one.
    pub fn register(
        &mut self,
        language: QueryLanguage,
        evaluator: impl QueryEvaluator + 'static,
    ) -> &mut Self {
        self.evaluators.insert(language, Box::new(evaluator));
        self
    }

    pub fn supports(&self, language: QueryLanguage) -> bool {
        self.evaluators.contains_key(&language)
    }

    /// Evaluates `pattern` and aggregates its matches. `Ok(None)` means the
    /// pattern matched nothing and `aggregation` had nothing to take.
    pub fn evaluate(
        &self,
        language: QueryLanguage,
        pattern: &str,
        views: &dyn DocumentViews,
        aggregation: Aggregation,
    ) -> Result<Option<Value>, ExtractError> {
        let evaluator = self
            .evaluators
            .get(&language)
            .ok_or_else(|| ExtractError::UnsupportedQueryLanguage(language.to_string()))?;
        let matches = evaluator.evaluate(pattern, views)?;
        Ok(aggregation.apply(matches))
    }

    pub fn evaluate_instruction(
        &self,
        instruction: &Instruction,
        views: &dyn DocumentViews,
    ) -> Result<Option<Value>, ExtractError> {
        self.evaluate(
            instruction.language,
            &instruction.pattern,
            views,
            instruction.aggregation,
        )
    }
}

impl Default for QueryDispatcher {
    fn default() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher
            .register(QueryLanguage::Tree, TreeQueryEvaluator)
            .register(QueryLanguage::Regex, RegexEvaluator)
            .register(QueryLanguage::Structured, StructuredPathEvaluator);
        dispatcher
    }
}

impl fmt::Debug for QueryDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut languages: Vec<String> = self.evaluators.keys().map(ToString::to_string).collect();
        languages.sort();
        f.debug_struct("QueryDispatcher")
            .field("languages", &languages)
            .finish()
    }
}
