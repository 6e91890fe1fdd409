use std::io;
use std::path::PathBuf;

use item_core::{FieldValidationError, RecordError, Value};
use thiserror::Error;

use crate::{QueryLanguage, ViewError};

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Two instructions for one field produced different values.
    #[error("match different results {first} and {second} for key '{field}'")]
    Conflict {
        field: String,
        first: Value,
        second: Value,
    },
    #[error("query language '{0}' is not supported")]
    UnsupportedQueryLanguage(String),
    #[error("aggregation '{0}' is not supported")]
    UnsupportedAggregation(String),
    #[error("invalid {language} pattern {pattern:?}: {message}")]
    InvalidPattern {
        language: QueryLanguage,
        pattern: String,
        message: String,
    },
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Validation(#[from] FieldValidationError),
    #[error("cannot read rule file {path:?}: {source}")]
    RuleFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid rule configuration: {0}")]
    RuleConfig(#[from] serde_json::Error),
}
