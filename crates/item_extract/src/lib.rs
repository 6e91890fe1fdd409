//! Item extraction: document views, extraction rules and the engine that
//! turns a fetched document into a typed record.
mod decode;
mod document;
mod error;
mod extractor;
mod query;
mod rules;

pub use decode::{decode_text, DecodeError, DecodePolicy, DecodedText};
pub use document::{DocumentViews, FetchedDocument, ViewError};
pub use error::ExtractError;
pub use extractor::ItemExtractor;
pub use query::{
    QueryDispatcher, QueryEvaluator, RegexEvaluator, StructuredPathEvaluator, TreeQueryEvaluator,
};
pub use rules::{Aggregation, Instruction, QueryLanguage, RuleSet};

pub use scraper::Html;
