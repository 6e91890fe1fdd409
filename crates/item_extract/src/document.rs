use std::cell::OnceCell;

use scraper::Html;
use thiserror::Error;

use crate::decode::{decode_text, DecodeError, DecodePolicy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("text view unavailable: {0}")]
    Decode(#[from] DecodeError),
    #[error("structured view unavailable: {0}")]
    Structured(String),
    #[error("{view} view unavailable: {reason}")]
    Unavailable { view: &'static str, reason: String },
}

/// The three read-only views of a fetched resource that queries run against.
///
/// Implementations are expected to compute each view at most once; a view
/// must not change between calls within one extraction pass.
pub trait DocumentViews {
    fn tree_view(&self) -> Result<&Html, ViewError>;
    fn text_view(&self) -> Result<&str, ViewError>;
    fn structured_view(&self) -> Result<&serde_json::Value, ViewError>;
}

/// A fetched body whose views are decoded and parsed lazily, on first use.
///
/// The tree and structured views are both built from the text view, so a
/// decode failure makes all three unavailable.
#[derive(Debug)]
pub struct FetchedDocument {
    bytes: Vec<u8>,
    content_type: Option<String>,
    policy: DecodePolicy,
    text: OnceCell<Result<String, ViewError>>,
    tree: OnceCell<Html>,
    structured: OnceCell<Result<serde_json::Value, ViewError>>,
}

impl FetchedDocument {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
            policy: DecodePolicy::Strict,
            text: OnceCell::new(),
            tree: OnceCell::new(),
            structured: OnceCell::new(),
        }
    }

    /// A document whose body is already decoded.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            bytes: Vec::new(),
            content_type: None,
            policy: DecodePolicy::Strict,
            text: OnceCell::from(Ok(text.into())),
            tree: OnceCell::new(),
            structured: OnceCell::new(),
        }
    }

    /// Replace malformed byte sequences instead of failing the text view.
    pub fn lossy(mut self) -> Self {
        self.policy = DecodePolicy::Lossy;
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn decode(&self) -> Result<String, ViewError> {
        let decoded = decode_text(&self.bytes, self.content_type.as_deref(), self.policy)?;
        item_logging::item_trace!(
            "decoded {} bytes as {}",
            self.bytes.len(),
            decoded.encoding_label
        );
        Ok(decoded.text)
    }
}

impl DocumentViews for FetchedDocument {
    fn tree_view(&self) -> Result<&Html, ViewError> {
        let text = self.text_view()?;
        Ok(self.tree.get_or_init(|| Html::parse_document(text)))
    }

    fn text_view(&self) -> Result<&str, ViewError> {
        self.text
            .get_or_init(|| self.decode())
            .as_deref()
            .map_err(Clone::clone)
    }

    fn structured_view(&self) -> Result<&serde_json::Value, ViewError> {
        let text = self.text_view()?;
        self.structured
            .get_or_init(|| {
                serde_json::from_str(text).map_err(|e| ViewError::Structured(e.to_string()))
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}
