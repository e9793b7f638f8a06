use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for mongovec.
///
/// Database errors are split in two: [`MongovecError::Operation`] for
/// failures the server reported about a specific command or write
/// (permissions, malformed index definitions, duplicate keys), and
/// [`MongovecError::Database`] for everything else (transport, selection
/// timeouts, authentication handshakes, cursor errors).
#[derive(Debug, Error)]
pub enum MongovecError {
    #[error("operation failure{}: {message}", fmt_code(.code))]
    Operation { code: Option<i32>, message: String },
    #[error("database error: {0}")]
    Database(String),
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("model error: {0}")]
    Model(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("config error: {0}")]
    Config(String),
}

impl MongovecError {
    /// Whether the server rejected the operation itself, as opposed to the
    /// request never completing.
    pub fn is_operation_failure(&self) -> bool {
        matches!(self, MongovecError::Operation { .. })
    }
}

fn fmt_code(code: &Option<i32>) -> String {
    code.map(|c| format!(" (code {c})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, MongovecError>;

// ---------------------------------------------------------------------------
// Embeddings trait
// ---------------------------------------------------------------------------

/// Trait for embedding text into vectors.
///
/// Every vector produced by one implementation has the same length; that
/// length is what search indexes are provisioned with.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed multiple texts (for batch document embedding).
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A document to be embedded and stored in a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(
        id: impl Into<String>,
        content: impl Into<String>,
        metadata: HashMap<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            content: content.into(),
            metadata,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// ---------------------------------------------------------------------------
// SearchResult
// ---------------------------------------------------------------------------

/// A document returned by a semantic search, with its relevance score
/// (higher = more similar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub score: f32,
}

/// Sort results by descending score. Ties keep their original order and
/// NaN scores sort last.
pub fn sort_by_score_desc(results: &mut [SearchResult]) {
    fn rank(score: f32) -> f32 {
        if score.is_nan() {
            f32::NEG_INFINITY
        } else {
            score
        }
    }
    results.sort_by(|a, b| rank(b.score).total_cmp(&rank(a.score)));
}
