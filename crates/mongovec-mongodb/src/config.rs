use std::time::Duration;

/// Largest `numCandidates` Atlas accepts.
pub const MAX_NUM_CANDIDATES: i64 = 10_000;

// ---------------------------------------------------------------------------
// MongoConfig
// ---------------------------------------------------------------------------

/// Field layout and search tuning for a [`MongoClient`](crate::MongoClient).
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Field name storing the embedding vector (default: `embedding`).
    pub vector_field: String,
    /// Field name storing the document content (default: `content`).
    pub content_field: String,
    /// Field the relevance score is written to in search results (default: `score`).
    pub score_field: String,
    /// Text embedded once to discover the embedding dimensionality when a
    /// search index has to be created (default: `"0"`).
    pub probe_text: String,
    /// Number of candidates for `$vectorSearch`. Defaults to `10 * limit`
    /// when unset. Capped at [`MAX_NUM_CANDIDATES`] but never lower than
    /// the requested limit.
    pub num_candidates: Option<i64>,
}

impl MongoConfig {
    pub fn new() -> Self {
        Self {
            vector_field: "embedding".to_string(),
            content_field: "content".to_string(),
            score_field: "score".to_string(),
            probe_text: "0".to_string(),
            num_candidates: None,
        }
    }

    /// Set the field name for storing embedding vectors.
    pub fn with_vector_field(mut self, vector_field: impl Into<String>) -> Self {
        self.vector_field = vector_field.into();
        self
    }

    /// Set the field name for storing document content.
    pub fn with_content_field(mut self, content_field: impl Into<String>) -> Self {
        self.content_field = content_field.into();
        self
    }

    /// Set the field name the search score is projected into.
    pub fn with_score_field(mut self, score_field: impl Into<String>) -> Self {
        self.score_field = score_field.into();
        self
    }

    /// Set the text used to probe the embedding dimensionality.
    pub fn with_probe_text(mut self, probe_text: impl Into<String>) -> Self {
        self.probe_text = probe_text.into();
        self
    }

    /// Set the number of candidates for `$vectorSearch`.
    pub fn with_num_candidates(mut self, num_candidates: i64) -> Self {
        self.num_candidates = Some(num_candidates);
        self
    }

    /// Candidate pool for a query returning at most `limit` documents.
    pub fn num_candidates_for(&self, limit: usize) -> i64 {
        let limit = limit as i64;
        match self.num_candidates {
            Some(n) => n.min(MAX_NUM_CANDIDATES).max(limit),
            None => limit.saturating_mul(10).min(MAX_NUM_CANDIDATES).max(limit),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// PollPolicy
// ---------------------------------------------------------------------------

/// How long [`IndexReadinessPoller`](crate::IndexReadinessPoller) keeps
/// checking. A poll that never succeeds performs `max_attempts + 1` checks
/// with `interval` between consecutive checks.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub max_attempts: usize,
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: usize, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}
