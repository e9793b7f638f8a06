use std::collections::HashMap;

use mongovec::mongodb::Similarity;
use mongovec::MongovecError;

/// Settings for the demo, read from environment variables.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub mongodb_uri: String,
    pub openai_api_key: String,
    pub database: String,
    pub collection: String,
    pub index: String,
    pub similarity: Similarity,
    pub dimensions: usize,
}

impl DemoConfig {
    pub fn from_env() -> Result<Self, MongovecError> {
        Self::from_vars(&std::env::vars().collect())
    }

    fn from_vars(vars: &HashMap<String, String>) -> Result<Self, MongovecError> {
        let required = |key: &str| {
            vars.get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| MongovecError::Config(format!("{key} must be set")))
        };
        let optional = |key: &str, default: &str| {
            vars.get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        let dimensions = optional("MONGOVEC_DIMENSIONS", "256")
            .parse::<usize>()
            .map_err(|e| MongovecError::Config(format!("MONGOVEC_DIMENSIONS: {e}")))?;

        Ok(Self {
            mongodb_uri: required("MONGODB_URI")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            database: optional("MONGOVEC_DATABASE", "kb"),
            collection: optional("MONGOVEC_COLLECTION", "docs"),
            index: optional("MONGOVEC_INDEX", "vec_idx"),
            similarity: optional("MONGOVEC_SIMILARITY", "cosine").parse()?,
            dimensions,
        })
    }
}
