use std::fmt;
use std::str::FromStr;

use bson::{doc, Document as BsonDocument};
use mongovec_core::MongovecError;

/// Similarity metric of an Atlas vector search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Similarity {
    Cosine,
    Euclidean,
    DotProduct,
}

impl Similarity {
    /// The name Atlas expects in an index definition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Similarity::Cosine => "cosine",
            Similarity::Euclidean => "euclidean",
            Similarity::DotProduct => "dotProduct",
        }
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Similarity {
    type Err = MongovecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Similarity::Cosine),
            "euclidean" => Ok(Similarity::Euclidean),
            "dotproduct" | "dot_product" => Ok(Similarity::DotProduct),
            other => Err(MongovecError::Config(format!(
                "unknown similarity metric '{other}' (expected cosine, euclidean or dotProduct)"
            ))),
        }
    }
}

/// Declarative description of a vector search index on one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndexDefinition {
    pub name: String,
    /// Document field holding the vectors.
    pub path: String,
    pub num_dimensions: usize,
    pub similarity: Similarity,
}

impl SearchIndexDefinition {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        num_dimensions: usize,
        similarity: Similarity,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            num_dimensions,
            similarity,
        }
    }

    /// The `definition` document submitted with `createSearchIndexes`.
    pub fn to_bson(&self) -> BsonDocument {
        doc! {
            "fields": [
                {
                    "type": "vector",
                    "path": &self.path,
                    "numDimensions": self.num_dimensions as i64,
                    "similarity": self.similarity.as_str(),
                }
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_renders_vector_field() {
        let def = SearchIndexDefinition::new("vec_idx", "embedding", 256, Similarity::Cosine);
        let rendered = def.to_bson();
        let fields = rendered.get_array("fields").unwrap();
        assert_eq!(fields.len(), 1);
        let field = fields[0].as_document().unwrap();
        assert_eq!(field.get_str("type").unwrap(), "vector");
        assert_eq!(field.get_str("path").unwrap(), "embedding");
        assert_eq!(field.get_i64("numDimensions").unwrap(), 256);
        assert_eq!(field.get_str("similarity").unwrap(), "cosine");
    }

    #[test]
    fn similarity_parses_case_insensitively() {
        assert_eq!("Cosine".parse::<Similarity>().unwrap(), Similarity::Cosine);
        assert_eq!("euclidean".parse::<Similarity>().unwrap(), Similarity::Euclidean);
        assert_eq!("dotProduct".parse::<Similarity>().unwrap(), Similarity::DotProduct);
    }

    #[test]
    fn similarity_rejects_unknown() {
        let err = "manhattan".parse::<Similarity>().unwrap_err();
        assert!(matches!(err, MongovecError::Config(_)));
    }
}
