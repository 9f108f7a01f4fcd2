use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Compiler settings: the backend field names the compiled DSL refers to
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Meta field carrying the document type tag
    pub type_field: String,
    /// Document type every aggregation is scoped to
    pub primary_type: String,
    /// Numeric attribute behind `min_price` / `max_price`
    pub ranking_field: String,
    /// Field used for free-text matches across all attributes
    pub free_text_field: String,
    /// Maximum number of buckets requested per terms aggregation
    pub facet_size: usize,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            type_field: "_type".to_string(),
            primary_type: "product".to_string(),
            ranking_field: "real_price".to_string(),
            free_text_field: "_all".to_string(),
            facet_size: 10,
        }
    }
}

impl CompilerSettings {
    /// Load settings from a JSON file; missing keys keep their defaults
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Set the document type aggregations are scoped to
    pub fn with_primary_type(mut self, primary_type: impl Into<String>) -> Self {
        self.primary_type = primary_type.into();
        self
    }

    /// Set the ranking attribute used for the common min/max aggregates
    pub fn with_ranking_field(mut self, field: impl Into<String>) -> Self {
        self.ranking_field = field.into();
        self
    }

    /// Set the number of buckets requested per terms aggregation
    pub fn with_facet_size(mut self, size: usize) -> Self {
        self.facet_size = size;
        self
    }
}
