//! Term query - exact match on a field

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::query::ast::QueryNode;
use crate::query::context::{resolve_field, term_of};

/// Query that matches documents containing an exact term in a field
///
/// Multi-valued fields match when any of their values equals the term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermQuery {
    /// Field to search in
    pub field: String,
    /// Exact term to match
    pub term: String,
}

impl TermQuery {
    /// Create a new term query
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
        }
    }
}

impl QueryNode for TermQuery {
    fn to_dsl(&self) -> Value {
        json!({ "term": { self.field.as_str(): self.term } })
    }

    fn matches(&self, document: &Value) -> bool {
        resolve_field(document, &self.field)
            .into_iter()
            .filter_map(term_of)
            .any(|value| value == self.term)
    }

    fn query_type(&self) -> &'static str {
        "term"
    }

    fn is_scoring(&self) -> bool {
        false
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
