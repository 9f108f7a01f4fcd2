//! Nested query - scopes an inner clause to one child of a nested relation

use serde_json::{json, Value};

use crate::query::ast::QueryNode;
use crate::query::context::nested_views;

/// Matches a document when at least one child of `path` satisfies `query`
///
/// Unlike a plain dotted term, all conditions of the inner query must hold
/// for the same child object. Child scores roll up with `score_mode: max`.
#[derive(Clone, Debug)]
pub struct NestedQuery {
    pub path: String,
    pub query: Box<dyn QueryNode>,
}

impl NestedQuery {
    pub fn new(path: impl Into<String>, query: impl QueryNode + 'static) -> Self {
        Self {
            path: path.into(),
            query: Box::new(query),
        }
    }
}

impl QueryNode for NestedQuery {
    fn to_dsl(&self) -> Value {
        json!({
            "nested": {
                "path": self.path,
                "score_mode": "max",
                "query": self.query.to_dsl()
            }
        })
    }

    fn matches(&self, document: &Value) -> bool {
        nested_views(document, &self.path)
            .iter()
            .any(|view| self.query.matches(view))
    }

    fn query_type(&self) -> &'static str {
        "nested"
    }

    fn is_scoring(&self) -> bool {
        self.query.is_scoring()
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
