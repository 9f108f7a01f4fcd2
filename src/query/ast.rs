//! Abstract Syntax Tree for compiled backend queries
//!
//! This module defines the core `QueryNode` trait that every backend clause
//! implements. A node renders itself to the backend's JSON DSL and can be
//! evaluated against a local document set.

use roaring::RoaringBitmap;
use serde_json::{json, Value};
use std::fmt::Debug;

use super::context::QueryContext;

/// Core trait for all query nodes in the AST
pub trait QueryNode: Send + Sync + Debug {
    /// Render this node in the backend's query DSL
    fn to_dsl(&self) -> Value;

    /// Whether the document (its field view) satisfies this node
    fn matches(&self, document: &Value) -> bool;

    /// Evaluate against every document of the context
    ///
    /// The bitmap contains document numbers (positions in the context).
    fn execute(&self, ctx: &QueryContext) -> RoaringBitmap {
        ctx.all_fields()
            .iter()
            .enumerate()
            .filter(|(_, fields)| self.matches(fields))
            .map(|(docno, _)| docno as u32)
            .collect()
    }

    /// Get the query type name for debugging and logging
    fn query_type(&self) -> &'static str;

    /// Whether this query produces scores (vs just filtering)
    fn is_scoring(&self) -> bool {
        true
    }

    /// Clone this query node into a boxed trait object
    fn clone_box(&self) -> Box<dyn QueryNode>;
}

impl Clone for Box<dyn QueryNode> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A query that matches all documents
#[derive(Clone, Debug, Default)]
pub struct MatchAllQuery;

impl QueryNode for MatchAllQuery {
    fn to_dsl(&self) -> Value {
        json!({ "match_all": {} })
    }

    fn matches(&self, _document: &Value) -> bool {
        true
    }

    fn query_type(&self) -> &'static str {
        "match_all"
    }

    fn is_scoring(&self) -> bool {
        false
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
