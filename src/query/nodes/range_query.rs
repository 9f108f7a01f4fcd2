//! Range query - matches documents with field values in a range

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::Range;
use crate::query::ast::QueryNode;
use crate::query::context::{number_of, resolve_field};
use crate::query::types::{RangeBounds, RangeValue};

/// Query that matches documents with a numeric field value within bounds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeQuery {
    /// Field to search in
    pub field: String,
    /// Range bounds (gte, lt)
    #[serde(flatten)]
    pub bounds: RangeBounds,
}

impl RangeQuery {
    /// Create a new range query
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            bounds: RangeBounds::default(),
        }
    }

    /// Build the clause for a decoded range token
    ///
    /// Returns `None` for a fully unbounded range: it would match everything.
    pub fn from_range(field: impl Into<String>, range: &Range) -> Option<Self> {
        let bounds = RangeBounds::from_range(range);
        (!bounds.is_empty()).then(|| Self::new(field).with_bounds(bounds))
    }

    /// Set the greater-than-or-equal bound
    pub fn gte(mut self, value: i64) -> Self {
        self.bounds.gte = Some(RangeValue::Long(value));
        self
    }

    /// Set the less-than bound
    pub fn lt(mut self, value: i64) -> Self {
        self.bounds.lt = Some(RangeValue::Long(value));
        self
    }

    /// Set the bounds from a RangeBounds struct
    pub fn with_bounds(mut self, bounds: RangeBounds) -> Self {
        self.bounds = bounds;
        self
    }
}

impl QueryNode for RangeQuery {
    fn to_dsl(&self) -> Value {
        json!({ "range": { self.field.as_str(): self.bounds } })
    }

    fn matches(&self, document: &Value) -> bool {
        resolve_field(document, &self.field)
            .into_iter()
            .filter_map(number_of)
            .any(|value| self.bounds.contains_f64(value))
    }

    fn query_type(&self) -> &'static str {
        "range"
    }

    fn is_scoring(&self) -> bool {
        // Range queries typically don't contribute to relevance
        false
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
