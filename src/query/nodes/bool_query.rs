//! Boolean query - combines multiple clauses with AND and OR semantics

use serde_json::{json, Map, Value};

use crate::query::ast::QueryNode;

/// Boolean query combining multiple clauses
///
/// The boolean query supports three types of clauses:
/// - `must`: All clauses must match (AND). Contributes to score.
/// - `should`: At least one clause should match (OR). Contributes to score.
/// - `filter`: All clauses must match (AND). Does not contribute to score.
///
/// Without an explicit `minimum_should_match`, should clauses are required
/// only when there is no must or filter clause. A query with no clauses at
/// all matches every document.
///
/// # Example
///
/// ```json
/// {
///   "bool": {
///     "must": [{ "match": { "_all": { "query": "phone", "operator": "or" } } }],
///     "filter": [
///       { "bool": { "should": [{ "term": { "color": "red" } }], "minimum_should_match": 1 } },
///       { "range": { "real_price": { "lt": 100 } } }
///     ]
///   }
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct BoolQuery {
    /// Clauses that must match (AND, scoring)
    pub must: Vec<Box<dyn QueryNode>>,
    /// Clauses where at least one should match (OR, scoring)
    pub should: Vec<Box<dyn QueryNode>>,
    /// Clauses that must match (AND, no scoring)
    pub filter: Vec<Box<dyn QueryNode>>,
    /// Minimum number of should clauses that must match
    pub minimum_should_match: Option<usize>,
}

impl BoolQuery {
    /// Create a new empty boolean query
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a must clause
    pub fn must(mut self, query: impl QueryNode + 'static) -> Self {
        self.must.push(Box::new(query));
        self
    }

    /// Add a should clause
    pub fn should(mut self, query: impl QueryNode + 'static) -> Self {
        self.should.push(Box::new(query));
        self
    }

    /// Add a filter clause
    pub fn filter(mut self, query: impl QueryNode + 'static) -> Self {
        self.filter.push(Box::new(query));
        self
    }

    /// Add a must clause (boxed)
    pub fn must_boxed(mut self, query: Box<dyn QueryNode>) -> Self {
        self.must.push(query);
        self
    }

    /// Add a should clause (boxed)
    pub fn should_boxed(mut self, query: Box<dyn QueryNode>) -> Self {
        self.should.push(query);
        self
    }

    /// Add a filter clause (boxed)
    pub fn filter_boxed(mut self, query: Box<dyn QueryNode>) -> Self {
        self.filter.push(query);
        self
    }

    /// Set minimum should match
    pub fn with_minimum_should_match(mut self, count: usize) -> Self {
        self.minimum_should_match = Some(count);
        self
    }

    /// Check if this is an empty query
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.filter.is_empty()
    }

    /// Get total number of clauses
    pub fn clause_count(&self) -> usize {
        self.must.len() + self.should.len() + self.filter.len()
    }

    fn required_should_matches(&self) -> usize {
        match self.minimum_should_match {
            Some(count) => count,
            None if self.must.is_empty() && self.filter.is_empty() => 1,
            None => 0,
        }
    }
}

fn clauses_dsl(clauses: &[Box<dyn QueryNode>]) -> Value {
    Value::Array(clauses.iter().map(|clause| clause.to_dsl()).collect())
}

impl QueryNode for BoolQuery {
    fn to_dsl(&self) -> Value {
        let mut body = Map::new();
        for (occur, clauses) in [
            ("must", &self.must),
            ("should", &self.should),
            ("filter", &self.filter),
        ] {
            if !clauses.is_empty() {
                body.insert(occur.to_string(), clauses_dsl(clauses));
            }
        }
        if let Some(count) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(count));
        }

        let mut root = Map::new();
        root.insert("bool".to_string(), Value::Object(body));
        Value::Object(root)
    }

    fn matches(&self, document: &Value) -> bool {
        if !self.filter.iter().all(|q| q.matches(document)) {
            return false;
        }
        if !self.must.iter().all(|q| q.matches(document)) {
            return false;
        }
        if self.should.is_empty() {
            return true;
        }

        let matched = self.should.iter().filter(|q| q.matches(document)).count();
        matched >= self.required_should_matches()
    }

    fn query_type(&self) -> &'static str {
        "bool"
    }

    fn is_scoring(&self) -> bool {
        // Bool query scores if any must or should clause scores
        self.must.iter().any(|q| q.is_scoring()) || self.should.iter().any(|q| q.is_scoring())
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::MatchAllQuery;
    use crate::query::nodes::{MatchQuery, RangeQuery, TermQuery};

    #[test]
    fn test_bool_query_creation() {
        let query = BoolQuery::new()
            .must(MatchQuery::new("_all", "rust"))
            .should(TermQuery::new("tags", "tutorial"))
            .filter(RangeQuery::new("year").gte(2024));

        assert_eq!(query.must.len(), 1);
        assert_eq!(query.should.len(), 1);
        assert_eq!(query.filter.len(), 1);
        assert_eq!(query.clause_count(), 3);
    }

    #[test]
    fn test_bool_query_dsl_omits_empty_occurrences() {
        let query = BoolQuery::new()
            .should(TermQuery::new("color", "red"))
            .should(TermQuery::new("color", "blue"))
            .with_minimum_should_match(1);

        assert_eq!(
            query.to_dsl(),
            json!({
                "bool": {
                    "should": [
                        { "term": { "color": "red" } },
                        { "term": { "color": "blue" } }
                    ],
                    "minimum_should_match": 1
                }
            })
        );
        assert_eq!(BoolQuery::new().to_dsl(), json!({ "bool": {} }));
    }

    #[test]
    fn test_bool_query_empty_matches_everything() {
        let query = BoolQuery::new();
        assert!(query.is_empty());
        assert!(query.matches(&json!({})));
    }

    #[test]
    fn test_bool_query_should_semantics() {
        let doc = json!({ "color": "green", "stock": 1 });

        let only_should = BoolQuery::new()
            .should(TermQuery::new("color", "red"))
            .should(TermQuery::new("color", "blue"));
        assert!(!only_should.matches(&doc));

        // Should becomes optional next to a filter clause...
        let optional = only_should.clone().filter(MatchAllQuery);
        assert!(optional.matches(&doc));

        // ...unless minimum_should_match says otherwise
        let required = optional.with_minimum_should_match(1);
        assert!(!required.matches(&doc));
    }

    #[test]
    fn test_bool_query_scoring() {
        let scoring_query = BoolQuery::new().must(MatchQuery::new("content", "rust"));
        let non_scoring_query = BoolQuery::new().filter(RangeQuery::new("year").gte(2024));

        assert!(scoring_query.is_scoring());
        assert!(!non_scoring_query.is_scoring());
    }

    #[test]
    fn test_bool_query_clone() {
        let query = BoolQuery::new().must(MatchQuery::new("content", "rust"));
        let cloned = query.clone_box();
        assert_eq!(cloned.query_type(), "bool");
        assert_eq!(cloned.to_dsl(), query.to_dsl());
    }
}
