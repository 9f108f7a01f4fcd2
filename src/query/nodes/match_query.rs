//! Match query - full-text search on a field

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

use crate::query::ast::QueryNode;
use crate::query::context::resolve_field;

/// Field name that targets every attribute of the document
pub const ALL_FIELDS: &str = "_all";

/// Full-text query: the text is split into words and any of them matching
/// the field is enough (`operator: or`)
///
/// With the `_all` field every string attribute of the document is searched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchQuery {
    /// Field to search in
    pub field: String,
    /// Query text
    pub query: String,
}

impl MatchQuery {
    /// Create a new match query
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
        }
    }

    fn document_words(&self, document: &Value) -> HashSet<String> {
        let mut texts = Vec::new();
        if self.field == ALL_FIELDS {
            collect_strings(document, &mut texts);
        } else {
            texts.extend(
                resolve_field(document, &self.field)
                    .into_iter()
                    .filter_map(Value::as_str),
            );
        }
        texts.into_iter().flat_map(words).collect()
    }
}

fn words(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

fn collect_strings<'v>(value: &'v Value, out: &mut Vec<&'v str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| !key.starts_with('_'))
            .for_each(|(_, item)| collect_strings(item, out)),
        _ => {}
    }
}

impl QueryNode for MatchQuery {
    fn to_dsl(&self) -> Value {
        json!({
            "match": {
                self.field.as_str(): {
                    "query": self.query,
                    "operator": "or"
                }
            }
        })
    }

    fn matches(&self, document: &Value) -> bool {
        let query_words = words(&self.query);
        if query_words.is_empty() {
            return false;
        }

        let document_words = self.document_words(document);
        query_words.iter().any(|w| document_words.contains(w))
    }

    fn query_type(&self) -> &'static str {
        "match"
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_query_dsl() {
        let query = MatchQuery::new(ALL_FIELDS, "red shoes");
        assert_eq!(
            query.to_dsl(),
            json!({ "match": { "_all": { "query": "red shoes", "operator": "or" } } })
        );
        assert!(query.is_scoring());
    }

    #[test]
    fn test_match_all_fields() {
        let doc = json!({
            "name": "Running Shoes",
            "brand": { "name": "Acme" },
            "_type": "product"
        });

        assert!(MatchQuery::new(ALL_FIELDS, "shoes").matches(&doc));
        assert!(MatchQuery::new(ALL_FIELDS, "ACME boots").matches(&doc));
        assert!(!MatchQuery::new(ALL_FIELDS, "product").matches(&doc));
        assert!(!MatchQuery::new(ALL_FIELDS, "   ").matches(&doc));
    }

    #[test]
    fn test_match_single_field_any_word() {
        let doc = json!({ "name": "running shoes", "description": "boots" });

        assert!(MatchQuery::new("name", "trail running").matches(&doc));
        assert!(!MatchQuery::new("name", "boots").matches(&doc));
    }
}
