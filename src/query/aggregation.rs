//! Backend aggregation tree
//!
//! Aggregation nodes are plain values built by constructor functions; a node
//! with children renders them under `aggs`, keyed by child name.

use serde_json::{json, Map, Value};

use crate::models::{Range, COMPOSITE_KEY_SEPARATOR};
use crate::query::ast::QueryNode;
use crate::query::types::RangeValue;

/// Global scope: counts ignore the main query
pub const GLOBAL_SCOPE: &str = "all";

/// Scope restricted to the primary document type
pub const TYPE_SCOPE: &str = "all_products";

/// Scope holding the min/max aggregates of the ranking field
pub const COMMON_SCOPE: &str = "common";

pub const MIN_PRICE: &str = "min_price";
pub const MAX_PRICE: &str = "max_price";

/// One bucket of a range aggregation, keyed by its `"from..to"` token
///
/// Bounds follow [`Range::lower`]: a lower bound `<= 0` renders no `from`.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeBucket {
    pub key: String,
    pub range: Range,
}

impl RangeBucket {
    pub fn new(key: impl Into<String>, range: Range) -> Self {
        Self {
            key: key.into(),
            range,
        }
    }

    fn to_dsl(&self) -> Value {
        let mut bucket = Map::new();
        bucket.insert("key".to_string(), Value::String(self.key.clone()));
        if let Some(from) = self.range.lower() {
            bucket.insert("from".to_string(), json!(RangeValue::from_f64(from)));
        }
        if let Some(to) = self.range.upper() {
            bucket.insert("to".to_string(), json!(RangeValue::from_f64(to)));
        }
        Value::Object(bucket)
    }
}

/// Node of the aggregation tree
#[derive(Clone, Debug)]
pub enum AggregationNode {
    /// Ignores the main query: buckets over the whole index
    Global {
        name: String,
        children: Vec<AggregationNode>,
    },
    /// Narrows the documents its children see
    Filter {
        name: String,
        filter: Box<dyn QueryNode>,
        children: Vec<AggregationNode>,
    },
    /// Steps into the children of a nested relation
    Nested {
        name: String,
        path: String,
        children: Vec<AggregationNode>,
    },
    /// One bucket per distinct value; several fields join with `~~`
    Terms {
        name: String,
        fields: Vec<String>,
        size: usize,
    },
    Range {
        name: String,
        field: String,
        ranges: Vec<RangeBucket>,
    },
    Min {
        name: String,
        field: String,
    },
    Max {
        name: String,
        field: String,
    },
}

impl AggregationNode {
    pub fn global(name: impl Into<String>) -> Self {
        AggregationNode::Global {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn filter(name: impl Into<String>, filter: impl QueryNode + 'static) -> Self {
        AggregationNode::Filter {
            name: name.into(),
            filter: Box::new(filter),
            children: Vec::new(),
        }
    }

    pub fn nested(name: impl Into<String>, path: impl Into<String>) -> Self {
        AggregationNode::Nested {
            name: name.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    pub fn terms<I, F>(name: impl Into<String>, fields: I, size: usize) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        AggregationNode::Terms {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            size,
        }
    }

    pub fn range(name: impl Into<String>, field: impl Into<String>, ranges: Vec<RangeBucket>) -> Self {
        AggregationNode::Range {
            name: name.into(),
            field: field.into(),
            ranges,
        }
    }

    pub fn min(name: impl Into<String>, field: impl Into<String>) -> Self {
        AggregationNode::Min {
            name: name.into(),
            field: field.into(),
        }
    }

    pub fn max(name: impl Into<String>, field: impl Into<String>) -> Self {
        AggregationNode::Max {
            name: name.into(),
            field: field.into(),
        }
    }

    /// Append a child; leaf nodes (terms, range, min, max) are returned unchanged
    pub fn with_child(mut self, child: AggregationNode) -> Self {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            AggregationNode::Global { name, .. }
            | AggregationNode::Filter { name, .. }
            | AggregationNode::Nested { name, .. }
            | AggregationNode::Terms { name, .. }
            | AggregationNode::Range { name, .. }
            | AggregationNode::Min { name, .. }
            | AggregationNode::Max { name, .. } => name,
        }
    }

    pub fn children(&self) -> &[AggregationNode] {
        match self {
            AggregationNode::Global { children, .. }
            | AggregationNode::Filter { children, .. }
            | AggregationNode::Nested { children, .. } => children,
            _ => &[],
        }
    }

    /// Direct child by name
    pub fn child(&self, name: &str) -> Option<&AggregationNode> {
        self.children().iter().find(|child| child.name() == name)
    }

    fn children_mut(&mut self) -> Option<&mut Vec<AggregationNode>> {
        match self {
            AggregationNode::Global { children, .. }
            | AggregationNode::Filter { children, .. }
            | AggregationNode::Nested { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Render as `{ <name>: <body> }`
    pub fn to_dsl(&self) -> Value {
        let mut root = Map::new();
        root.insert(self.name().to_string(), self.body());
        Value::Object(root)
    }

    /// Render the children as an `aggs` object
    pub fn aggs_dsl(nodes: &[AggregationNode]) -> Value {
        Value::Object(
            nodes
                .iter()
                .map(|node| (node.name().to_string(), node.body()))
                .collect(),
        )
    }

    fn body(&self) -> Value {
        let mut body = match self {
            AggregationNode::Global { .. } => json!({ "global": {} }),
            AggregationNode::Filter { filter, .. } => json!({ "filter": filter.to_dsl() }),
            AggregationNode::Nested { path, .. } => json!({ "nested": { "path": path } }),
            AggregationNode::Terms { fields, size, .. } => match fields.as_slice() {
                [field] => json!({ "terms": { "field": field, "size": size } }),
                _ => json!({ "terms": { "script": composite_script(fields), "size": size } }),
            },
            AggregationNode::Range { field, ranges, .. } => json!({
                "range": {
                    "field": field,
                    "ranges": ranges.iter().map(RangeBucket::to_dsl).collect::<Vec<_>>()
                }
            }),
            AggregationNode::Min { field, .. } => json!({ "min": { "field": field } }),
            AggregationNode::Max { field, .. } => json!({ "max": { "field": field } }),
        };

        let children = self.children();
        if !children.is_empty() {
            if let Some(map) = body.as_object_mut() {
                map.insert("aggs".to_string(), Self::aggs_dsl(children));
            }
        }
        body
    }
}

/// Script joining the values of several fields into one `~~` key
pub fn composite_script(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| format!("doc['{}'].value", field))
        .collect::<Vec<_>>()
        .join(&format!(" + \"{}\" + ", COMPOSITE_KEY_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::nodes::TermQuery;

    #[test]
    fn test_terms_dsl() {
        let single = AggregationNode::terms("color", ["color"], 10);
        assert_eq!(
            single.to_dsl(),
            json!({ "color": { "terms": { "field": "color", "size": 10 } } })
        );

        let composite = AggregationNode::terms("model", ["brand", "model"], 5);
        assert_eq!(
            composite.to_dsl(),
            json!({
                "model": {
                    "terms": {
                        "script": "doc['brand'].value + \"~~\" + doc['model'].value",
                        "size": 5
                    }
                }
            })
        );
    }

    #[test]
    fn test_range_buckets_dsl() {
        let node = AggregationNode::range(
            "price",
            "real_price",
            vec![
                RangeBucket::new("..100", Range::decode("..100").unwrap()),
                RangeBucket::new("100..", Range::decode("100..").unwrap()),
            ],
        );
        assert_eq!(
            node.to_dsl(),
            json!({
                "price": {
                    "range": {
                        "field": "real_price",
                        "ranges": [
                            { "key": "..100", "to": 100 },
                            { "key": "100..", "from": 100 }
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_range_bucket_non_positive_lower_bound_is_open() {
        let bucket = RangeBucket::new("-10..0", Range::decode("-10..0").unwrap());
        assert_eq!(bucket.to_dsl(), json!({ "key": "-10..0", "to": 0 }));
        assert!(bucket.range.contains(-50.0));
        assert!(!bucket.range.contains(0.0));
    }

    #[test]
    fn test_scopes_nest_under_aggs() {
        let tree = AggregationNode::global(GLOBAL_SCOPE).with_child(
            AggregationNode::filter(TYPE_SCOPE, TermQuery::new("_type", "product"))
                .with_child(AggregationNode::min(MIN_PRICE, "real_price")),
        );

        assert_eq!(
            tree.to_dsl(),
            json!({
                "all": {
                    "global": {},
                    "aggs": {
                        "all_products": {
                            "filter": { "term": { "_type": "product" } },
                            "aggs": {
                                "min_price": { "min": { "field": "real_price" } }
                            }
                        }
                    }
                }
            })
        );
        assert_eq!(tree.children().len(), 1);
        assert!(tree.child(TYPE_SCOPE).is_some());
    }

    #[test]
    fn test_leaf_ignores_children() {
        let leaf = AggregationNode::max(MAX_PRICE, "real_price")
            .with_child(AggregationNode::min(MIN_PRICE, "real_price"));
        assert!(leaf.children().is_empty());
        assert_eq!(leaf.name(), MAX_PRICE);
    }
}
