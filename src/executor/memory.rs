//! In-memory reference backend
//!
//! Evaluates compiled query and aggregation trees against a document set held
//! in memory and answers in the same nested shape a search cluster would.

use std::borrow::Cow;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::executor::{RawResponse, SearchExecutor};
use crate::models::{SortBy, SortOrder};
use crate::query::aggregation::{AggregationNode, RangeBucket};
use crate::query::ast::QueryNode;
use crate::query::context::{nested_views, number_of, resolve_field, term_of, IndexedDocument, QueryContext};
use crate::query::types::RangeValue;
use crate::query::CompiledQuery;
use crate::Result;

/// Executor over an in-memory document set
///
/// Searches share a read lock; indexing takes the write lock.
#[derive(Debug, Default)]
pub struct InMemoryExecutor {
    documents: RwLock<Vec<IndexedDocument>>,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<IndexedDocument>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Load a JSON array of `{ "id", "type", "source" }` documents
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let documents: Vec<IndexedDocument> = serde_json::from_str(&raw)?;
        Ok(Self::with_documents(documents))
    }

    /// Add a document; an existing document with the same id and type is replaced
    pub fn index(&self, document: IndexedDocument) {
        let mut documents = self.documents.write();
        match documents
            .iter_mut()
            .find(|d| d.id == document.id && d.doc_type == document.doc_type)
        {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn search(&self, query: &CompiledQuery, from: usize, size: usize) -> Result<RawResponse> {
        let documents = self.documents.read();
        let ctx = QueryContext::new(&documents);

        let matches = query.query.execute(&ctx);
        let total_hits = matches.len();

        let mut hits: Vec<u32> = matches.iter().collect();
        if let SortBy::Field { field, order } = &query.sort {
            sort_hits(&mut hits, &ctx, field, *order);
        }

        let results = hits
            .into_iter()
            .skip(from)
            .take(size)
            .filter_map(|docno| ctx.document(docno))
            .map(|document| {
                json!({
                    "id": document.id,
                    "type": document.doc_type,
                    "source": document.source
                })
            })
            .collect::<Vec<_>>();

        let all: Vec<Cow<'_, Value>> = ctx.all_fields().iter().map(Cow::Borrowed).collect();
        let mut aggregations = Map::new();
        aggregations.insert(
            query.aggregations.name().to_string(),
            evaluate(&query.aggregations, &all),
        );

        debug!(
            total_docs = ctx.total_docs(),
            total_hits,
            returned = results.len(),
            "In-memory search executed"
        );

        Ok(RawResponse::new(json!({
            "results": results,
            "total_hits": total_hits,
            "aggregations": aggregations
        })))
    }
}

#[async_trait]
impl SearchExecutor for InMemoryExecutor {
    async fn execute(&self, query: &CompiledQuery, from: usize, size: usize) -> Result<RawResponse> {
        self.search(query, from, size)
    }
}

/// Documents missing the sort field go last in both directions
fn sort_hits(hits: &mut [u32], ctx: &QueryContext, field: &str, order: SortOrder) {
    let sort_key = |docno: &u32| -> Option<OrderedFloat<f64>> {
        ctx.fields(*docno)
            .and_then(|fields| resolve_field(fields, field).into_iter().find_map(number_of))
            .map(OrderedFloat)
    };

    hits.sort_by(|a, b| match (sort_key(a), sort_key(b)) {
        (Some(x), Some(y)) => match order {
            SortOrder::Asc => x.cmp(&y),
            SortOrder::Desc => y.cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Response body of one aggregation node over `documents`
fn evaluate(node: &AggregationNode, documents: &[Cow<'_, Value>]) -> Value {
    match node {
        AggregationNode::Global { children, .. } => scope(documents, children),
        AggregationNode::Filter { filter, children, .. } => {
            let narrowed: Vec<Cow<'_, Value>> = documents
                .iter()
                .filter(|document| filter.matches(document))
                .map(|document| Cow::Borrowed(&**document))
                .collect();
            scope(&narrowed, children)
        }
        AggregationNode::Nested { path, children, .. } => {
            let views: Vec<Cow<'_, Value>> = documents
                .iter()
                .flat_map(|document| nested_views(document, path))
                .map(Cow::Owned)
                .collect();
            scope(&views, children)
        }
        AggregationNode::Terms { fields, size, .. } => {
            json!({ "buckets": terms_buckets(documents, fields, *size) })
        }
        AggregationNode::Range { field, ranges, .. } => {
            json!({ "buckets": range_buckets(documents, field, ranges) })
        }
        AggregationNode::Min { field, .. } => {
            json!({ "value": field_values(documents, field).into_iter().min().map(|v| v.into_inner()) })
        }
        AggregationNode::Max { field, .. } => {
            json!({ "value": field_values(documents, field).into_iter().max().map(|v| v.into_inner()) })
        }
    }
}

fn scope(documents: &[Cow<'_, Value>], children: &[AggregationNode]) -> Value {
    let mut body = Map::new();
    body.insert("doc_count".to_string(), json!(documents.len()));
    for child in children {
        body.insert(child.name().to_string(), evaluate(child, documents));
    }
    Value::Object(body)
}

fn field_values(documents: &[Cow<'_, Value>], field: &str) -> Vec<OrderedFloat<f64>> {
    documents
        .iter()
        .flat_map(|document| resolve_field(document, field))
        .filter_map(number_of)
        .map(OrderedFloat)
        .collect()
}

/// Distinct keys of one document
///
/// A single field yields every value; several fields join their first values
/// with `~~` and yield nothing when one of them is missing.
fn document_keys(document: &Value, fields: &[String]) -> BTreeSet<String> {
    match fields {
        [field] => resolve_field(document, field)
            .into_iter()
            .filter_map(term_of)
            .collect(),
        _ => fields
            .iter()
            .map(|field| resolve_field(document, field).into_iter().find_map(term_of))
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(crate::models::COMPOSITE_KEY_SEPARATOR))
            .into_iter()
            .collect(),
    }
}

/// Buckets by descending count, ties by key
fn terms_buckets(documents: &[Cow<'_, Value>], fields: &[String], size: usize) -> Vec<Value> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for document in documents {
        for key in document_keys(document, fields) {
            *counts.entry(key).or_default() += 1;
        }
    }

    let mut buckets: Vec<(String, u64)> = counts.into_iter().collect();
    buckets.sort_by(|(ka, ca), (kb, cb)| Reverse(*ca).cmp(&Reverse(*cb)).then_with(|| ka.cmp(kb)));
    buckets.truncate(size);

    buckets
        .into_iter()
        .map(|(key, doc_count)| json!({ "key": key, "doc_count": doc_count }))
        .collect()
}

fn range_buckets(documents: &[Cow<'_, Value>], field: &str, ranges: &[RangeBucket]) -> Vec<Value> {
    ranges
        .iter()
        .map(|bucket| {
            let doc_count = documents
                .iter()
                .filter(|document| {
                    resolve_field(document, field)
                        .into_iter()
                        .filter_map(number_of)
                        .any(|value| bucket.range.contains(value))
                })
                .count();

            let mut body = Map::new();
            body.insert("key".to_string(), json!(bucket.key));
            if let Some(from) = bucket.range.lower() {
                body.insert("from".to_string(), json!(RangeValue::from_f64(from)));
            }
            if let Some(to) = bucket.range.upper() {
                body.insert("to".to_string(), json!(RangeValue::from_f64(to)));
            }
            body.insert("doc_count".to_string(), json!(doc_count));
            Value::Object(body)
        })
        .collect()
}
