//! Raw backend response to typed search result

use serde_json::Value;
use tracing::warn;

use crate::error::FacetError;
use crate::executor::RawResponse;
use crate::models::{Aggregation, Aggregations, Entity, EntityKind, Query, ResultAggregation, SearchResult};
use crate::query::aggregation::{COMMON_SCOPE, GLOBAL_SCOPE, MAX_PRICE, MIN_PRICE, TYPE_SCOPE};
use crate::query::context::term_of;
use crate::Result;

/// Maps raw responses back to typed results
///
/// Pure: the same query and response always give the same result.
pub struct ResultMapper;

impl ResultMapper {
    pub fn map(query: &Query, raw: &RawResponse) -> Result<SearchResult> {
        let global = raw
            .get("aggregations")
            .and_then(|aggregations| aggregations.get(GLOBAL_SCOPE))
            .ok_or_else(|| missing("aggregations.all"))?;
        let type_scope = global
            .get(TYPE_SCOPE)
            .ok_or_else(|| missing("aggregations.all.all_products"))?;
        let common = type_scope
            .get(COMMON_SCOPE)
            .ok_or_else(|| missing("aggregations.all.all_products.common"))?;

        let total_items = doc_count(type_scope);
        let mut result = SearchResult::new(
            doc_count(global),
            total_items,
            total_hits(raw.as_value()),
            metric(common, MIN_PRICE),
            metric(common, MAX_PRICE),
        );

        let hits = raw.get("results").and_then(Value::as_array);
        for hit in hits.into_iter().flatten() {
            if let Some(entity) = map_hit(hit) {
                result.add_entity(entity);
            }
        }

        let mut aggregations = Aggregations::new(total_items);
        for aggregation in query.aggregations() {
            if let Some(branch) = type_scope.get(&aggregation.name) {
                aggregations.add_aggregation(map_aggregation(query, aggregation, branch));
            }
        }
        result.aggregations = aggregations;

        Ok(result)
    }
}

fn missing(path: &str) -> FacetError {
    FacetError::MalformedResponse(path.to_string())
}

fn doc_count(scope: &Value) -> u64 {
    scope.get("doc_count").and_then(Value::as_u64).unwrap_or(0)
}

/// `total_hits` as a bare number or a `{ "value": n }` object
fn total_hits(root: &Value) -> u64 {
    match root.get("total_hits") {
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        Some(total) => total.as_u64().unwrap_or(0),
        None => 0,
    }
}

/// Single-value metric, truncated; null (no documents) reads as 0
fn metric(common: &Value, name: &str) -> i64 {
    common
        .get(name)
        .and_then(|metric| metric.get("value"))
        .and_then(Value::as_f64)
        .map(|value| value as i64)
        .unwrap_or(0)
}

fn map_hit(hit: &Value) -> Option<Entity> {
    let id = hit.get("id").and_then(term_of)?;
    let tag = hit.get("type").and_then(Value::as_str).unwrap_or_default();

    let Some(kind) = EntityKind::from_tag(tag) else {
        warn!(id = %id, tag = %tag, "Skipping hit with unknown type");
        return None;
    };

    let mut source = hit
        .get("source")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    source.insert("id".to_string(), Value::String(id.clone()));

    match Entity::from_source(kind, source) {
        Ok(entity) => Some(entity),
        Err(e) => {
            warn!(id = %id, tag = %tag, error = %e, "Skipping undecodable hit");
            None
        }
    }
}

fn map_aggregation(query: &Query, aggregation: &Aggregation, branch: &Value) -> ResultAggregation {
    let applied_values = query
        .filter(&aggregation.name)
        .map(|filter| filter.values.clone())
        .unwrap_or_default();

    let mut result = ResultAggregation::new(
        aggregation.name.as_str(),
        aggregation.application_type,
        doc_count(branch),
        applied_values,
    );

    for bucket in buckets(branch, &aggregation.name) {
        let Some(key) = bucket.get("key").and_then(term_of) else {
            continue;
        };
        if aggregation.keeps_bucket(&key) {
            result.add_counter(key, doc_count(bucket));
        }
    }

    if aggregation.application_type.has_levels() {
        result.clean_counters_by_level();
    }
    result
}

/// Buckets at `<name>.buckets`, or one level deeper for nested facets
fn buckets<'v>(branch: &'v Value, name: &str) -> &'v [Value] {
    let Some(inner) = branch.get(name) else {
        return &[];
    };
    inner
        .get("buckets")
        .or_else(|| inner.get(name).and_then(|nested| nested.get("buckets")))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
