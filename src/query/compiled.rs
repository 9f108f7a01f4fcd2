//! Full query compilation: main query, sort, pagination and facets

use serde_json::{json, Map, Value};

use crate::config::CompilerSettings;
use crate::models::{Query, SortBy};
use crate::query::aggregation::AggregationNode;
use crate::query::aggregation_compiler::AggregationCompiler;
use crate::query::ast::QueryNode;
use crate::query::filter_compiler::FilterCompiler;
use crate::query::nodes::BoolQuery;
use crate::Result;

/// Backend request built from one abstract query
#[derive(Clone, Debug)]
pub struct CompiledQuery {
    /// Main query: every filter applies, no forced terms
    pub query: BoolQuery,
    pub sort: SortBy,
    pub aggregations: AggregationNode,
    pub from: usize,
    pub size: usize,
}

impl CompiledQuery {
    /// Render the whole request body
    ///
    /// ```json
    /// {
    ///   "query": { "bool": { ... } },
    ///   "sort": [{ "real_price": { "order": "asc" } }],
    ///   "from": 0,
    ///   "size": 10,
    ///   "aggs": { "all": { ... } }
    /// }
    /// ```
    pub fn to_dsl(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.to_dsl());
        if let SortBy::Field { field, order } = &self.sort {
            body.insert(
                "sort".to_string(),
                json!([{ field.as_str(): { "order": order.as_str() } }]),
            );
        }
        body.insert("from".to_string(), json!(self.from));
        body.insert("size".to_string(), json!(self.size));
        body.insert(
            "aggs".to_string(),
            AggregationNode::aggs_dsl(std::slice::from_ref(&self.aggregations)),
        );
        Value::Object(body)
    }
}

/// Compiles abstract queries for one backend configuration
#[derive(Clone, Debug, Default)]
pub struct QueryCompiler {
    settings: CompilerSettings,
}

impl QueryCompiler {
    pub fn new(settings: CompilerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    pub fn compile(&self, query: &Query) -> Result<CompiledQuery> {
        let main_query = FilterCompiler::new(&self.settings).compile(query.filters(), None, false)?;
        let aggregations = AggregationCompiler::new(&self.settings).compile(query)?;

        Ok(CompiledQuery {
            query: main_query,
            sort: query.sort().clone(),
            aggregations,
            from: query.from(),
            size: query.size(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicationType, Filter, FilterType};

    #[test]
    fn test_compile_match_all() {
        let compiled = QueryCompiler::default().compile(&Query::match_all()).unwrap();
        let dsl = compiled.to_dsl();

        assert_eq!(dsl["query"], json!({ "bool": {} }));
        assert!(dsl.get("sort").is_none());
        assert_eq!(dsl["from"], 0);
        assert_eq!(dsl["size"], 10);
        assert!(dsl["aggs"]["all"]["aggs"]["all_products"].is_object());
    }

    #[test]
    fn test_main_query_ignores_forced_terms() {
        let query = Query::create("phone")
            .filter_by(
                Filter::new("tags", "tags", ["new"], ApplicationType::AT_LEAST_ONE, FilterType::Field)
                    .with_filter_terms("tag_group", "season"),
            )
            .sort_by(SortBy::desc("real_price"))
            .page(3, 20);
        let dsl = QueryCompiler::default().compile(&query).unwrap().to_dsl();

        assert_eq!(
            dsl["query"],
            json!({
                "bool": {
                    "must": [{ "match": { "_all": { "query": "phone", "operator": "or" } } }],
                    "filter": [{
                        "bool": {
                            "should": [{ "term": { "tags": "new" } }],
                            "minimum_should_match": 1
                        }
                    }]
                }
            })
        );
        assert_eq!(dsl["sort"], json!([{ "real_price": { "order": "desc" } }]));
        assert_eq!(dsl["from"], 40);
        assert_eq!(dsl["size"], 20);
    }

    #[test]
    fn test_compiler_uses_settings() {
        let settings = CompilerSettings::default()
            .with_primary_type("item")
            .with_ranking_field("price");
        let dsl = QueryCompiler::new(settings)
            .compile(&Query::match_all())
            .unwrap()
            .to_dsl();
        let type_scope = &dsl["aggs"]["all"]["aggs"]["all_products"];

        assert_eq!(type_scope["filter"], json!({ "term": { "_type": "item" } }));
        assert_eq!(
            type_scope["aggs"]["common"]["aggs"]["min_price"],
            json!({ "min": { "field": "price" } })
        );
    }
}
