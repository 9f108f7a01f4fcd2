//! Aggregation compilation
//!
//! Every requested facet is computed inside its own filter scope. The scope
//! applies all active filters of the query, except that an at-least-one facet
//! ignores the filter carrying its own name: the user sees how many documents
//! each alternative value would add to the current selection.
//!
//! The resulting tree has the shape
//!
//! ```text
//! all (global)
//! └── all_products (filter: type == primary type)
//!     ├── <facet> (filter: all filters, minus own for at-least-one)
//!     │   └── <facet> (terms | range | nested > terms)
//!     └── common (filter: all filters)
//!         ├── min_price
//!         └── max_price
//! ```

use crate::config::CompilerSettings;
use crate::error::FacetError;
use crate::models::{Aggregation, FilterType, Query, Range};
use crate::query::aggregation::{
    AggregationNode, RangeBucket, COMMON_SCOPE, GLOBAL_SCOPE, MAX_PRICE, MIN_PRICE, TYPE_SCOPE,
};
use crate::query::filter_compiler::FilterCompiler;
use crate::query::nodes::TermQuery;
use crate::Result;

/// Compiles the facets of a query into a backend aggregation tree
pub struct AggregationCompiler<'a> {
    settings: &'a CompilerSettings,
}

impl<'a> AggregationCompiler<'a> {
    pub fn new(settings: &'a CompilerSettings) -> Self {
        Self { settings }
    }

    pub fn compile(&self, query: &Query) -> Result<AggregationNode> {
        let filters = FilterCompiler::new(self.settings);
        let mut type_scope = AggregationNode::filter(
            TYPE_SCOPE,
            TermQuery::new(
                self.settings.type_field.as_str(),
                self.settings.primary_type.as_str(),
            ),
        );

        for aggregation in query.aggregations() {
            if aggregation.name == COMMON_SCOPE {
                return Err(FacetError::InvalidRequest(format!(
                    "aggregation name '{}' is reserved",
                    COMMON_SCOPE
                )));
            }

            // Level pruning relies on the own selection narrowing the buckets
            let application_type = aggregation.application_type;
            let own_filter = (application_type.is_at_least_one()
                && !application_type.has_levels())
            .then_some(aggregation.name.as_str());
            let scope_filter = filters.compile(query.filters(), own_filter, true)?;

            type_scope = type_scope.with_child(
                AggregationNode::filter(aggregation.name.as_str(), scope_filter)
                    .with_child(self.bucket_node(aggregation)?),
            );
        }

        let common_filter = filters.compile(query.filters(), None, false)?;
        let ranking_field = self.settings.ranking_field.as_str();
        type_scope = type_scope.with_child(
            AggregationNode::filter(COMMON_SCOPE, common_filter)
                .with_child(AggregationNode::min(MIN_PRICE, ranking_field))
                .with_child(AggregationNode::max(MAX_PRICE, ranking_field)),
        );

        Ok(AggregationNode::global(GLOBAL_SCOPE).with_child(type_scope))
    }

    fn bucket_node(&self, aggregation: &Aggregation) -> Result<AggregationNode> {
        let name = aggregation.name.as_str();
        let node = match aggregation.filter_type {
            FilterType::Range => {
                let ranges = aggregation
                    .subgroup
                    .iter()
                    .map(|token| {
                        Range::decode(token).map(|range| RangeBucket::new(token.as_str(), range))
                    })
                    .collect::<Result<Vec<_>>>()?;
                AggregationNode::range(name, aggregation.field.as_str(), ranges)
            }
            FilterType::Nested => AggregationNode::nested(name, aggregation.nested_path())
                .with_child(self.terms_node(aggregation)),
            // Free text has no bucket strategy of its own
            FilterType::Field | FilterType::FreeText => self.terms_node(aggregation),
        };
        Ok(node)
    }

    fn terms_node(&self, aggregation: &Aggregation) -> AggregationNode {
        AggregationNode::terms(
            aggregation.name.as_str(),
            aggregation.composite_fields(),
            self.settings.facet_size,
        )
    }
}
