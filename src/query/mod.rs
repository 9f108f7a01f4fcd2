//! Query compilation and result mapping
//!
//! This module turns an abstract [`Query`](crate::models::Query) into the
//! backend's JSON DSL and maps the backend's answer back to typed results:
//! - Boolean filter trees (term, nested, range and full-text clauses)
//! - Facet aggregation trees with multi-select self-exclusion
//! - Typed results with level-pruned facet counters
//!
//! # Example
//!
//! ```json
//! {
//!   "query": {
//!     "bool": {
//!       "must": [{ "match": { "_all": { "query": "phone", "operator": "or" } } }],
//!       "filter": [{ "bool": { "must": [{ "term": { "color": "red" } }] } }]
//!     }
//!   },
//!   "from": 0,
//!   "size": 10,
//!   "aggs": { "all": { "global": {}, "aggs": { "all_products": { ... } } } }
//! }
//! ```

pub mod aggregation;
pub mod aggregation_compiler;
pub mod ast;
pub mod compiled;
pub mod context;
pub mod filter_compiler;
pub mod mapper;
pub mod nodes;
pub mod types;

pub use aggregation::{AggregationNode, RangeBucket};
pub use aggregation_compiler::AggregationCompiler;
pub use ast::{MatchAllQuery, QueryNode};
pub use compiled::{CompiledQuery, QueryCompiler};
pub use context::{IndexedDocument, QueryContext};
pub use filter_compiler::FilterCompiler;
pub use mapper::ResultMapper;
pub use nodes::{BoolQuery, MatchQuery, NestedQuery, RangeQuery, TermQuery};
pub use types::*;
