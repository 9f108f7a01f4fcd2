//! Concrete query node implementations
//!
//! This module provides implementations of the `QueryNode` trait for the
//! clause types the compiler emits.

mod bool_query;
mod match_query;
mod nested_query;
mod range_query;
mod term_query;

pub use bool_query::BoolQuery;
pub use match_query::{MatchQuery, ALL_FIELDS};
pub use nested_query::NestedQuery;
pub use range_query::RangeQuery;
pub use term_query::TermQuery;
