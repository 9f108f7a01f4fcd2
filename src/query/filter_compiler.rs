//! Filter compilation
//!
//! Turns the named filters of a query into one boolean tree. Every filter
//! contributes at most one clause to the top-level `filter` list; the
//! free-text filter contributes a `must` clause instead.
//!
//! # Example
//!
//! A `color` filter with values `red` and `blue` in at-least-one mode and a
//! price range compile to:
//!
//! ```json
//! {
//!   "bool": {
//!     "filter": [
//!       {
//!         "bool": {
//!           "should": [{ "term": { "color": "red" } }, { "term": { "color": "blue" } }],
//!           "minimum_should_match": 1
//!         }
//!       },
//!       { "bool": { "must": [{ "range": { "real_price": { "lt": 100 } } }] } }
//!     ]
//!   }
//! }
//! ```

use crate::config::CompilerSettings;
use crate::models::{ApplicationType, Filter, FilterType, Range};
use crate::query::ast::{MatchAllQuery, QueryNode};
use crate::query::nodes::{BoolQuery, MatchQuery, NestedQuery, RangeQuery, TermQuery};
use crate::Result;

/// Compiles named filters into a backend boolean query
pub struct FilterCompiler<'a> {
    settings: &'a CompilerSettings,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(settings: &'a CompilerSettings) -> Self {
        Self { settings }
    }

    /// Compile `filters` in iteration order
    ///
    /// The filter named `filter_to_ignore` keeps its forced term (when
    /// `include_forced_terms` is set) but loses its own values, as does every
    /// filter without values.
    pub fn compile<'f, I>(
        &self,
        filters: I,
        filter_to_ignore: Option<&str>,
        include_forced_terms: bool,
    ) -> Result<BoolQuery>
    where
        I: IntoIterator<Item = &'f Filter>,
    {
        let mut root = BoolQuery::new();

        for filter in filters {
            let suppressed =
                !filter.is_active() || filter_to_ignore == Some(filter.name.as_str());

            if filter.filter_type == FilterType::FreeText {
                if let Some(clause) = self.free_text_clause(filter, suppressed) {
                    root = root.must_boxed(clause);
                }
                continue;
            }

            let clause = self.filter_clause(filter, suppressed, include_forced_terms)?;
            if !clause.is_empty() {
                root = root.filter(clause);
            }
        }

        Ok(root)
    }

    fn free_text_clause(&self, filter: &Filter, suppressed: bool) -> Option<Box<dyn QueryNode>> {
        let text = filter.values.first()?;
        if suppressed || text.trim().is_empty() {
            return Some(Box::new(MatchAllQuery));
        }
        Some(Box::new(MatchQuery::new(
            self.settings.free_text_field.as_str(),
            text.as_str(),
        )))
    }

    fn filter_clause(
        &self,
        filter: &Filter,
        suppressed: bool,
        include_forced_terms: bool,
    ) -> Result<BoolQuery> {
        let must_all = filter.application_type.is_must_all();
        let mut clause = BoolQuery::new();

        if !suppressed {
            for value in &filter.values {
                if let Some(node) = value_clause(filter, value)? {
                    clause = if must_all {
                        clause.must_boxed(node)
                    } else {
                        clause.should_boxed(node)
                    };
                }
            }
        }

        if include_forced_terms {
            if let Some(term) = &filter.filter_terms {
                let forced = Filter::new(
                    term.field.as_str(),
                    term.field.as_str(),
                    [term.value.as_str()],
                    ApplicationType::AT_LEAST_ONE,
                    filter.filter_type,
                );
                let forced_clause = self.filter_clause(&forced, false, false)?;
                if !forced_clause.is_empty() {
                    clause = clause.filter(forced_clause);
                }
            }
        }

        if !clause.should.is_empty() {
            clause = clause.with_minimum_should_match(1);
        }
        Ok(clause)
    }
}

/// Clause for one selected value; `None` when the value restricts nothing
fn value_clause(filter: &Filter, value: &str) -> Result<Option<Box<dyn QueryNode>>> {
    let node: Box<dyn QueryNode> = match filter.filter_type {
        FilterType::Field => Box::new(TermQuery::new(filter.field.as_str(), value)),
        FilterType::Nested => Box::new(NestedQuery::new(
            filter.nested_path(),
            TermQuery::new(filter.field.as_str(), value),
        )),
        FilterType::Range => {
            let range = Range::decode(value)?;
            match RangeQuery::from_range(filter.field.as_str(), &range) {
                Some(query) => Box::new(query),
                None => return Ok(None),
            }
        }
        FilterType::FreeText => return Ok(None),
    };
    Ok(Some(node))
}
