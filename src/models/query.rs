use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::aggregation::Aggregation;
use super::filter::{Filter, FREE_TEXT_FILTER};

/// Default page size
pub const DEFAULT_SIZE: usize = 10;

/// Sort direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort specification
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Backend relevance order; no sort clause is emitted
    #[default]
    Score,
    /// Sort on a field value
    Field { field: String, order: SortOrder },
}

impl SortBy {
    pub fn asc(field: impl Into<String>) -> Self {
        SortBy::Field {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortBy::Field {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Abstract, backend-agnostic search query
///
/// Filters and aggregations are keyed by name and keep insertion order.
/// Adding one under an existing name replaces it in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, with = "named_seq")]
    filters: IndexMap<String, Filter>,
    #[serde(default, with = "named_seq")]
    aggregations: IndexMap<String, Aggregation>,
    #[serde(default)]
    sort: SortBy,
    #[serde(default)]
    from: usize,
    #[serde(default = "default_size")]
    size: usize,
}

fn default_size() -> usize {
    DEFAULT_SIZE
}

impl Default for Query {
    fn default() -> Self {
        Self::match_all()
    }
}

impl Query {
    /// Query with no filters at all
    pub fn match_all() -> Self {
        Self {
            filters: IndexMap::new(),
            aggregations: IndexMap::new(),
            sort: SortBy::Score,
            from: 0,
            size: DEFAULT_SIZE,
        }
    }

    /// Query carrying a free-text filter for `text`
    pub fn create(text: impl Into<String>) -> Self {
        Self::match_all().filter_by(Filter::free_text(text))
    }

    /// Add (or replace) a filter
    pub fn filter_by(mut self, filter: Filter) -> Self {
        self.filters.insert(filter.name.clone(), filter);
        self
    }

    /// Add (or replace) a facet
    pub fn aggregate_by(mut self, aggregation: Aggregation) -> Self {
        self.aggregations
            .insert(aggregation.name.clone(), aggregation);
        self
    }

    /// Set the sort specification
    pub fn sort_by(mut self, sort: SortBy) -> Self {
        self.sort = sort;
        self
    }

    /// Set the result window
    pub fn paginate(mut self, from: usize, size: usize) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    /// Set the result window from a 1-based page number
    pub fn page(self, page: usize, size: usize) -> Self {
        self.paginate(page.saturating_sub(1).saturating_mul(size), size)
    }

    pub fn filters(&self) -> impl Iterator<Item = &Filter> {
        self.filters.values()
    }

    pub fn filter(&self, name: &str) -> Option<&Filter> {
        self.filters.get(name)
    }

    /// The free-text filter, if the query has one
    pub fn query_text(&self) -> Option<&str> {
        self.filter(FREE_TEXT_FILTER)
            .and_then(|filter| filter.values.first())
            .map(String::as_str)
    }

    pub fn aggregations(&self) -> impl Iterator<Item = &Aggregation> {
        self.aggregations.values()
    }

    pub fn aggregation(&self, name: &str) -> Option<&Aggregation> {
        self.aggregations.get(name)
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn aggregation_count(&self) -> usize {
        self.aggregations.len()
    }

    pub fn sort(&self) -> &SortBy {
        &self.sort
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Anything stored in a name-keyed map
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Filter {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Aggregation {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Serialize a name-keyed map as a plain sequence of its values
mod named_seq {
    use super::Named;
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(map: &IndexMap<String, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Named,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(items
            .into_iter()
            .map(|item| (item.name().to_string(), item))
            .collect())
    }
}
