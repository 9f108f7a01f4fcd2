use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::aggregation::COMPOSITE_KEY_SEPARATOR;
use super::entity::{Brand, Category, Entity, Manufacturer, Product, Tag};
use super::filter::ApplicationType;

/// One facet bucket
///
/// Composite keys are split on `~~`; the first part is the display value.
/// When there are at least two parts and the last one is an unsigned integer,
/// it is the bucket's hierarchical level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub key: String,
    pub values: Vec<String>,
    pub level: Option<u32>,
    pub count: u64,
    pub is_filter_value: bool,
}

impl Counter {
    pub fn new(key: impl Into<String>, count: u64, applied_filter_values: &[String]) -> Self {
        let key = key.into();
        let values: Vec<String> = key
            .split(COMPOSITE_KEY_SEPARATOR)
            .map(str::to_string)
            .collect();
        let level = match values.as_slice() {
            [_, .., last] => last.parse().ok(),
            _ => None,
        };
        let is_filter_value = applied_filter_values
            .iter()
            .any(|applied| *applied == key || *applied == values[0]);

        Self {
            key,
            values,
            level,
            count,
            is_filter_value,
        }
    }

    /// Display value (first composite part)
    pub fn value(&self) -> &str {
        &self.values[0]
    }
}

/// Facet result: counters for one requested aggregation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultAggregation {
    pub name: String,
    pub application_type: ApplicationType,
    pub total_doc_count: u64,
    pub applied_filter_values: Vec<String>,
    counters: Vec<Counter>,
}

impl ResultAggregation {
    pub fn new(
        name: impl Into<String>,
        application_type: ApplicationType,
        total_doc_count: u64,
        applied_filter_values: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            application_type,
            total_doc_count,
            applied_filter_values,
            counters: Vec::new(),
        }
    }

    /// Add a counter; a repeated key overwrites the previous count
    pub fn add_counter(&mut self, key: impl Into<String>, count: u64) {
        let counter = Counter::new(key, count, &self.applied_filter_values);
        match self.counters.iter_mut().find(|c| c.key == counter.key) {
            Some(existing) => *existing = counter,
            None => self.counters.push(counter),
        }
    }

    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    pub fn counter(&self, key: &str) -> Option<&Counter> {
        self.counters.iter().find(|c| c.key == key)
    }

    /// Whether the user has a selection on this facet
    pub fn is_filtered(&self) -> bool {
        !self.applied_filter_values.is_empty()
    }

    /// Sum of all counter counts
    pub fn total_counts(&self) -> u64 {
        self.counters.iter().map(|c| c.count).sum()
    }

    /// Drop the levels the user cannot reach yet
    ///
    /// With no selected level, only the shallowest level survives. Otherwise,
    /// with `L` the deepest selected level, selected counters at or above `L`
    /// survive along with every counter at level `L + 1`. Counters without a
    /// level are never dropped.
    pub fn clean_counters_by_level(&mut self) {
        let Some(shallowest) = self.counters.iter().filter_map(|c| c.level).min() else {
            return;
        };
        let deepest_selected = self
            .counters
            .iter()
            .filter(|c| c.is_filter_value)
            .filter_map(|c| c.level)
            .max();

        self.counters.retain(|counter| match (counter.level, deepest_selected) {
            (None, _) => true,
            (Some(level), None) => level == shallowest,
            (Some(level), Some(deepest)) => {
                (counter.is_filter_value && level <= deepest) || level == deepest + 1
            }
        });
    }
}

/// All facet results of a search, in request order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregations {
    pub total_elements: u64,
    aggregations: IndexMap<String, ResultAggregation>,
}

impl Aggregations {
    pub fn new(total_elements: u64) -> Self {
        Self {
            total_elements,
            aggregations: IndexMap::new(),
        }
    }

    pub fn add_aggregation(&mut self, aggregation: ResultAggregation) {
        self.aggregations
            .insert(aggregation.name.clone(), aggregation);
    }

    pub fn aggregation(&self, name: &str) -> Option<&ResultAggregation> {
        self.aggregations.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultAggregation> {
        self.aggregations.values()
    }

    pub fn len(&self) -> usize {
        self.aggregations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregations.is_empty()
    }
}

impl<'a> IntoIterator for &'a Aggregations {
    type Item = &'a ResultAggregation;
    type IntoIter = indexmap::map::Values<'a, String, ResultAggregation>;

    fn into_iter(self) -> Self::IntoIter {
        self.aggregations.values()
    }
}

/// Typed result of one search
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Documents in the global (filter-independent) scope
    pub total_elements: u64,
    /// Documents of the primary type
    pub total_items: u64,
    /// Documents matched by the query
    pub total_hits: u64,
    pub min_price: i64,
    pub max_price: i64,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub manufacturers: Vec<Manufacturer>,
    pub brands: Vec<Brand>,
    pub tags: Vec<Tag>,
    pub aggregations: Aggregations,
}

impl SearchResult {
    pub fn new(
        total_elements: u64,
        total_items: u64,
        total_hits: u64,
        min_price: i64,
        max_price: i64,
    ) -> Self {
        Self {
            total_elements,
            total_items,
            total_hits,
            min_price,
            max_price,
            ..Default::default()
        }
    }

    /// File an entity under its kind's collection
    pub fn add_entity(&mut self, entity: Entity) {
        match entity {
            Entity::Product(p) => self.products.push(p),
            Entity::Category(c) => self.categories.push(c),
            Entity::Manufacturer(m) => self.manufacturers.push(m),
            Entity::Brand(b) => self.brands.push(b),
            Entity::Tag(t) => self.tags.push(t),
        }
    }

    /// Number of entities across all kinds
    pub fn entity_count(&self) -> usize {
        self.products.len()
            + self.categories.len()
            + self.manufacturers.len()
            + self.brands.len()
            + self.tags.len()
    }
}
