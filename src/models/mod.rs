pub mod aggregation;
pub mod entity;
pub mod filter;
pub mod query;
pub mod range;
pub mod result;

pub use aggregation::{Aggregation, COMPOSITE_FIELD_SEPARATOR, COMPOSITE_KEY_SEPARATOR};
pub use entity::{Brand, Category, Entity, EntityKind, Manufacturer, Product, Tag};
pub use filter::{nested_path, ApplicationType, Filter, FilterTerm, FilterType, FREE_TEXT_FILTER};
pub use query::{Query, SortBy, SortOrder, DEFAULT_SIZE};
pub use range::{Range, RANGE_SEPARATOR};
pub use result::{Aggregations, Counter, ResultAggregation, SearchResult};
