use serde::{Deserialize, Serialize};

use super::filter::{nested_path, ApplicationType, FilterType};

/// Separator between sub-fields of a composite facet field expression
pub const COMPOSITE_FIELD_SEPARATOR: char = '|';

/// Separator between sub-field values in a composite bucket key
pub const COMPOSITE_KEY_SEPARATOR: &str = "~~";

/// Facet requested on a query
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub name: String,
    /// Field expression; `a|b` buckets on the compound `<a>~~<b>` key
    pub field: String,
    #[serde(default)]
    pub filter_type: FilterType,
    pub application_type: ApplicationType,
    /// Bucket keys to keep (in order); range tokens for range facets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subgroup: Vec<String>,
}

impl Aggregation {
    /// Create a facet request
    pub fn new(
        name: impl Into<String>,
        field: impl Into<String>,
        application_type: ApplicationType,
        filter_type: FilterType,
    ) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            filter_type,
            application_type,
            subgroup: Vec::new(),
        }
    }

    /// Restrict (and order) the bucket keys this facet reports
    pub fn with_subgroup<I, V>(mut self, subgroup: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.subgroup = subgroup.into_iter().map(Into::into).collect();
        self
    }

    /// Sub-fields of the field expression
    pub fn composite_fields(&self) -> Vec<&str> {
        self.field.split(COMPOSITE_FIELD_SEPARATOR).collect()
    }

    /// Nested relation of the field expression
    pub fn nested_path(&self) -> &str {
        nested_path(&self.field)
    }

    /// Whether a bucket key passes the subgroup restriction
    pub fn keeps_bucket(&self, key: &str) -> bool {
        self.subgroup.is_empty() || self.subgroup.iter().any(|kept| kept == key)
    }
}
