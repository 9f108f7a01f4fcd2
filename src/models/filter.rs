use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Name of the free-text filter created by [`Query::create`](super::Query::create)
pub const FREE_TEXT_FILTER: &str = "_query";

/// How the values of a filter (or the buckets of a facet) combine
///
/// This is a flag set persisted as an integer. The bit assignment is a wire
/// contract and must not change.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ApplicationType(u8);

impl ApplicationType {
    /// Every value must match (AND)
    pub const MUST_ALL: Self = Self(1);
    /// At least one value must match (OR); facets self-exclude
    pub const AT_LEAST_ONE: Self = Self(2);
    /// Bucket keys carry hierarchical levels and are pruned
    pub const MUST_ALL_WITH_LEVELS: Self = Self(4);

    const ALL_BITS: u8 = 1 | 2 | 4;

    /// Raw integer representation
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, rejecting unknown flags
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL_BITS == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// True when every flag of `other` is set in `self`
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub const fn is_must_all(self) -> bool {
        self.contains(Self::MUST_ALL)
    }

    pub const fn is_at_least_one(self) -> bool {
        self.contains(Self::AT_LEAST_ONE)
    }

    pub const fn has_levels(self) -> bool {
        self.contains(Self::MUST_ALL_WITH_LEVELS)
    }
}

impl BitOr for ApplicationType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ApplicationType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ApplicationType {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl TryFrom<u8> for ApplicationType {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or_else(|| format!("unknown application type bits: {}", bits))
    }
}

impl From<ApplicationType> for u8 {
    fn from(value: ApplicationType) -> Self {
        value.0
    }
}

impl fmt::Debug for ApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::MUST_ALL, "MUST_ALL"),
            (Self::AT_LEAST_ONE, "AT_LEAST_ONE"),
            (Self::MUST_ALL_WITH_LEVELS, "MUST_ALL_WITH_LEVELS"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();

        write!(f, "ApplicationType({})", names.join(" | "))
    }
}

/// How a filter's values are turned into backend clauses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Term match on a plain field
    #[default]
    Field,
    /// Term match on an attribute of a nested relation (`relation.attribute`)
    Nested,
    /// Numeric `"from..to"` ranges
    Range,
    /// Full-text match across all attributes
    #[serde(rename = "query")]
    FreeText,
}

/// Term forced into other facets' contexts while this filter is suppressed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTerm {
    pub field: String,
    pub value: String,
}

/// Named filter applied to a query
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub field: String,
    /// Selected values; empty means defined but inactive
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub filter_type: FilterType,
    pub application_type: ApplicationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_terms: Option<FilterTerm>,
}

impl Filter {
    /// Create a filter
    pub fn new<I, V>(
        name: impl Into<String>,
        field: impl Into<String>,
        values: I,
        application_type: ApplicationType,
        filter_type: FilterType,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            filter_type,
            application_type,
            filter_terms: None,
        }
    }

    /// Create the free-text filter for a query string
    pub fn free_text(text: impl Into<String>) -> Self {
        Self::new(
            FREE_TEXT_FILTER,
            "",
            [text.into()],
            ApplicationType::MUST_ALL,
            FilterType::FreeText,
        )
    }

    /// Pin a `(field, value)` term into other facets' contexts
    pub fn with_filter_terms(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter_terms = Some(FilterTerm {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// A filter with no values is defined but contributes no clause
    pub fn is_active(&self) -> bool {
        !self.values.is_empty()
    }

    /// Nested relation this filter's field lives in
    pub fn nested_path(&self) -> &str {
        nested_path(&self.field)
    }
}

/// Relation name of a dotted field path: everything before the first dot
pub fn nested_path(field: &str) -> &str {
    field.split_once('.').map_or(field, |(path, _)| path)
}
