//! Textual range tokens (`"from..to"`) and their numeric bounds
//!
//! The same [`Range`] drives both the range filter clauses and the range
//! aggregation buckets, so a bucket key and the filter token that selects it
//! are always the same string.

use std::fmt;
use std::str::FromStr;

use crate::error::FacetError;
use crate::Result;

/// Separator between the lower and upper bound of a range token
pub const RANGE_SEPARATOR: &str = "..";

/// Numeric range decoded from a `"from..to"` token
///
/// `from == Range::ZERO` means unbounded low, `to == None` means unbounded high.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub from: f64,
    pub to: Option<f64>,
}

impl Range {
    /// Lower-bound sentinel: anything at or below it is treated as unbounded
    pub const ZERO: f64 = 0.0;

    pub fn new(from: f64, to: Option<f64>) -> Self {
        Self { from, to }
    }

    /// Range with neither bound set
    pub fn unbounded() -> Self {
        Self::new(Self::ZERO, None)
    }

    /// Decode a `"from..to"` token
    ///
    /// An empty lower bound is the zero sentinel; an empty (or `*`) upper
    /// bound is the infinite sentinel.
    pub fn decode(token: &str) -> Result<Self> {
        let (from, to) = token
            .split_once(RANGE_SEPARATOR)
            .ok_or_else(|| FacetError::malformed_range(token, "missing '..' separator"))?;

        let from = parse_bound(token, from, "lower")?.unwrap_or(Self::ZERO);
        let to = parse_bound(token, to, "upper")?;

        Ok(Self { from, to })
    }

    /// Render the token this range decodes from
    pub fn encode(&self) -> String {
        match self.to {
            Some(to) => format!("{}{}{}", self.from, RANGE_SEPARATOR, to),
            None => format!("{}{}", self.from, RANGE_SEPARATOR),
        }
    }

    /// Inclusive lower bound, if the range has one
    ///
    /// Any `from <= 0` is the zero sentinel, so `"-10..0"` has no lower bound.
    pub fn lower(&self) -> Option<f64> {
        (self.from > Self::ZERO).then_some(self.from)
    }

    /// Exclusive upper bound, if the range has one
    pub fn upper(&self) -> Option<f64> {
        self.to
    }

    /// True when the range places no constraint at all
    pub fn is_unbounded(&self) -> bool {
        self.lower().is_none() && self.upper().is_none()
    }

    /// Check whether a value falls in `[lower, upper)`
    pub fn contains(&self, value: f64) -> bool {
        self.lower().map_or(true, |lower| value >= lower)
            && self.upper().map_or(true, |upper| value < upper)
    }
}

fn parse_bound(token: &str, raw: &str, which: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "*" {
        return Ok(None);
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(FacetError::malformed_range(
            token,
            format!("{} bound '{}' is not numeric", which, raw),
        )),
    }
}

impl FromStr for Range {
    type Err = FacetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
