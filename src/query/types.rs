//! Core types for the query system

use serde::{Deserialize, Serialize};

use crate::models::Range;

/// Value type for range bounds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeValue {
    /// 64-bit integer
    Long(i64),
    /// 64-bit floating point
    Double(f64),
}

impl RangeValue {
    /// Whole numbers render as integers, everything else as doubles
    pub fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            RangeValue::Long(value as i64)
        } else {
            RangeValue::Double(value)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            RangeValue::Long(v) => *v as f64,
            RangeValue::Double(v) => *v,
        }
    }
}

/// Range bounds for range clauses: inclusive lower, exclusive upper
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    /// Greater than or equal to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<RangeValue>,
    /// Less than
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<RangeValue>,
}

impl RangeBounds {
    /// `gte lower` / `lt upper`, each only when the range is bounded there
    pub fn from_range(range: &Range) -> Self {
        Self {
            gte: range.lower().map(RangeValue::from_f64),
            lt: range.upper().map(RangeValue::from_f64),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gte.is_none() && self.lt.is_none()
    }

    /// Check if a value is within this range
    pub fn contains_f64(&self, value: f64) -> bool {
        if let Some(ref gte) = self.gte {
            if value < gte.as_f64() {
                return false;
            }
        }
        if let Some(ref lt) = self.lt {
            if value >= lt.as_f64() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_value_rendering() {
        assert_eq!(RangeValue::from_f64(100.0), RangeValue::Long(100));
        assert_eq!(RangeValue::from_f64(9.5), RangeValue::Double(9.5));
        assert_eq!(
            serde_json::to_value(RangeValue::from_f64(100.0)).unwrap(),
            serde_json::json!(100)
        );
    }

    #[test]
    fn test_range_bounds_from_range() {
        let bounds = RangeBounds::from_range(&Range::decode("10..20").unwrap());
        assert_eq!(bounds.gte, Some(RangeValue::Long(10)));
        assert_eq!(bounds.lt, Some(RangeValue::Long(20)));

        assert!(bounds.contains_f64(10.0));
        assert!(bounds.contains_f64(15.0));
        assert!(!bounds.contains_f64(20.0));
        assert!(!bounds.contains_f64(9.0));

        let open = RangeBounds::from_range(&Range::decode("0..").unwrap());
        assert!(open.is_empty());
    }
}
