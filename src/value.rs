//! Bounded numeric values
//!
//! A value that always sits inside an inclusive `[min, max]` range.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Range violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundsError {
    #[error("invalid range: minimum {min} is greater than maximum {max}")]
    InvertedRange { min: f64, max: f64 },

    #[error("value {value} outside range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },
}

/// A numeric value constrained to `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedValue {
    value: f64,
    min: f64,
    max: f64,
}

impl BoundedValue {
    /// Create a bounded value, rejecting values outside the range
    pub fn new(value: f64, min: f64, max: f64) -> Result<Self, BoundsError> {
        if min > max {
            return Err(BoundsError::InvertedRange { min, max });
        }
        let mut bounded = Self { value: min, min, max };
        bounded.set(value)?;
        Ok(bounded)
    }

    /// Create a bounded value, clamping the value into the range
    pub fn clamped(value: f64, min: f64, max: f64) -> Result<Self, BoundsError> {
        if min > max {
            return Err(BoundsError::InvertedRange { min, max });
        }
        Ok(Self {
            value: value.clamp(min, max),
            min,
            max,
        })
    }

    /// Replace the value
    pub fn set(&mut self, value: f64) -> Result<(), BoundsError> {
        // NaN fails both comparisons
        if !(value >= self.min && value <= self.max) {
            return Err(BoundsError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        self.value = value;
        Ok(())
    }

    pub fn get(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl PartialOrd for BoundedValue {
    /// Values compare first, ranges break ties
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.value.partial_cmp(&other.value)? {
            Ordering::Equal => match self.min.partial_cmp(&other.min)? {
                Ordering::Equal => self.max.partial_cmp(&other.max),
                ord => Some(ord),
            },
            ord => Some(ord),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_value_rejects_out_of_range() {
        assert!(BoundedValue::new(5.0, 0.0, 10.0).is_ok());
        assert_eq!(
            BoundedValue::new(11.0, 0.0, 10.0),
            Err(BoundsError::OutOfRange {
                value: 11.0,
                min: 0.0,
                max: 10.0
            })
        );
        assert!(BoundedValue::new(f64::NAN, 0.0, 10.0).is_err());
        assert!(matches!(
            BoundedValue::new(1.0, 2.0, 1.0),
            Err(BoundsError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_bounded_value_clamped() {
        let v = BoundedValue::clamped(-3.0, 0.0, 20.0).unwrap();
        assert_eq!(v.get(), 0.0);

        let v = BoundedValue::clamped(25.0, 0.0, 20.0).unwrap();
        assert_eq!(v.get(), 20.0);
    }

    #[test]
    fn test_bounded_value_set_keeps_old_value_on_error() {
        let mut v = BoundedValue::new(4.0, 0.0, 10.0).unwrap();
        assert!(v.set(12.0).is_err());
        assert_eq!(v.get(), 4.0);
        v.set(10.0).unwrap();
        assert_eq!(v.get(), 10.0);
    }

    #[test]
    fn test_bounded_value_equality_includes_range() {
        let a = BoundedValue::new(5.0, 0.0, 10.0).unwrap();
        let b = BoundedValue::new(5.0, 0.0, 20.0).unwrap();
        assert_ne!(a, b);
        assert!(a < b);

        let c = BoundedValue::new(6.0, 0.0, 10.0).unwrap();
        assert!(c > a);
    }
}
