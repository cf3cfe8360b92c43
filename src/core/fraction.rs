//! Shop-fraction formatting and rounding helpers
//!
//! Every dimension leaving the engine is reported as decimal inches plus the
//! nearest 1/16" fraction a cabinetmaker would read off a tape measure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Finest fraction used on the shop floor
pub const SIXTEENTH: f64 = 1.0 / 16.0;

/// A length in inches with its shop-fraction rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub inches: f64,
    pub fraction: String,
}

impl Measure {
    pub fn new(inches: f64) -> Self {
        Self {
            inches: round_to(inches, 5),
            fraction: to_shop_fraction(inches),
        }
    }
}

impl From<f64> for Measure {
    fn from(inches: f64) -> Self {
        Measure::new(inches)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fraction)
    }
}

/// A derived dimension together with the formula that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    pub value: Measure,
    pub formula: String,
}

impl Derived {
    pub fn new(inches: f64, formula: impl Into<String>) -> Self {
        Self {
            value: Measure::new(inches),
            formula: formula.into(),
        }
    }

    pub fn inches(&self) -> f64 {
        self.value.inches
    }
}

/// Format decimal inches as a reduced fraction of 1/16", e.g. `17 5/8"`
pub fn to_shop_fraction(inches: f64) -> String {
    if !inches.is_finite() {
        return format!("{}\"", inches);
    }

    let sign = if inches < 0.0 { "-" } else { "" };
    let sixteenths = (inches.abs() * 16.0).round() as u64;
    let whole = sixteenths / 16;
    let mut numerator = sixteenths % 16;
    let mut denominator = 16;

    if numerator == 0 {
        if whole == 0 {
            return "0\"".to_string();
        }
        return format!("{}{}\"", sign, whole);
    }

    while numerator % 2 == 0 {
        numerator /= 2;
        denominator /= 2;
    }

    if whole == 0 {
        format!("{}{}/{}\"", sign, numerator, denominator)
    } else {
        format!("{}{} {}/{}\"", sign, whole, numerator, denominator)
    }
}

/// Round to the nearest 1/16"
pub fn round_to_sixteenth(inches: f64) -> f64 {
    (inches * 16.0).round() / 16.0
}

/// Round down to the nearest 1/2" (shop drawer-box heights)
pub fn floor_to_half(inches: f64) -> f64 {
    (inches * 2.0).floor() / 2.0
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round a dollar amount to cents
pub fn round_cents(value: f64) -> f64 {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_inches() {
        assert_eq!(to_shop_fraction(18.0), "18\"");
        assert_eq!(to_shop_fraction(0.0), "0\"");
    }

    #[test]
    fn test_reduced_fractions() {
        assert_eq!(to_shop_fraction(17.625), "17 5/8\"");
        assert_eq!(to_shop_fraction(11.375), "11 3/8\"");
        assert_eq!(to_shop_fraction(0.5), "1/2\"");
        assert_eq!(to_shop_fraction(1.46875), "1 1/2\"");
        assert_eq!(to_shop_fraction(16.34375), "16 3/8\"");
    }

    #[test]
    fn test_rounds_to_nearest_not_down() {
        // 0.04 is nearer 1/16 than 0
        assert_eq!(to_shop_fraction(0.04), "1/16\"");
        // 5.97 rounds up to 6
        assert_eq!(to_shop_fraction(5.97), "6\"");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(to_shop_fraction(-0.25), "-1/4\"");
        assert_eq!(to_shop_fraction(-2.5), "-2 1/2\"");
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_to_sixteenth(5.1), 5.125);
        assert_eq!(floor_to_half(5.1875), 5.0);
        assert_eq!(floor_to_half(5.5), 5.5);
        assert_eq!(round_cents(10.005_1), 10.01);
    }

    #[test]
    fn test_measure_carries_both_forms() {
        let m = Measure::new(17.625);
        assert_eq!(m.inches, 17.625);
        assert_eq!(m.fraction, "17 5/8\"");
        assert_eq!(m.to_string(), "17 5/8\"");
    }
}
