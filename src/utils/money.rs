//! Fixed-point money helpers

use bigdecimal::{BigDecimal, RoundingMode};

/// Standard currency precision (2 decimal places)
pub const DEFAULT_SCALE: i64 = 2;

/// Rounds a value half-up to `scale` fractional digits
pub fn round_money(value: &BigDecimal, scale: i64) -> BigDecimal {
    value.with_scale_round(scale, RoundingMode::HalfUp)
}

/// Truncates a value toward zero at `scale` fractional digits
pub fn truncate_money(value: &BigDecimal, scale: i64) -> BigDecimal {
    value.with_scale_round(scale, RoundingMode::Down)
}

/// The smallest amount representable at `scale` (0.01 for scale 2)
pub fn minor_unit(scale: i64) -> BigDecimal {
    BigDecimal::new(1.into(), scale)
}

/// Tolerance allowed when `count` independently rounded amounts are compared to a total
pub fn rounding_tolerance(scale: i64, count: usize) -> BigDecimal {
    minor_unit(scale) * BigDecimal::from(count as u64)
}

/// Whether two amounts differ by no more than `tolerance`
pub fn within_tolerance(left: &BigDecimal, right: &BigDecimal, tolerance: &BigDecimal) -> bool {
    (left - right).abs() <= *tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_money(&dec("2.345"), 2), dec("2.35"));
        assert_eq!(round_money(&dec("2.344"), 2), dec("2.34"));
        assert_eq!(round_money(&dec("-2.345"), 2), dec("-2.35"));
        assert_eq!(round_money(&dec("33.333333"), 2), dec("33.33"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_money(&dec("33.339"), 2), dec("33.33"));
        assert_eq!(truncate_money(&dec("-33.339"), 2), dec("-33.33"));
    }

    #[test]
    fn test_minor_unit_and_tolerance() {
        assert_eq!(minor_unit(2), dec("0.01"));
        assert_eq!(minor_unit(0), dec("1"));
        assert_eq!(rounding_tolerance(2, 3), dec("0.03"));
        assert!(within_tolerance(&dec("99.99"), &dec("100.00"), &dec("0.03")));
        assert!(!within_tolerance(&dec("99.90"), &dec("100.00"), &dec("0.03")));
    }
}
