//! Validation utilities

use bigdecimal::BigDecimal;
use std::collections::HashSet;

use crate::types::*;
use crate::utils::money;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> BalanceResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(BalanceError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that an identifier is usable
pub fn validate_id(kind: &str, id: &str) -> BalanceResult<()> {
    if id.trim().is_empty() {
        return Err(BalanceError::Validation(format!(
            "{} ID cannot be empty",
            kind
        )));
    }

    if id.len() > 64 {
        return Err(BalanceError::Validation(format!(
            "{} ID cannot exceed 64 characters",
            kind
        )));
    }

    Ok(())
}

/// Validate a participant list: non-empty, valid ids, no duplicates
pub fn validate_participants<'a, I>(participants: I) -> BalanceResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for member_id in participants {
        validate_id("Member", member_id)?;
        if !seen.insert(member_id) {
            return Err(BalanceError::Validation(format!(
                "Member '{}' appears more than once in the split",
                member_id
            )));
        }
    }

    if seen.is_empty() {
        return Err(BalanceError::Validation(
            "An expense needs at least one participant".to_string(),
        ));
    }

    Ok(())
}

/// Validate that percentages lie in [0, 100] and add up to exactly 100
pub fn validate_percentages<'a, I>(percentages: I) -> BalanceResult<()>
where
    I: IntoIterator<Item = &'a BigDecimal>,
{
    let zero = BigDecimal::from(0);
    let hundred = BigDecimal::from(100);
    let mut total = BigDecimal::from(0);

    for percentage in percentages {
        if *percentage < zero || *percentage > hundred {
            return Err(BalanceError::Validation(format!(
                "Invalid split percentage: {}",
                percentage
            )));
        }
        total += percentage;
    }

    if total != hundred {
        return Err(BalanceError::Validation(format!(
            "Split percentages must sum to 100, got {}",
            total
        )));
    }

    Ok(())
}

/// Whether the splits of an expense add up to its amount, allowing one minor unit per split
pub fn splits_match_amount(
    amount: &BigDecimal,
    split_total: &BigDecimal,
    split_count: usize,
    scale: i64,
) -> bool {
    split_count > 0
        && money::within_tolerance(
            amount,
            split_total,
            &money::rounding_tolerance(scale, split_count),
        )
}
