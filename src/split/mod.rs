//! Split allocation: turning an expense amount into per-participant shares

pub mod builder;

pub use builder::*;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::{money, validation};

/// How leftover minor units are handled when an amount does not divide evenly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Truncate every share, then give one leftover minor unit to each of the
    /// first participants in the supplied order. Shares always sum to the amount.
    #[default]
    FirstParticipants,
    /// Round every share half-up on its own and leave the difference in place
    /// (100.00 split three ways becomes 3 x 33.33 = 99.99).
    Unreconciled,
}

/// Splits expense amounts into [`SplitEntry`] values
#[derive(Debug, Clone, PartialEq)]
pub struct SplitAllocator {
    scale: i64,
    remainder_policy: RemainderPolicy,
}

impl Default for SplitAllocator {
    fn default() -> Self {
        Self::new(money::DEFAULT_SCALE, RemainderPolicy::default())
    }
}

impl SplitAllocator {
    /// Create an allocator for the given scale and remainder policy
    pub fn new(scale: i64, remainder_policy: RemainderPolicy) -> Self {
        Self {
            scale,
            remainder_policy,
        }
    }

    pub fn remainder_policy(&self) -> RemainderPolicy {
        self.remainder_policy
    }

    /// Split an amount equally between participants
    pub fn equal(
        &self,
        expense_id: &str,
        amount: &BigDecimal,
        participants: &[String],
    ) -> BalanceResult<Vec<SplitEntry>> {
        validation::validate_positive_amount(amount)?;
        validation::validate_participants(participants.iter().map(String::as_str))?;

        let count = BigDecimal::from(participants.len() as u64);
        let raw_share = amount / &count;
        let shares = self.distribute(amount, vec![raw_share; participants.len()]);
        let percentage = money::round_money(&(BigDecimal::from(100) / &count), self.scale);

        Ok(participants
            .iter()
            .zip(shares)
            .map(|(member_id, share)| SplitEntry {
                expense_id: expense_id.to_string(),
                member_id: member_id.clone(),
                amount_owed: share,
                percentage: Some(percentage.clone()),
            })
            .collect())
    }

    /// Split an amount by percentage; percentages must add up to 100
    pub fn by_percentage(
        &self,
        expense_id: &str,
        amount: &BigDecimal,
        shares: &[(String, BigDecimal)],
    ) -> BalanceResult<Vec<SplitEntry>> {
        validation::validate_positive_amount(amount)?;
        validation::validate_participants(shares.iter().map(|(id, _)| id.as_str()))?;
        validation::validate_percentages(shares.iter().map(|(_, pct)| pct))?;

        let hundred = BigDecimal::from(100);
        let raw_shares = shares
            .iter()
            .map(|(_, pct)| amount * pct / &hundred)
            .collect();
        let amounts = self.distribute(amount, raw_shares);

        Ok(shares
            .iter()
            .zip(amounts)
            .map(|((member_id, pct), share)| SplitEntry {
                expense_id: expense_id.to_string(),
                member_id: member_id.clone(),
                amount_owed: share,
                percentage: Some(pct.clone()),
            })
            .collect())
    }

    /// Use explicit per-participant amounts; they must add up to the expense amount
    pub fn exact(
        &self,
        expense_id: &str,
        amount: &BigDecimal,
        shares: &[(String, BigDecimal)],
    ) -> BalanceResult<Vec<SplitEntry>> {
        validation::validate_positive_amount(amount)?;
        validation::validate_participants(shares.iter().map(|(id, _)| id.as_str()))?;

        let zero = BigDecimal::from(0);
        if let Some((member_id, _)) = shares.iter().find(|(_, owed)| *owed < zero) {
            return Err(BalanceError::Validation(format!(
                "Amount owed by '{}' cannot be negative",
                member_id
            )));
        }

        let entries: Vec<SplitEntry> = shares
            .iter()
            .map(|(member_id, owed)| {
                SplitEntry::new(expense_id, member_id.clone(), money::round_money(owed, self.scale))
            })
            .collect();

        let total: BigDecimal = entries.iter().map(|e| &e.amount_owed).sum();
        if !validation::splits_match_amount(amount, &total, entries.len(), self.scale) {
            return Err(BalanceError::Validation(format!(
                "Split amounts add up to {} but the expense is {}",
                total, amount
            )));
        }

        Ok(entries)
    }

    /// Round raw shares to the configured scale according to the remainder policy
    fn distribute(&self, total: &BigDecimal, raw_shares: Vec<BigDecimal>) -> Vec<BigDecimal> {
        match self.remainder_policy {
            RemainderPolicy::Unreconciled => raw_shares
                .iter()
                .map(|share| money::round_money(share, self.scale))
                .collect(),
            RemainderPolicy::FirstParticipants => {
                let total = money::round_money(total, self.scale);
                let unit = money::minor_unit(self.scale);
                let mut shares: Vec<BigDecimal> = raw_shares
                    .iter()
                    .map(|share| money::truncate_money(share, self.scale))
                    .collect();

                let allocated: BigDecimal = shares.iter().sum();
                let mut leftover = total - allocated;
                let mut idx = 0;
                while leftover >= unit && !shares.is_empty() {
                    let slot = idx % shares.len();
                    shares[slot] += &unit;
                    leftover -= &unit;
                    idx += 1;
                }
                shares
            }
        }
    }
}
