//! Ledger aggregation: reducing expenses and splits to per-member totals

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::types::*;
use crate::utils::{money, validation};

/// Exact (unrounded) paid and owed totals for one member
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub total_paid: BigDecimal,
    pub total_owed: BigDecimal,
}

impl LedgerTotals {
    /// Exact net position, `total_paid - total_owed`
    pub fn net(&self) -> BigDecimal {
        &self.total_paid - &self.total_owed
    }
}

/// Per-member totals for a closed member set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerAggregation {
    totals: HashMap<String, LedgerTotals>,
    /// Contributions that were left out
    pub inconsistencies: Vec<Inconsistency>,
    drift_tolerance: BigDecimal,
}

impl LedgerAggregation {
    /// Totals for a member; `None` when the member was not in the roster
    pub fn totals_for(&self, member_id: &str) -> Option<&LedgerTotals> {
        self.totals.get(member_id)
    }

    /// Number of members with an entry
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Largest amount by which the included expenses may disagree with their
    /// splits: one minor unit per split of every expense that was counted
    pub fn drift_tolerance(&self) -> &BigDecimal {
        &self.drift_tolerance
    }
}

/// Expenses whose splits are consistent enough to count
#[derive(Debug, Clone, Default)]
pub(crate) struct ExpenseScreen {
    pub included: HashSet<String>,
    pub inconsistencies: Vec<Inconsistency>,
    pub drift_tolerance: BigDecimal,
}

impl ExpenseScreen {
    pub fn includes(&self, expense_id: &str) -> bool {
        self.included.contains(expense_id)
    }
}

/// Drop expenses whose splits do not add up and splits that belong to no expense
pub(crate) fn screen_expenses(
    expenses: &[ExpenseRecord],
    splits: &[SplitEntry],
    scale: i64,
) -> ExpenseScreen {
    let mut split_totals: HashMap<&str, (BigDecimal, usize)> = HashMap::new();
    for split in splits {
        let entry = split_totals
            .entry(split.expense_id.as_str())
            .or_insert_with(|| (BigDecimal::from(0), 0));
        entry.0 += &split.amount_owed;
        entry.1 += 1;
    }

    let mut screen = ExpenseScreen::default();
    let known: HashSet<&str> = expenses.iter().map(|e| e.id.as_str()).collect();

    for expense in expenses {
        let (split_total, split_count) = split_totals
            .get(expense.id.as_str())
            .cloned()
            .unwrap_or_else(|| (BigDecimal::from(0), 0));

        if validation::splits_match_amount(&expense.amount, &split_total, split_count, scale) {
            screen.included.insert(expense.id.clone());
            screen.drift_tolerance += money::rounding_tolerance(scale, split_count);
        } else {
            screen.inconsistencies.push(Inconsistency::SplitTotalMismatch {
                expense_id: expense.id.clone(),
                expected: expense.amount.clone(),
                actual: split_total,
            });
        }
    }

    for split in splits {
        if !known.contains(split.expense_id.as_str()) {
            screen.inconsistencies.push(Inconsistency::OrphanSplit {
                expense_id: split.expense_id.clone(),
                member_id: split.member_id.clone(),
            });
        }
    }

    screen
}

/// Aggregate a materialized group
pub fn aggregate_group(data: &GroupData, scale: i64) -> LedgerAggregation {
    aggregate(&data.members, &data.expenses, &data.splits, scale)
}

/// Reduce expenses and splits to per-member paid and owed totals.
///
/// Every roster member gets an entry, even with no activity. Sums are exact;
/// nothing is rounded here. Contributions that cannot be attributed to a roster
/// member, and expenses whose splits do not add up to their amount within one
/// minor unit per split, are skipped and reported in
/// [`LedgerAggregation::inconsistencies`].
pub fn aggregate(
    members: &[Member],
    expenses: &[ExpenseRecord],
    splits: &[SplitEntry],
    scale: i64,
) -> LedgerAggregation {
    let mut totals: HashMap<String, LedgerTotals> = members
        .iter()
        .map(|member| (member.id.clone(), LedgerTotals::default()))
        .collect();

    let screen = screen_expenses(expenses, splits, scale);
    let mut inconsistencies = screen.inconsistencies.clone();

    for expense in expenses.iter().filter(|e| screen.includes(&e.id)) {
        match totals.get_mut(&expense.payer_id) {
            Some(payer) => payer.total_paid += &expense.amount,
            None => inconsistencies.push(Inconsistency::UnknownPayer {
                expense_id: expense.id.clone(),
                member_id: expense.payer_id.clone(),
            }),
        }
    }

    for split in splits.iter().filter(|s| screen.includes(&s.expense_id)) {
        match totals.get_mut(&split.member_id) {
            Some(participant) => participant.total_owed += &split.amount_owed,
            None => inconsistencies.push(Inconsistency::UnknownParticipant {
                expense_id: split.expense_id.clone(),
                member_id: split.member_id.clone(),
            }),
        }
    }

    for inconsistency in &inconsistencies {
        tracing::warn!(?inconsistency, "skipping inconsistent expense data");
    }

    LedgerAggregation {
        totals,
        inconsistencies,
        drift_tolerance: screen.drift_tolerance,
    }
}
