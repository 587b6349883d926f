//! Traits for data source abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::types::*;
use crate::utils::{money, validation};

/// Read access to group expense data
///
/// This trait lets the balance core run against any backend (PostgreSQL,
/// SQLite, a remote service, in-memory, etc.). Balances are never stored;
/// everything is derived from what the source returns.
#[async_trait]
pub trait ExpenseSource: Send + Sync {
    /// Load a group with its roster, expenses and their splits.
    ///
    /// Implementations should read everything from one consistent snapshot.
    /// Returns `Ok(None)` when the group does not exist.
    async fn load_group(&self, group_id: &str) -> BalanceResult<Option<GroupData>>;

    /// Get a member by ID
    async fn get_member(&self, member_id: &str) -> BalanceResult<Option<Member>>;

    /// Groups whose roster contains the member
    async fn groups_for_member(&self, member_id: &str) -> BalanceResult<Vec<Group>>;

    /// Every split the member is a participant of, across all groups
    async fn member_splits(&self, member_id: &str) -> BalanceResult<Vec<MemberSplit>>;

    /// Settle-up payments recorded for a group
    async fn recorded_settlements(&self, group_id: &str) -> BalanceResult<Vec<RecordedSettlement>>;
}

/// Trait for implementing custom expense validation rules
pub trait ExpenseValidator: Send + Sync {
    /// Validate an expense and its splits against the group roster before saving
    fn validate_expense(
        &self,
        expense: &ExpenseRecord,
        splits: &[SplitEntry],
        roster: &[Member],
    ) -> BalanceResult<()>;
}

/// Default expense validator
///
/// Requires a positive amount, a payer and participants from the roster, and
/// splits that add up to the amount within one minor unit per split.
pub struct DefaultExpenseValidator {
    pub scale: i64,
}

impl Default for DefaultExpenseValidator {
    fn default() -> Self {
        Self {
            scale: money::DEFAULT_SCALE,
        }
    }
}

impl ExpenseValidator for DefaultExpenseValidator {
    fn validate_expense(
        &self,
        expense: &ExpenseRecord,
        splits: &[SplitEntry],
        roster: &[Member],
    ) -> BalanceResult<()> {
        validation::validate_positive_amount(&expense.amount)?;

        let on_roster = |id: &str| roster.iter().any(|m| m.id == id);

        if !on_roster(expense.payer_id.as_str()) {
            return Err(BalanceError::Validation(format!(
                "Payer {} is not a member of group {}",
                expense.payer_id, expense.group_id
            )));
        }

        for split in splits {
            if split.expense_id != expense.id {
                return Err(BalanceError::Validation(format!(
                    "Split for {} does not belong to expense {}",
                    split.member_id, expense.id
                )));
            }
            if !on_roster(split.member_id.as_str()) {
                return Err(BalanceError::Validation(format!(
                    "Participant {} is not a member of group {}",
                    split.member_id, expense.group_id
                )));
            }
        }

        validation::validate_participants(splits.iter().map(|s| s.member_id.as_str()))?;

        let split_total: BigDecimal = splits.iter().map(|s| &s.amount_owed).sum();
        if !validation::splits_match_amount(&expense.amount, &split_total, splits.len(), self.scale) {
            return Err(BalanceError::Validation(format!(
                "Splits total {} but expense {} is {}",
                split_total, expense.id, expense.amount
            )));
        }

        Ok(())
    }
}
