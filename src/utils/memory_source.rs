//! In-memory expense source for testing and development

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;
use crate::utils::validation;

#[derive(Debug, Clone)]
struct GroupEntry {
    group: Group,
    member_ids: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    members: HashMap<String, Member>,
    groups: Vec<GroupEntry>,
    expenses: Vec<ExpenseRecord>,
    splits: Vec<SplitEntry>,
    settlements: Vec<RecordedSettlement>,
}

impl State {
    fn group(&self, group_id: &str) -> Option<&GroupEntry> {
        self.groups.iter().find(|g| g.group.id == group_id)
    }

    fn group_mut(&mut self, group_id: &str) -> Option<&mut GroupEntry> {
        self.groups.iter_mut().find(|g| g.group.id == group_id)
    }

    fn roster(&self, entry: &GroupEntry) -> Vec<Member> {
        entry
            .member_ids
            .iter()
            .filter_map(|id| self.members.get(id).cloned())
            .collect()
    }
}

/// In-memory expense source for testing and development
///
/// All data sits behind a single lock, so every read sees one consistent
/// snapshot. Clones share the same data.
#[derive(Clone)]
pub struct MemoryExpenseSource {
    state: Arc<RwLock<State>>,
    validator: Arc<dyn ExpenseValidator>,
}

impl MemoryExpenseSource {
    /// Create an empty source with the default expense validator
    pub fn new() -> Self {
        Self::with_validator(Arc::new(DefaultExpenseValidator::default()))
    }

    /// Create an empty source with a custom expense validator
    pub fn with_validator(validator: Arc<dyn ExpenseValidator>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            validator,
        }
    }

    fn read(&self) -> BalanceResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| BalanceError::Source("memory source lock poisoned".to_string()))
    }

    fn write(&self) -> BalanceResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| BalanceError::Source("memory source lock poisoned".to_string()))
    }

    /// Register a member
    pub fn add_member(&self, member: Member) -> BalanceResult<()> {
        validation::validate_id("Member", &member.id)?;
        let mut state = self.write()?;
        if state.members.contains_key(&member.id) {
            return Err(BalanceError::Validation(format!(
                "Member {} already exists",
                member.id
            )));
        }
        state.members.insert(member.id.clone(), member);
        Ok(())
    }

    /// Create a group with an initial roster of registered members
    pub fn create_group<I, M>(&self, group: Group, member_ids: I) -> BalanceResult<()>
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        validation::validate_id("Group", &group.id)?;
        let mut state = self.write()?;
        if state.group(&group.id).is_some() {
            return Err(BalanceError::Validation(format!(
                "Group {} already exists",
                group.id
            )));
        }

        let mut roster: Vec<String> = Vec::new();
        for member_id in member_ids {
            let member_id = member_id.into();
            if !state.members.contains_key(&member_id) {
                return Err(BalanceError::MemberNotFound(member_id));
            }
            if !roster.contains(&member_id) {
                roster.push(member_id);
            }
        }

        state.groups.push(GroupEntry {
            group,
            member_ids: roster,
        });
        Ok(())
    }

    /// Add a registered member to a group's roster
    pub fn add_group_member(&self, group_id: &str, member_id: &str) -> BalanceResult<()> {
        let mut state = self.write()?;
        if !state.members.contains_key(member_id) {
            return Err(BalanceError::MemberNotFound(member_id.to_string()));
        }
        let entry = state
            .group_mut(group_id)
            .ok_or_else(|| BalanceError::GroupNotFound(group_id.to_string()))?;
        if !entry.member_ids.iter().any(|id| id == member_id) {
            entry.member_ids.push(member_id.to_string());
        }
        Ok(())
    }

    /// Remove a member from a group's roster.
    ///
    /// Expenses the member took part in are kept as they are.
    pub fn remove_group_member(&self, group_id: &str, member_id: &str) -> BalanceResult<()> {
        let mut state = self.write()?;
        let entry = state
            .group_mut(group_id)
            .ok_or_else(|| BalanceError::GroupNotFound(group_id.to_string()))?;
        let before = entry.member_ids.len();
        entry.member_ids.retain(|id| id != member_id);
        if entry.member_ids.len() == before {
            return Err(BalanceError::MemberNotFound(member_id.to_string()));
        }
        Ok(())
    }

    /// Store an expense and its splits after validating them against the group roster
    pub fn record_expense(&self, expense: ExpenseRecord, splits: Vec<SplitEntry>) -> BalanceResult<()> {
        let mut state = self.write()?;
        let entry = state
            .group(&expense.group_id)
            .ok_or_else(|| BalanceError::GroupNotFound(expense.group_id.clone()))?;
        let roster = state.roster(entry);
        self.validator.validate_expense(&expense, &splits, &roster)?;

        if state.expenses.iter().any(|e| e.id == expense.id) {
            return Err(BalanceError::Validation(format!(
                "Expense {} already exists",
                expense.id
            )));
        }

        tracing::debug!(
            expense_id = %expense.id,
            group_id = %expense.group_id,
            splits = splits.len(),
            "recorded expense"
        );
        state.expenses.push(expense);
        state.splits.extend(splits);
        Ok(())
    }

    /// Store an expense exactly as given, without any validation.
    ///
    /// Meant for importing legacy data; inconsistencies surface when balances are computed.
    pub fn import_expense(&self, expense: ExpenseRecord, splits: Vec<SplitEntry>) -> BalanceResult<()> {
        let mut state = self.write()?;
        state.expenses.push(expense);
        state.splits.extend(splits);
        Ok(())
    }

    /// Record a settle-up payment between two members of a group
    pub fn record_settlement(&self, settlement: RecordedSettlement) -> BalanceResult<()> {
        validation::validate_positive_amount(&settlement.amount)?;
        if settlement.debtor_id == settlement.creditor_id {
            return Err(BalanceError::Validation(
                "A member cannot settle with themselves".to_string(),
            ));
        }

        let mut state = self.write()?;
        let entry = state
            .group(&settlement.group_id)
            .ok_or_else(|| BalanceError::GroupNotFound(settlement.group_id.clone()))?;
        for member_id in [&settlement.debtor_id, &settlement.creditor_id] {
            if !entry.member_ids.contains(member_id) {
                return Err(BalanceError::MemberNotFound(member_id.clone()));
            }
        }

        state.settlements.push(settlement);
        Ok(())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> BalanceResult<()> {
        *self.write()? = State::default();
        Ok(())
    }
}

impl Default for MemoryExpenseSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpenseSource for MemoryExpenseSource {
    async fn load_group(&self, group_id: &str) -> BalanceResult<Option<GroupData>> {
        let state = self.read()?;
        let entry = match state.group(group_id) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let expenses: Vec<ExpenseRecord> = state
            .expenses
            .iter()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect();
        let expense_ids: HashSet<&str> = expenses.iter().map(|e| e.id.as_str()).collect();
        let splits: Vec<SplitEntry> = state
            .splits
            .iter()
            .filter(|s| expense_ids.contains(s.expense_id.as_str()))
            .cloned()
            .collect();

        Ok(Some(GroupData {
            group: entry.group.clone(),
            members: state.roster(entry),
            expenses,
            splits,
        }))
    }

    async fn get_member(&self, member_id: &str) -> BalanceResult<Option<Member>> {
        Ok(self.read()?.members.get(member_id).cloned())
    }

    async fn groups_for_member(&self, member_id: &str) -> BalanceResult<Vec<Group>> {
        Ok(self
            .read()?
            .groups
            .iter()
            .filter(|g| g.member_ids.iter().any(|id| id == member_id))
            .map(|g| g.group.clone())
            .collect())
    }

    async fn member_splits(&self, member_id: &str) -> BalanceResult<Vec<MemberSplit>> {
        let state = self.read()?;
        let mut result = Vec::new();

        for split in state.splits.iter().filter(|s| s.member_id == member_id) {
            let group = state
                .expenses
                .iter()
                .find(|e| e.id == split.expense_id)
                .and_then(|e| state.group(&e.group_id));

            if let Some(entry) = group {
                result.push(MemberSplit {
                    group_id: entry.group.id.clone(),
                    group_name: entry.group.name.clone(),
                    split: split.clone(),
                });
            }
        }

        Ok(result)
    }

    async fn recorded_settlements(&self, group_id: &str) -> BalanceResult<Vec<RecordedSettlement>> {
        Ok(self
            .read()?
            .settlements
            .iter()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect())
    }
}
