//! Core types and data structures for group expense balances

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A person taking part in one or more groups
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Opaque identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl Member {
    /// Create a new member
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A group of members sharing expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier for the group
    pub id: String,
    /// Human-readable group name
    pub name: String,
    /// Optional free-form description
    pub description: Option<String>,
}

impl Group {
    /// Create a new group
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }
}

/// How an expense amount was divided between its participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SplitType {
    /// Every participant owes the same share
    #[default]
    Equal,
    /// Each participant owes a percentage of the amount
    Percentage,
    /// Each participant owes an explicit amount
    ExactAmount,
}

/// A single expense paid by one member on behalf of the group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier for the expense
    pub id: String,
    /// Group the expense belongs to
    pub group_id: String,
    /// Member who paid
    pub payer_id: String,
    /// Total amount paid
    pub amount: BigDecimal,
    /// What the money was spent on
    pub description: String,
    /// How the amount was split
    pub split_type: SplitType,
    /// When the expense happened
    pub expense_date: NaiveDateTime,
}

/// The portion of one expense owed by one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitEntry {
    /// Expense this split belongs to
    pub expense_id: String,
    /// Member who owes the amount
    pub member_id: String,
    /// Amount owed, never negative
    pub amount_owed: BigDecimal,
    /// Share of the expense in percent, when known
    pub percentage: Option<BigDecimal>,
}

impl SplitEntry {
    /// Create a split without a percentage
    pub fn new(
        expense_id: impl Into<String>,
        member_id: impl Into<String>,
        amount_owed: BigDecimal,
    ) -> Self {
        Self {
            expense_id: expense_id.into(),
            member_id: member_id.into(),
            amount_owed,
            percentage: None,
        }
    }
}

/// A split together with the group its expense belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSplit {
    pub group_id: String,
    pub group_name: String,
    pub split: SplitEntry,
}

/// Fully materialized data for one group, read from a single consistent snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupData {
    pub group: Group,
    /// Group roster, in display order
    pub members: Vec<Member>,
    pub expenses: Vec<ExpenseRecord>,
    pub splits: Vec<SplitEntry>,
}

impl GroupData {
    /// Create group data with an empty roster and no expenses
    pub fn new(group: Group) -> Self {
        Self {
            group,
            members: Vec::new(),
            expenses: Vec::new(),
            splits: Vec::new(),
        }
    }

    /// Look up a roster member by id
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Sum of every expense amount in the group
    pub fn total_expenses(&self) -> BigDecimal {
        self.expenses.iter().map(|e| &e.amount).sum()
    }
}

/// Derived per-member position within one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLedger {
    pub member_id: String,
    pub member_name: String,
    /// Total amount the member paid for the group
    pub total_paid: BigDecimal,
    /// Total amount the member owes across all splits
    pub total_owed: BigDecimal,
    /// `total_paid - total_owed`; positive means the member is owed money
    pub net_balance: BigDecimal,
}

/// A proposed payment that reduces a debtor's and a creditor's balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub debtor_id: String,
    pub debtor_name: String,
    pub creditor_id: String,
    pub creditor_name: String,
    /// Always strictly positive
    pub amount: BigDecimal,
}

/// A piece of upstream data the aggregator had to leave out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    /// The payer is not on the group roster; the payer credit was dropped
    UnknownPayer { expense_id: String, member_id: String },
    /// A split references a member outside the roster; the split was dropped
    UnknownParticipant { expense_id: String, member_id: String },
    /// A split references an expense that was not supplied
    OrphanSplit { expense_id: String, member_id: String },
    /// The splits of an expense do not add up to its amount; the whole expense was dropped
    SplitTotalMismatch {
        expense_id: String,
        expected: BigDecimal,
        actual: BigDecimal,
    },
}

/// Whole-group balance snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub group_id: String,
    pub group_name: String,
    /// Sum of every expense amount in the group
    pub total_expenses: BigDecimal,
    /// One entry per roster member, in roster order
    pub member_ledgers: Vec<MemberLedger>,
    /// Transfers that settle every balance
    pub transfers: Vec<Transfer>,
    /// Data that was skipped while aggregating
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inconsistencies: Vec<Inconsistency>,
}

impl BalanceSnapshot {
    /// Find the ledger entry for a member
    pub fn ledger_for(&self, member_id: &str) -> Option<&MemberLedger> {
        self.member_ledgers
            .iter()
            .find(|ledger| ledger.member_id == member_id)
    }
}

/// How much a member owes within one group, ignoring what they paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDebt {
    pub member_id: String,
    pub group_id: String,
    pub group_name: String,
    pub amount: BigDecimal,
}

/// A member's net balance within one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNetBalance {
    pub group_id: String,
    pub group_name: String,
    pub net_balance: BigDecimal,
}

/// A group whose balance could not be computed during a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBalanceFailure {
    pub group_id: String,
    pub group_name: String,
    pub reason: String,
}

/// Net balances of one member across every group they belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberGroupBalances {
    pub member_id: String,
    /// One entry per group; failed groups report zero
    pub balances: Vec<GroupNetBalance>,
    /// Groups that fell back to zero
    pub failures: Vec<GroupBalanceFailure>,
}

impl MemberGroupBalances {
    /// Sum of the member's net balance over all groups
    pub fn total_net_balance(&self) -> BigDecimal {
        self.balances.iter().map(|b| &b.net_balance).sum()
    }
}

/// Dashboard-style summary of a member's position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberOverview {
    pub member_id: String,
    pub member_name: String,
    /// Number of groups the member belongs to
    pub active_groups: usize,
    /// Sum of the member's split amounts across all groups
    pub total_share: BigDecimal,
    /// Net balance summed over all groups
    pub net_balance: BigDecimal,
    pub failures: Vec<GroupBalanceFailure>,
}

/// A settle-up payment that was actually made between two members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSettlement {
    pub id: String,
    pub group_id: String,
    pub debtor_id: String,
    pub creditor_id: String,
    pub amount: BigDecimal,
    pub settled_at: NaiveDateTime,
    pub notes: Option<String>,
}

impl RecordedSettlement {
    /// Create a settlement with a generated id, settled now
    pub fn new(
        group_id: impl Into<String>,
        debtor_id: impl Into<String>,
        creditor_id: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            group_id: group_id.into(),
            debtor_id: debtor_id.into(),
            creditor_id: creditor_id.into(),
            amount,
            settled_at: chrono::Utc::now().naive_utc(),
            notes: None,
        }
    }
}

/// Errors that can occur while computing balances
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("Group not found: {0}")]
    GroupNotFound(String),
    #[error("Member not found: {0}")]
    MemberNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Net balances do not sum to zero: residual = {residual}")]
    UnbalancedLedger { residual: BigDecimal },
    #[error("Data source error: {0}")]
    Source(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for balance operations
pub type BalanceResult<T> = Result<T, BalanceError>;
