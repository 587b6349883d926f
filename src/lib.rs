//! # Shared Expense Core
//!
//! Balance computation for groups of people who share expenses: who paid what,
//! who owes what, and which transfers settle everyone up.
//!
//! ## Features
//!
//! - **Ledger aggregation**: per-member paid and owed totals from expenses and their splits
//! - **Net balances**: exact fixed-point arithmetic, rounded half-up only for presentation
//! - **Settlement planning**: greedy largest-first matching of debtors and creditors
//! - **Split allocation**: equal, percentage and exact splits with a configurable remainder policy
//! - **Balance queries**: group snapshots and per-member views over any data source
//! - **Source abstraction**: storage-agnostic design with the async [`ExpenseSource`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use shared_expense_core::{BalanceService, ExpenseBuilder, Group, Member, MemoryExpenseSource, SplitAllocator};
//! use bigdecimal::BigDecimal;
//!
//! # fn main() -> Result<(), shared_expense_core::BalanceError> {
//! let source = MemoryExpenseSource::new();
//! source.add_member(Member::new("a", "Alice"))?;
//! source.add_member(Member::new("b", "Bob"))?;
//! source.create_group(Group::new("trip", "Weekend trip"), ["a", "b"])?;
//!
//! let (expense, splits) = ExpenseBuilder::new("trip", "a", BigDecimal::from(40))
//!     .description("Fuel")
//!     .split_equally(["a", "b"])
//!     .build(&SplitAllocator::default())?;
//! source.record_expense(expense, splits)?;
//!
//! let service = BalanceService::new(source);
//! // let snapshot = service.group_snapshot("trip").await?;
//! # let _ = service;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod ledger;
pub mod settlement;
pub mod split;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use settlement::*;
pub use split::*;
pub use traits::*;
pub use types::*;
pub use utils::MemoryExpenseSource;
