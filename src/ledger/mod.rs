//! Ledger module: aggregation, net balances and the balance query service

pub mod aggregator;
pub mod balance;
pub mod service;
pub mod snapshot;

pub use aggregator::*;
pub use balance::*;
pub use service::*;
pub use snapshot::*;
