//! Settlement planning and recorded settle-up payments

pub mod planner;
pub mod recorded;

pub use planner::*;
pub use recorded::*;
