//! Approve Mechanical Turk assignments and pay performance bonuses.
//!
//! - [`compensator`]: approve / bonus operations over a [`mturk_requester::Requester`]
//! - [`batch`]: CSV loading and sequential row processing
//! - [`logging`]: verbosity → tracing filter

pub mod batch;
pub mod compensator;
pub mod logging;

pub use batch::{load_rows, run, BatchError, BatchSummary, BonusRow};
pub use compensator::{
    ApprovalOutcome, BonusOutcome, Compensator, CompensatorError, StatusLookup,
};
