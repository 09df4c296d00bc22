//! Pipeline entry points.
//!
//! - `run_check`: One full pass over every target, notifying on changes

pub mod check;

pub use check::{CheckOutcome, run_check};
