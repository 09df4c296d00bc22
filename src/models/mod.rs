// src/models/mod.rs

//! Domain models for the apartment watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod report;
mod target;

// Re-export all public types
pub use config::{Config, CrawlerConfig};
pub use report::{ChangeReport, SkipReason, TargetOutcome, TargetState};
pub use target::{SizeFilter, TargetRegistry, TargetSpec};
