//! Service layer for the apartment watcher.
//!
//! This module contains the business logic for:
//! - Listing extraction (`PageExtractor`)
//! - Change detection (`ChangeDetector`)
//! - Operator notification (`SmtpNotifier`, `LogNotifier`)

mod detector;
mod extractor;
mod notifier;

pub use detector::{ChangeDetector, Detection};
pub use extractor::{Extraction, ListingSource, PageExtractor, extract_from_html};
pub use notifier::{LogNotifier, Notification, Notifier, SmtpNotifier};
