// src/services/detector.rs

//! Change detection against the last persisted value.

use crate::error::Result;
use crate::storage::StateStore;

/// Outcome of comparing one target's canonical result with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Empty result; the store was not touched
    Skipped,
    /// First observation; value persisted
    New,
    /// Differs from the stored value; new value persisted
    Changed { previous: String },
    /// Equal to the stored value; nothing written
    Unchanged,
}

impl Detection {
    pub fn is_change(&self) -> bool {
        matches!(self, Self::New | Self::Changed { .. })
    }
}

/// Compares canonical results with the state store and records changes.
pub struct ChangeDetector<'a> {
    store: &'a dyn StateStore,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(store: &'a dyn StateStore) -> Self {
        Self { store }
    }

    /// Read-compare-write for one target.
    ///
    /// Writes at most once, and only when the value is new or different.
    pub async fn detect(&self, name: &str, canonical: &str) -> Result<Detection> {
        if canonical.is_empty() {
            return Ok(Detection::Skipped);
        }

        match self.store.get(name).await? {
            None => {
                self.store.set(name, canonical).await?;
                Ok(Detection::New)
            }
            Some(previous) if previous != canonical => {
                self.store.set(name, canonical).await?;
                Ok(Detection::Changed { previous })
            }
            Some(_) => Ok(Detection::Unchanged),
        }
    }
}
