// src/pipeline/check.rs

//! One check cycle over every target.

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{
    ChangeReport, Config, SkipReason, TargetOutcome, TargetRegistry, TargetSpec, TargetState,
};
use crate::services::{
    ChangeDetector, Detection, Extraction, ListingSource, Notification, Notifier,
};
use crate::storage::StateStore;

/// Result of a check cycle.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub report: ChangeReport,
    /// `None` when nothing changed, otherwise whether delivery succeeded
    pub notified: Option<bool>,
}

/// Run one check cycle.
///
/// Targets are checked concurrently, bounded by `crawler.max_concurrent`.
/// Every target runs to completion even when the store fails for one of
/// them. Changes already written by the other targets are still notified,
/// then the first store error is returned. A failed notification is logged
/// and does not undo state already written.
pub async fn run_check(
    config: &Config,
    registry: &TargetRegistry,
    source: &dyn ListingSource,
    store: &dyn StateStore,
    notifier: &dyn Notifier,
) -> Result<CheckOutcome> {
    log::info!("Checking {} target(s)...", registry.len());

    let concurrency = config.crawler.max_concurrent.max(1);
    let detector = ChangeDetector::new(store);

    let mut target_stream = stream::iter(registry.iter())
        .map(|target| check_target(target, source, &detector))
        .buffer_unordered(concurrency);

    let mut outcomes = Vec::with_capacity(registry.len());
    let mut store_error = None;
    while let Some(result) = target_stream.next().await {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(error) => {
                log::error!("State store failed: {}", error);
                store_error.get_or_insert(error);
            }
        }
    }

    // Written values are never rolled back, so their changes must go out
    // in this cycle or they compare equal next time.
    let report = ChangeReport::from_outcomes(outcomes);
    let notified = notify(&report, notifier).await;

    match store_error {
        Some(error) => Err(error),
        None => Ok(CheckOutcome { report, notified }),
    }
}

async fn notify(report: &ChangeReport, notifier: &dyn Notifier) -> Option<bool> {
    if !report.changed {
        log::info!("No new data found");
        return None;
    }

    let notification = Notification::from_report(report);
    match notifier.send(&notification).await {
        Ok(()) => {
            log::info!("{}, notification sent", notification.subject);
            Some(true)
        }
        Err(error) => {
            log::error!("Failed to send notification: {}", error);
            Some(false)
        }
    }
}

/// Extract, filter and compare a single target.
async fn check_target(
    target: &TargetSpec,
    source: &dyn ListingSource,
    detector: &ChangeDetector<'_>,
) -> Result<TargetOutcome> {
    let extraction = source.extract(&target.url, &target.selector).await;

    let matches: Vec<String> = target
        .matching(extraction.items())
        .into_iter()
        .map(String::from)
        .collect();
    let canonical = matches.join(",");

    let state = match detector.detect(&target.name, &canonical).await? {
        Detection::Skipped => TargetState::Skipped(skip_reason(&extraction)),
        Detection::New => TargetState::Changed { previous: None },
        Detection::Changed { previous } => TargetState::Changed {
            previous: Some(previous),
        },
        Detection::Unchanged => TargetState::Unchanged,
    };

    match &state {
        TargetState::Changed { previous: None } => {
            log::info!("{}: CHANGED (first match, {} listing(s))", target.name, matches.len())
        }
        TargetState::Changed { .. } => {
            log::info!("{}: CHANGED ({} listing(s))", target.name, matches.len())
        }
        TargetState::Unchanged => log::info!("{}: UNCHANGED", target.name),
        TargetState::Skipped(reason) => log::info!("{}: SKIPPED ({})", target.name, reason),
    }

    Ok(TargetOutcome {
        name: target.name.clone(),
        url: target.url.clone(),
        state,
        matches,
        canonical,
    })
}

fn skip_reason(extraction: &Extraction) -> SkipReason {
    match extraction {
        Extraction::Failed(reason) => SkipReason::FetchFailed(reason.clone()),
        Extraction::Items(items) if items.is_empty() => SkipReason::NoElements,
        Extraction::Items(_) => SkipReason::NoMatches,
    }
}
