// src/models/report.rs

//! Per-cycle outcome of checking every target.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a target took no part in change detection this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Page could not be fetched or parsed
    FetchFailed(String),
    /// Page loaded but the selector matched nothing
    NoElements,
    /// Elements were found but none passed the size filter
    NoMatches,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailed(reason) => write!(f, "fetch failed: {reason}"),
            Self::NoElements => f.write_str("selector matched nothing"),
            Self::NoMatches => f.write_str("no listing of the wanted size"),
        }
    }
}

/// Terminal state of one target in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TargetState {
    Unchanged,
    Changed {
        /// Value stored before this cycle, `None` on first observation
        previous: Option<String>,
    },
    Skipped(SkipReason),
}

impl TargetState {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub name: String,
    pub url: String,
    pub state: TargetState,
    /// Listings that passed the size filter, in page order
    pub matches: Vec<String>,
    /// Comma-joined `matches`, the value compared and stored
    pub canonical: String,
}

/// Aggregate of all target outcomes for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeReport {
    pub changed: bool,
    pub changed_targets: BTreeSet<String>,
    pub outcomes: Vec<TargetOutcome>,
    pub checked_at: DateTime<Utc>,
}

impl ChangeReport {
    /// Aggregate outcomes, sorting them by target name.
    pub fn from_outcomes(mut outcomes: Vec<TargetOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.name.cmp(&b.name));
        let changed_targets: BTreeSet<String> = outcomes
            .iter()
            .filter(|o| o.state.is_changed())
            .map(|o| o.name.clone())
            .collect();

        Self {
            changed: !changed_targets.is_empty(),
            changed_targets,
            outcomes,
            checked_at: Utc::now(),
        }
    }

    /// Outcomes of the targets that changed.
    pub fn changed_outcomes(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.state.is_changed())
    }

    pub fn outcome(&self, name: &str) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, state: TargetState) -> TargetOutcome {
        TargetOutcome {
            name: name.to_string(),
            url: format!("https://{name}.se"),
            state,
            matches: Vec::new(),
            canonical: String::new(),
        }
    }

    #[test]
    fn test_report_aggregates_changed_targets() {
        let report = ChangeReport::from_outcomes(vec![
            outcome("b", TargetState::Changed { previous: None }),
            outcome("a", TargetState::Unchanged),
            outcome("c", TargetState::Skipped(SkipReason::NoMatches)),
        ]);

        assert!(report.changed);
        assert_eq!(
            report.changed_targets.iter().collect::<Vec<_>>(),
            vec!["b"]
        );
        assert_eq!(report.outcomes[0].name, "a");
        assert_eq!(report.changed_outcomes().count(), 1);
    }

    #[test]
    fn test_report_without_changes() {
        let report = ChangeReport::from_outcomes(vec![
            outcome("a", TargetState::Unchanged),
            outcome(
                "b",
                TargetState::Skipped(SkipReason::FetchFailed("timeout".into())),
            ),
        ]);
        assert!(!report.changed);
        assert!(report.changed_targets.is_empty());
    }

    #[test]
    fn test_report_serializes_skip_reason() {
        let report = ChangeReport::from_outcomes(vec![outcome(
            "a",
            TargetState::Skipped(SkipReason::NoElements),
        )]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["state"]["state"], "skipped");
        assert_eq!(json["outcomes"][0]["state"]["reason"], "no_elements");
    }
}
