// src/models/target.rs

//! Listing targets and the size filters applied to their extracted text.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Rule deciding whether one extracted listing matches the wanted size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeFilter {
    /// Listing text starts with the size, e.g. `"4 rum, Storgatan 1"`.
    NumericPrefix,

    /// Listing text contains `"<size> <suffix>"` anywhere.
    RoomPhrase {
        #[serde(default = "default_room_suffix")]
        suffix: String,
    },
}

fn default_room_suffix() -> String {
    "rum och kök".to_string()
}

impl SizeFilter {
    /// Room-phrase filter with the default Swedish suffix.
    pub fn room_phrase() -> Self {
        Self::RoomPhrase {
            suffix: default_room_suffix(),
        }
    }

    /// Check a single listing against the threshold.
    ///
    /// A leading token that is not a number never matches.
    pub fn matches(&self, item: &str, threshold: u32) -> bool {
        match self {
            Self::NumericPrefix => item
                .split(' ')
                .next()
                .and_then(|token| token.parse::<u32>().ok())
                .is_some_and(|size| size == threshold),
            Self::RoomPhrase { suffix } => item.contains(&format!("{threshold} {suffix}")),
        }
    }
}

/// One named listing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Unique name, also the state store key
    pub name: String,

    /// Listing page URL
    pub url: String,

    /// CSS selector for listing elements
    pub selector: String,

    /// Wanted apartment size
    pub size_threshold: u32,

    /// How `size_threshold` is applied to each listing
    pub filter: SizeFilter,
}

impl TargetSpec {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        selector: impl Into<String>,
        size_threshold: u32,
        filter: SizeFilter,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            selector: selector.into(),
            size_threshold,
            filter,
        }
    }

    /// Listings passing this target's filter, in extraction order.
    pub fn matching<'a>(&self, raw: &'a [String]) -> Vec<&'a str> {
        raw.iter()
            .map(String::as_str)
            .filter(|item| self.filter.matches(item, self.size_threshold))
            .collect()
    }

    /// Comma-joined matching listings. Empty when nothing matches.
    pub fn canonicalize(&self, raw: &[String]) -> String {
        self.matching(raw).join(",")
    }
}

/// Read-only set of targets checked every cycle.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Vec<TargetSpec>,
}

impl TargetRegistry {
    /// Build a registry, rejecting empty or duplicate names.
    pub fn new(targets: Vec<TargetSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for target in &targets {
            if target.name.trim().is_empty() {
                return Err(AppError::validation("target name is empty"));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate target name '{}'",
                    target.name
                )));
            }
        }
        Ok(Self { targets })
    }

    /// The sites watched when no config file overrides them.
    pub fn builtin() -> Self {
        Self {
            targets: builtin_targets(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TargetSpec> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetSpec> {
        self.targets.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

pub(crate) fn builtin_targets() -> Vec<TargetSpec> {
    vec![
        TargetSpec::new(
            "finfast",
            "https://finfast.se/lediga-objekt",
            ".title",
            4,
            SizeFilter::NumericPrefix,
        ),
        TargetSpec::new(
            "lundbergs",
            "https://www.lundbergsfastigheter.se/bostad/lediga-lagenheter/orebro",
            ".closed",
            3,
            SizeFilter::room_phrase(),
        ),
    ]
}
