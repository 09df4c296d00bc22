//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::target::{TargetRegistry, TargetSpec, builtin_targets};
use crate::utils::get_domain;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and fetching behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Listing targets checked every run
    #[serde(default = "builtin_targets")]
    pub targets: Vec<TargetSpec>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or the defaults when the file does not exist.
    ///
    /// Any other failure, including a file that does not parse, is returned.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(AppError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!(
                    "Config file {:?} not found. Using defaults.",
                    path.as_ref()
                );
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.targets.is_empty() {
            return Err(AppError::validation("No targets defined"));
        }

        let mut names = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(AppError::validation("target name is empty"));
            }
            if !names.insert(target.name.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate target name '{}'",
                    target.name
                )));
            }
            if get_domain(&target.url).is_none() {
                return Err(AppError::validation(format!(
                    "target '{}' has no host in url '{}'",
                    target.name, target.url
                )));
            }
            Selector::parse(&target.selector)
                .map_err(|e| AppError::selector(&target.selector, format!("{e:?}")))?;
        }
        Ok(())
    }

    /// Build the target registry from the configured targets.
    pub fn registry(&self) -> Result<TargetRegistry> {
        TargetRegistry::new(self.targets.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            targets: builtin_targets(),
        }
    }
}

/// HTTP client and fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum targets fetched at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Maximum same-host redirects followed per page
    #[serde(default = "defaults::max_redirects")]
    pub max_redirects: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            max_redirects: defaults::max_redirects(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; apartment-watch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn max_redirects() -> usize {
        10
    }
}
