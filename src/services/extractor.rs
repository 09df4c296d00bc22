// src/services/extractor.rs

//! Listing page extraction.
//!
//! Fetches one page and collects the normalized text of every element
//! matching a CSS selector, in document order.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::utils::{get_domain, http, normalize_whitespace};

/// Result of extracting one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Page loaded; text of each matching element (possibly none)
    Items(Vec<String>),
    /// Page could not be fetched or the selector was unusable
    Failed(String),
}

impl Extraction {
    /// Extracted items, empty when extraction failed.
    pub fn items(&self) -> &[String] {
        match self {
            Self::Items(items) => items.as_slice(),
            Self::Failed(_) => &[],
        }
    }
}

/// Source of raw listing text for a target.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Extract every element matching `selector` from the page at `url`.
    ///
    /// Resolves only once the whole page has been processed. Failures are
    /// reported through [`Extraction::Failed`] rather than an error.
    async fn extract(&self, url: &str, selector: &str) -> Extraction;
}

/// HTTP-backed listing extractor.
pub struct PageExtractor {
    client: Client,
}

impl PageExtractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create an extractor with a client built from crawler settings.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(http::create_async_client(config)?))
    }

    /// Extract items, distinguishing every failure cause.
    pub async fn try_extract(&self, url: &str, selector: &str) -> Result<Vec<String>> {
        // Reject a bad selector before any network traffic.
        parse_selector(selector)?;
        if get_domain(url).is_none() {
            return Err(AppError::fetch(url, "URL has no host"));
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("unexpected status {status}")));
        }

        let html = response.text().await?;
        let items = extract_from_html(&html, selector)?;
        log::debug!("Extracted {} element(s) from {}", items.len(), url);
        Ok(items)
    }
}

#[async_trait]
impl ListingSource for PageExtractor {
    async fn extract(&self, url: &str, selector: &str) -> Extraction {
        match self.try_extract(url, selector).await {
            Ok(items) => Extraction::Items(items),
            Err(error) => {
                log::warn!("Failed to extract listings from {}: {}", url, error);
                Extraction::Failed(error.to_string())
            }
        }
    }
}

/// Extract normalized element text from an HTML string.
pub fn extract_from_html(html: &str, selector: &str) -> Result<Vec<String>> {
    let selector = parse_selector(selector)?;
    Ok(select_text(&Html::parse_document(html), &selector))
}

fn select_text(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|element| normalize_whitespace(&element.text().collect::<String>()))
        .collect()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
