//! Requires configured words in the token's off-chain metadata
//!
//! Letters of a word may be separated by whitespace, so "moon" also matches
//! "m o o n". Matching is case-insensitive and every word must appear.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{error, trace};

use super::metadata::MetadataSource;
use super::{Filter, FilterVerdict};
use crate::cache::PoolRecord;
use crate::error::{Error, Result};

/// Compile a meta word into its whitespace-tolerant pattern
pub fn word_pattern(word: &str) -> Result<Regex> {
    let word = word.trim();
    if word.is_empty() {
        return Err(Error::InvalidRegex("empty meta word".to_string()));
    }

    let pattern = word
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect::<Vec<_>>()
        .join(r"\s*");

    Regex::new(&format!("(?i){}", pattern)).map_err(|e| Error::InvalidRegex(e.to_string()))
}

/// True when every pattern matches somewhere in `text`
pub fn contains_all_words(text: &str, patterns: &[Regex]) -> bool {
    patterns.iter().all(|p| p.is_match(text))
}

pub struct MetaWordsFilter {
    metadata: Arc<dyn MetadataSource>,
    patterns: Vec<Regex>,
    http: reqwest::Client,
}

impl MetaWordsFilter {
    pub fn new(metadata: Arc<dyn MetadataSource>, words: &[String]) -> Result<Self> {
        let patterns = words
            .iter()
            .map(|w| word_pattern(w))
            .collect::<Result<Vec<_>>>()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            metadata,
            patterns,
            http,
        })
    }

    async fn fetch_document(&self, uri: &str) -> Result<String> {
        let response = self.http.get(uri).send().await?;
        if !response.status().is_success() {
            return Err(Error::Http(format!("Fetch {} error {}", uri, response.status())));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Filter for MetaWordsFilter {
    fn name(&self) -> &'static str {
        "meta_words"
    }

    async fn execute(&self, pool: &PoolRecord) -> FilterVerdict {
        let mint = pool.base_mint();

        let metadata = match self.metadata.fetch(&mint).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => return FilterVerdict::fail("MetaWords -> Failed to fetch account data"),
            Err(e) => {
                error!("MetaWords -> {} for {}", e, mint);
                return FilterVerdict::fail("MetaWords -> Failed to check metadata words");
            }
        };

        match self.fetch_document(metadata.uri()).await {
            Ok(document) => {
                trace!("Metadata document for {}: {}", mint, document);
                if contains_all_words(&document, &self.patterns) {
                    FilterVerdict::pass()
                } else {
                    FilterVerdict::fail("MetaWords -> Metadata words not found")
                }
            }
            Err(e) => {
                error!("MetaWords -> {} for {}", e, mint);
                FilterVerdict::fail("MetaWords -> Failed to check metadata words")
            }
        }
    }
}
