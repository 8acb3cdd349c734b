//! Requires the token to be listed on an aggregator

use std::time::Duration;

use async_trait::async_trait;
use tracing::error;

use super::{Filter, FilterVerdict};
use crate::cache::PoolRecord;
use crate::error::Result;

/// Market name accepted in `filters.markets`
pub const JUPITER: &str = "jupiter";

const JUPITER_TOKEN_URL: &str = "https://tokens.jup.ag/token";

/// Jupiter token listing check
pub struct MarketFilter {
    http: reqwest::Client,
    base_url: String,
}

impl MarketFilter {
    pub fn new() -> Self {
        Self::with_base_url(JUPITER_TOKEN_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn listed_on_jupiter(&self, mint: &str) -> Result<bool> {
        let url = format!("{}/{}", self.base_url, mint);
        let response = self.http.get(&url).send().await?;
        let ok = response.status().is_success();
        let body = response.text().await?;

        Ok(is_listed(ok, &body))
    }
}

impl Default for MarketFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Jupiter answers unknown tokens with a literal `null`
fn is_listed(status_ok: bool, body: &str) -> bool {
    status_ok && body.trim() != "null"
}

#[async_trait]
impl Filter for MarketFilter {
    fn name(&self) -> &'static str {
        "market"
    }

    async fn execute(&self, pool: &PoolRecord) -> FilterVerdict {
        let mint = pool.base_mint().to_string();

        match self.listed_on_jupiter(&mint).await {
            Ok(true) => FilterVerdict::pass(),
            Ok(false) => FilterVerdict::fail("CheckMarkets -> Not listed on jupiter"),
            Err(e) => {
                error!("CheckMarkets -> Failed to check markets for {}: {}", mint, e);
                FilterVerdict::fail("CheckMarkets -> Failed to check markets")
            }
        }
    }
}
