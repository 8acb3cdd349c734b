//! Pool admission filters
//!
//! Every enabled filter runs against the freshest pool record; a pool is
//! admitted only when all of them pass. The trade controller calls the
//! pipeline repeatedly and requires a streak of passes (see `bot::debounce`).

pub mod burn;
pub mod market;
pub mod metadata;
pub mod meta_words;
pub mod minters;
pub mod mutable;
pub mod pool_size;
pub mod renounced;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use solana_client::nonblocking::rpc_client::RpcClient;
use tracing::{debug, trace};

use crate::cache::PoolRecord;
use crate::config::{FilterConfig, QuoteToken};
use crate::error::Result;

pub use burn::BurnFilter;
pub use market::MarketFilter;
pub use metadata::{MetadataSource, RpcMetadataSource, TokenMetadata};
pub use meta_words::MetaWordsFilter;
pub use minters::MintersFilter;
pub use mutable::MutableFilter;
pub use pool_size::PoolSizeFilter;
pub use renounced::RenouncedFreezeFilter;

/// Outcome of one admission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterVerdict {
    pub pass: bool,
    /// Why the check failed; `None` on a pass
    pub reason: Option<String>,
}

impl FilterVerdict {
    pub fn pass() -> Self {
        Self {
            pass: true,
            reason: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            pass: false,
            reason: Some(reason.into()),
        }
    }

    /// Rejection reason, or an empty string on a pass
    pub fn reason_or_default(&self) -> &str {
        self.reason.as_deref().unwrap_or_default()
    }
}

/// A single admission check
///
/// Filters never fail: lookup errors are reported as a failing verdict.
#[async_trait]
pub trait Filter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, pool: &PoolRecord) -> FilterVerdict;
}

/// The admission check the trade controller debounces
#[async_trait]
pub trait AdmissionFilterPipeline: Send + Sync {
    async fn evaluate(&self, pool: &PoolRecord) -> FilterVerdict;
}

/// All configured filters; every one must pass
#[derive(Default)]
pub struct PoolFilters {
    filters: Vec<Box<dyn Filter>>,
}

impl PoolFilters {
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self { filters }
    }

    /// Build the filters enabled in `config`
    pub fn from_config(rpc: Arc<RpcClient>, config: &FilterConfig, quote: &QuoteToken) -> Result<Self> {
        let mut filters: Vec<Box<dyn Filter>> = Vec::new();
        let metadata: Arc<dyn MetadataSource> = Arc::new(RpcMetadataSource::new(Arc::clone(&rpc)));

        if config.check_burned {
            filters.push(Box::new(BurnFilter::new(Arc::clone(&rpc))));
        }

        if config.check_renounced || config.check_freezable {
            filters.push(Box::new(RenouncedFreezeFilter::new(
                Arc::clone(&rpc),
                config.check_renounced,
                config.check_freezable,
            )));
        }

        if config.check_mutable {
            filters.push(Box::new(MutableFilter::new(Arc::clone(&metadata))));
        }

        if !config.meta_words.is_empty() {
            filters.push(Box::new(MetaWordsFilter::new(
                Arc::clone(&metadata),
                &config.meta_words,
            )?));
        }

        if !config.minters.is_empty() {
            filters.push(Box::new(MintersFilter::new(Arc::clone(&rpc), &config.minters)?));
        }

        if config.markets.iter().any(|m| m == market::JUPITER) {
            filters.push(Box::new(MarketFilter::new()));
        }

        if config.min_pool_size > 0.0 || config.max_pool_size > 0.0 {
            filters.push(Box::new(PoolSizeFilter::new(
                Arc::clone(&rpc),
                quote.to_raw(config.min_pool_size),
                quote.to_raw(config.max_pool_size),
            )));
        }

        debug!(
            "Admission filters: [{}]",
            filters.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
        );

        Ok(Self::new(filters))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[async_trait]
impl AdmissionFilterPipeline for PoolFilters {
    async fn evaluate(&self, pool: &PoolRecord) -> FilterVerdict {
        if self.filters.is_empty() {
            return FilterVerdict::pass();
        }

        let verdicts = join_all(self.filters.iter().map(|f| f.execute(pool))).await;

        // Report the first failing filter in configuration order
        for (filter, verdict) in self.filters.iter().zip(verdicts) {
            if !verdict.pass {
                trace!("{} rejected {}: {}", filter.name(), pool.base_mint(), verdict.reason_or_default());
                return verdict;
            }
        }

        FilterVerdict::pass()
    }
}
