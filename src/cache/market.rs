//! OpenBook market directory

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, trace};

use crate::amm::MinimalMarketState;
use crate::error::{Error, Result};

/// Market metadata a swap needs
pub type MarketRecord = MinimalMarketState;

/// Lookup of market records by market id
#[async_trait]
pub trait MarketDirectory: Send + Sync {
    async fn get(&self, market_id: &Pubkey) -> Result<Option<MarketRecord>>;
}

/// Market cache fed by the market listener
///
/// With an RPC client attached, a miss fetches the market account and caches it.
pub struct MarketCache {
    markets: DashMap<Pubkey, MarketRecord>,
    rpc: Option<Arc<RpcClient>>,
}

impl MarketCache {
    pub fn new(rpc: Option<Arc<RpcClient>>) -> Self {
        Self {
            markets: DashMap::new(),
            rpc,
        }
    }

    pub fn save(&self, market_id: Pubkey, market: MarketRecord) {
        if !self.markets.contains_key(&market_id) {
            trace!("Caching new market: {}", market_id);
            self.markets.insert(market_id, market);
        }
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    async fn fetch(&self, rpc: &RpcClient, market_id: &Pubkey) -> Result<Option<MarketRecord>> {
        debug!("Fetching market {} from RPC", market_id);

        let response = rpc
            .get_account_with_commitment(market_id, rpc.commitment())
            .await?;
        let Some(account) = response.value else {
            return Ok(None);
        };

        let market = MinimalMarketState::try_from_slice(&account.data)
            .map_err(|e| Error::MarketNotFound(format!("{}: {}", market_id, e)))?;
        self.markets.insert(*market_id, market);
        Ok(Some(market))
    }
}

#[async_trait]
impl MarketDirectory for MarketCache {
    async fn get(&self, market_id: &Pubkey) -> Result<Option<MarketRecord>> {
        if let Some(market) = self.markets.get(market_id) {
            return Ok(Some(*market));
        }

        match &self.rpc {
            Some(rpc) => self.fetch(rpc, market_id).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> MarketRecord {
        MinimalMarketState {
            event_queue: Pubkey::new_unique(),
            bids: Pubkey::new_unique(),
            asks: Pubkey::new_unique(),
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let cache = MarketCache::new(None);
        let id = Pubkey::new_unique();
        let record = market();
        cache.save(id, record);

        assert_eq!(cache.get(&id).await.unwrap(), Some(record));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_miss_without_rpc() {
        let cache = MarketCache::new(None);
        assert!(cache.get(&Pubkey::new_unique()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_save_wins() {
        let cache = MarketCache::new(None);
        let id = Pubkey::new_unique();
        let first = market();
        cache.save(id, first);
        cache.save(id, market());

        assert_eq!(cache.get(&id).await.unwrap(), Some(first));
    }
}
