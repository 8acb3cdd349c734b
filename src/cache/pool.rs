//! In-memory pool directory keyed by base mint

use async_trait::async_trait;
use dashmap::DashMap;
use solana_sdk::pubkey::Pubkey;
use tracing::{trace, warn};

use crate::amm::LiquidityStateV4;
use crate::error::Result;

/// A cached pool and what we learned about it
#[derive(Debug, Clone, PartialEq)]
pub struct PoolRecord {
    /// Pool (AMM) account address
    pub id: Pubkey,
    /// Wallet that minted the LP supply, when known
    pub minter: Option<Pubkey>,
    pub state: LiquidityStateV4,
}

impl PoolRecord {
    pub fn new(id: Pubkey, minter: Option<Pubkey>, state: LiquidityStateV4) -> Self {
        Self { id, minter, state }
    }

    pub fn base_mint(&self) -> Pubkey {
        self.state.base_mint
    }
}

/// Lookup of pool records by base mint
#[async_trait]
pub trait PoolDirectory: Send + Sync {
    /// Current record for a base mint, if any
    async fn get(&self, mint: &Pubkey) -> Result<Option<PoolRecord>>;

    /// Rewrite the owner field of a pool's state; false if the pool is unknown
    fn update_owner(&self, pool_id: &Pubkey, owner: Pubkey) -> bool;

    /// Rewrite the minter of a pool; false if the pool is unknown
    fn update_minter(&self, pool_id: &Pubkey, minter: Option<Pubkey>) -> bool;
}

/// DashMap-backed pool directory
#[derive(Default)]
pub struct PoolCache {
    pools: DashMap<Pubkey, PoolRecord>,
}

impl PoolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a pool the first time its base mint is seen
    ///
    /// Returns false when the mint already has a pool; the existing record is kept.
    pub fn save(&self, id: Pubkey, minter: Option<Pubkey>, state: LiquidityStateV4) -> bool {
        let mint = state.base_mint;
        match self.pools.entry(mint) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                trace!("Caching new pool for mint: {}", mint);
                slot.insert(PoolRecord::new(id, minter, state));
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Apply `f` to the record whose pool id matches
    fn modify<F>(&self, pool_id: &Pubkey, f: F) -> bool
    where
        F: FnOnce(&mut PoolRecord),
    {
        match self.pools.iter_mut().find(|entry| entry.id == *pool_id) {
            Some(mut entry) => {
                f(entry.value_mut());
                true
            }
            None => {
                warn!("Pool with id: {} not found", pool_id);
                false
            }
        }
    }
}

#[async_trait]
impl PoolDirectory for PoolCache {
    async fn get(&self, mint: &Pubkey) -> Result<Option<PoolRecord>> {
        Ok(self.pools.get(mint).map(|entry| entry.value().clone()))
    }

    fn update_owner(&self, pool_id: &Pubkey, owner: Pubkey) -> bool {
        self.modify(pool_id, |record| record.state.owner = owner)
    }

    fn update_minter(&self, pool_id: &Pubkey, minter: Option<Pubkey>) -> bool {
        self.modify(pool_id, |record| record.minter = minter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_for(mint: Pubkey) -> LiquidityStateV4 {
        LiquidityStateV4 {
            base_mint: mint,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_keeps_first_pool_per_mint() {
        let cache = PoolCache::new();
        let mint = Pubkey::new_unique();
        let first = Pubkey::new_unique();

        assert!(cache.save(first, None, state_for(mint)));
        assert!(!cache.save(Pubkey::new_unique(), None, state_for(mint)));

        let record = cache.get(&mint).await.unwrap().unwrap();
        assert_eq!(record.id, first);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_mint() {
        let cache = PoolCache::new();
        assert!(cache.get(&Pubkey::new_unique()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_owner_last_writer_wins() {
        let cache = PoolCache::new();
        let mint = Pubkey::new_unique();
        let id = Pubkey::new_unique();
        cache.save(id, None, state_for(mint));

        let second = Pubkey::new_unique();
        assert!(cache.update_owner(&id, Pubkey::new_unique()));
        assert!(cache.update_owner(&id, second));

        let record = cache.get(&mint).await.unwrap().unwrap();
        assert_eq!(record.state.owner, second);
    }

    #[tokio::test]
    async fn test_update_minter() {
        let cache = PoolCache::new();
        let mint = Pubkey::new_unique();
        let id = Pubkey::new_unique();
        cache.save(id, None, state_for(mint));

        let minter = Pubkey::new_unique();
        assert!(cache.update_minter(&id, Some(minter)));
        assert!(!cache.update_minter(&Pubkey::new_unique(), None));

        let record = cache.get(&mint).await.unwrap().unwrap();
        assert_eq!(record.minter, Some(minter));
    }
}
