//! Bounds the quote-side liquidity of a pool

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use tracing::error;

use super::{Filter, FilterVerdict};
use crate::cache::PoolRecord;

/// Quote vault balance must lie within `[min, max]` raw units; 0 disables a bound
pub struct PoolSizeFilter {
    rpc: Arc<RpcClient>,
    min: u64,
    max: u64,
}

impl PoolSizeFilter {
    pub fn new(rpc: Arc<RpcClient>, min: u64, max: u64) -> Self {
        Self { rpc, min, max }
    }
}

fn check_size(size: u64, min: u64, max: u64) -> FilterVerdict {
    if max > 0 && size > max {
        return FilterVerdict::fail(format!("PoolSize -> Pool size {} > {}", size, max));
    }
    if min > 0 && size < min {
        return FilterVerdict::fail(format!("PoolSize -> Pool size {} < {}", size, min));
    }
    FilterVerdict::pass()
}

#[async_trait]
impl Filter for PoolSizeFilter {
    fn name(&self) -> &'static str {
        "pool_size"
    }

    async fn execute(&self, pool: &PoolRecord) -> FilterVerdict {
        let balance = match self.rpc.get_token_account_balance(&pool.state.quote_vault).await {
            Ok(balance) => balance,
            Err(e) => {
                error!("PoolSize -> Failed to check pool size for {}: {}", pool.base_mint(), e);
                return FilterVerdict::fail("PoolSize -> Failed to check pool size");
            }
        };

        match balance.amount.parse::<u64>() {
            Ok(size) => check_size(size, self.min, self.max),
            Err(_) => FilterVerdict::fail("PoolSize -> Failed to check pool size"),
        }
    }
}
