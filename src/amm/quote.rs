//! Constant-product swap quotes for Raydium v4 pools

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::program_pack::Pack;
use spl_token::state::Account as TokenAccount;
use tracing::trace;

use super::keys::PoolKeys;
use crate::error::{Error, Result};

/// Which side of the pool the input amount is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    /// Quote token in, base token out
    Buy,
    /// Base token in, quote token out
    Sell,
}

/// Expected output of a swap and the slippage-adjusted floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteResult {
    pub amount_out: u64,
    pub min_amount_out: u64,
}

/// Prices a swap against the current pool state
#[async_trait]
pub trait QuoteEngine: Send + Sync {
    /// Quote `amount_in` raw units; fails with `Error::QuoteUnavailable`
    async fn quote(
        &self,
        keys: &PoolKeys,
        amount_in: u64,
        direction: SwapDirection,
        slippage_pct: u8,
    ) -> Result<QuoteResult>;
}

/// Output of a constant-product swap after the pool fee
///
/// Mirrors the on-chain `swap_base_in` math: the fee is taken from the input,
/// rounded up, then `out = reserve_out * in / (reserve_in + in)`.
pub fn compute_amount_out(
    reserve_in: u64,
    reserve_out: u64,
    amount_in: u64,
    fee: (u64, u64),
) -> Result<u64> {
    let (fee_numerator, fee_denominator) = fee;
    if fee_denominator == 0 {
        return Err(Error::SwapOverflow);
    }

    let amount_in = amount_in as u128;
    let fee_amount = (amount_in * fee_numerator as u128).div_ceil(fee_denominator as u128);
    let amount_in_after_fee = amount_in.saturating_sub(fee_amount);

    let denominator = (reserve_in as u128)
        .checked_add(amount_in_after_fee)
        .ok_or(Error::SwapOverflow)?;
    if denominator == 0 {
        return Err(Error::QuoteUnavailable("Pool has no reserves".to_string()));
    }

    let out = (reserve_out as u128)
        .checked_mul(amount_in_after_fee)
        .ok_or(Error::SwapOverflow)?
        / denominator;

    u64::try_from(out).map_err(|_| Error::SwapOverflow)
}

/// Apply a whole-percent slippage tolerance to an expected output
pub fn apply_slippage(amount_out: u64, slippage_pct: u8) -> u64 {
    let keep = 100u128.saturating_sub(slippage_pct.min(100) as u128);
    ((amount_out as u128 * keep) / 100) as u64
}

/// Quote engine reading both vault balances from RPC on every call
pub struct RpcQuoteEngine {
    rpc: Arc<RpcClient>,
}

impl RpcQuoteEngine {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    async fn fetch_reserves(&self, keys: &PoolKeys) -> Result<(u64, u64)> {
        let accounts = self
            .rpc
            .get_multiple_accounts(&[keys.base_vault, keys.quote_vault])
            .await
            .map_err(|e| Error::QuoteUnavailable(format!("Vault fetch failed: {}", e)))?;

        let mut balances = accounts.into_iter().map(|account| {
            let account = account
                .ok_or_else(|| Error::QuoteUnavailable("Vault account missing".to_string()))?;
            TokenAccount::unpack(&account.data)
                .map(|vault| vault.amount)
                .map_err(|e| Error::QuoteUnavailable(format!("Vault decode failed: {}", e)))
        });

        let base = balances
            .next()
            .ok_or_else(|| Error::QuoteUnavailable("Base vault missing".to_string()))??;
        let quote = balances
            .next()
            .ok_or_else(|| Error::QuoteUnavailable("Quote vault missing".to_string()))??;

        Ok((base, quote))
    }
}

#[async_trait]
impl QuoteEngine for RpcQuoteEngine {
    async fn quote(
        &self,
        keys: &PoolKeys,
        amount_in: u64,
        direction: SwapDirection,
        slippage_pct: u8,
    ) -> Result<QuoteResult> {
        let (base_reserve, quote_reserve) = self.fetch_reserves(keys).await?;

        let (reserve_in, reserve_out) = match direction {
            SwapDirection::Buy => (quote_reserve, base_reserve),
            SwapDirection::Sell => (base_reserve, quote_reserve),
        };

        let amount_out = compute_amount_out(reserve_in, reserve_out, amount_in, keys.swap_fee)?;
        trace!(
            "Quote {} {:?}: in={} out={} (reserves {}/{})",
            keys.base_mint,
            direction,
            amount_in,
            amount_out,
            reserve_in,
            reserve_out
        );

        Ok(QuoteResult {
            amount_out,
            min_amount_out: apply_slippage(amount_out, slippage_pct),
        })
    }
}
