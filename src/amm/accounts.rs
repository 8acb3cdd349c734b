//! Raydium and OpenBook account structures
//!
//! # WARNING: These structures mirror on-chain layouts byte for byte
//! A field added or reordered here silently corrupts every decode.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use super::program::{MARKET_LAYOUT, POOL_LAYOUT};
use crate::error::{Error, Result};

/// Raydium AMM v4 pool state (`LiquidityStateV4`, 752 bytes)
#[derive(Debug, Clone, Default, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct LiquidityStateV4 {
    pub status: u64,
    pub nonce: u64,
    pub max_order: u64,
    pub depth: u64,
    pub base_decimal: u64,
    pub quote_decimal: u64,
    pub state: u64,
    pub reset_flag: u64,
    pub min_size: u64,
    pub vol_max_cut_ratio: u64,
    pub amount_wave_ratio: u64,
    pub base_lot_size: u64,
    pub quote_lot_size: u64,
    pub min_price_multiplier: u64,
    pub max_price_multiplier: u64,
    pub system_decimal_value: u64,
    pub min_separate_numerator: u64,
    pub min_separate_denominator: u64,
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
    pub pnl_numerator: u64,
    pub pnl_denominator: u64,
    pub swap_fee_numerator: u64,
    pub swap_fee_denominator: u64,
    pub base_need_take_pnl: u64,
    pub quote_need_take_pnl: u64,
    pub quote_total_pnl: u64,
    pub base_total_pnl: u64,
    /// Unix timestamp (seconds) at which swaps open
    pub pool_open_time: u64,
    pub punish_pc_amount: u64,
    pub punish_coin_amount: u64,
    pub orderbook_to_init_time: u64,
    pub swap_base_in_amount: u128,
    pub swap_quote_out_amount: u128,
    pub swap_base2quote_fee: u64,
    pub swap_quote_in_amount: u128,
    pub swap_base_out_amount: u128,
    pub swap_quote2base_fee: u64,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub open_orders: Pubkey,
    pub market_id: Pubkey,
    pub market_program_id: Pubkey,
    pub target_orders: Pubkey,
    pub withdraw_queue: Pubkey,
    pub lp_vault: Pubkey,
    /// Pool owner authority; a reconciler may rewrite it in the pool cache
    pub owner: Pubkey,
    pub lp_reserve: u64,
    pub padding: [u64; 3],
}

impl LiquidityStateV4 {
    /// Deserialize from account data
    pub fn try_from_slice(data: &[u8]) -> Result<Self> {
        if data.len() != POOL_LAYOUT::SIZE {
            return Err(Error::AccountDecode(format!(
                "Pool account must be {} bytes, got {}",
                POOL_LAYOUT::SIZE,
                data.len()
            )));
        }

        BorshDeserialize::try_from_slice(data)
            .map_err(|e| Error::AccountDecode(format!("Borsh decode failed: {}", e)))
    }

    pub fn base_decimals(&self) -> Result<u8> {
        decimals(self.base_decimal, "base")
    }

    pub fn quote_decimals(&self) -> Result<u8> {
        decimals(self.quote_decimal, "quote")
    }

    /// Swap fee as (numerator, denominator), falling back to Raydium's 25 bps
    pub fn swap_fee(&self) -> (u64, u64) {
        if self.swap_fee_denominator == 0 {
            (
                super::program::DEFAULT_SWAP_FEE_NUMERATOR,
                super::program::DEFAULT_SWAP_FEE_DENOMINATOR,
            )
        } else {
            (self.swap_fee_numerator, self.swap_fee_denominator)
        }
    }
}

/// The OpenBook market accounts a Raydium swap needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinimalMarketState {
    pub event_queue: Pubkey,
    pub bids: Pubkey,
    pub asks: Pubkey,
}

impl MinimalMarketState {
    /// Decode from a full `MarketStateV3` account
    pub fn try_from_slice(data: &[u8]) -> Result<Self> {
        if data.len() < MARKET_LAYOUT::ASKS + 32 {
            return Err(Error::AccountDecode(format!(
                "Market account too short: {} bytes",
                data.len()
            )));
        }

        Ok(Self {
            event_queue: read_pubkey(data, MARKET_LAYOUT::EVENT_QUEUE)?,
            bids: read_pubkey(data, MARKET_LAYOUT::BIDS)?,
            asks: read_pubkey(data, MARKET_LAYOUT::ASKS)?,
        })
    }
}

fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey> {
    let bytes: [u8; 32] = data
        .get(offset..offset + 32)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::AccountDecode(format!("No pubkey at offset {}", offset)))?;
    Ok(Pubkey::new_from_array(bytes))
}

/// Mint decimals are stored as u64 on the pool but never exceed u8
fn decimals(raw: u64, side: &str) -> Result<u8> {
    u8::try_from(raw).map_err(|_| Error::AccountDecode(format!("Pool {} decimals out of range: {}", side, raw)))
}
