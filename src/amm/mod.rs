//! Raydium AMM v4 protocol module
//!
//! # WARNING: Protocol Instability
//! Account layouts and program ids are hard-coded against the live v4
//! program and OpenBook v3 markets. A program upgrade breaks them silently.

pub mod accounts;
pub mod instruction;
pub mod keys;
pub mod program;
pub mod quote;

// Re-export commonly used types
pub use accounts::{LiquidityStateV4, MinimalMarketState};
pub use keys::PoolKeys;
pub use program::{OPENBOOK_PROGRAM_ID, RAYDIUM_AMM_V4_ID};
pub use quote::{QuoteEngine, QuoteResult, RpcQuoteEngine, SwapDirection};
