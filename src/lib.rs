//! Raydium Sniper Bot Library
//!
//! Watches Raydium AMM v4 for new pools, buys the ones that pass the
//! admission filters and sells them on take-profit, stop-loss or operator
//! interrupt.

pub mod amm;
pub mod bot;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod interrupt;
pub mod notify;
pub mod stream;
pub mod trading;

// Re-export commonly used types
pub use bot::{BuyOutcome, Holding, PoolCandidate, SellOutcome, TradeController};
pub use config::Config;
pub use error::{Error, Result};
