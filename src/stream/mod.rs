//! Stream module - on-chain account subscriptions
//!
//! The runner consumes `ListenerEvent`s: pools and markets go into the
//! caches, pools and wallet balances start buys and sells.

pub mod listeners;

pub use listeners::{ListenerEvent, Listeners};
