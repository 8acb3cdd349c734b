//! Trade notifications
//!
//! Sinks are fire-and-forget: `send` never blocks the trade path and
//! delivery failures are only logged.

pub mod telegram;

use std::fmt;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::info;

use crate::bot::ExitTrigger;

pub use telegram::TelegramNotifier;

/// Something worth telling the operator about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeEvent {
    BuyConfirmed { mint: Pubkey, signature: Signature },
    BuyFailed { mint: Pubkey },
    SellConfirmed { mint: Pubkey, signature: Signature, trigger: ExitTrigger },
    SellFailed { mint: Pubkey },
    FilterRejected { mint: Pubkey, reason: String },
}

impl TradeEvent {
    pub fn mint(&self) -> &Pubkey {
        match self {
            TradeEvent::BuyConfirmed { mint, .. }
            | TradeEvent::BuyFailed { mint }
            | TradeEvent::SellConfirmed { mint, .. }
            | TradeEvent::SellFailed { mint }
            | TradeEvent::FilterRejected { mint, .. } => mint,
        }
    }

    /// Operator-facing message text
    pub fn message(&self) -> String {
        match self {
            TradeEvent::BuyConfirmed { mint, signature } => format!(
                "#BUY\nMint: {}\nhttps://solscan.io/tx/{}",
                mint, signature
            ),
            TradeEvent::BuyFailed { mint } => format!(
                "#BUY FAILED\nMint: {}\nhttps://solscan.io/token/{}",
                mint, mint
            ),
            TradeEvent::SellConfirmed { mint, signature, trigger } => format!(
                "#SELL ({})\nMint: {}\nhttps://solscan.io/tx/{}",
                trigger, mint, signature
            ),
            TradeEvent::SellFailed { mint } => format!(
                "#SELL FAILED\nMint: {}\nhttps://solscan.io/token/{}",
                mint, mint
            ),
            TradeEvent::FilterRejected { mint, reason } => format!(
                "#FILTERED\nMint: {}\nReason: {}\nhttps://solscan.io/token/{}",
                mint, reason, mint
            ),
        }
    }
}

impl fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message().replace('\n', " "))
    }
}

/// Non-blocking notification delivery
pub trait NotificationSink: Send + Sync {
    fn send(&self, event: TradeEvent);
}

/// Sink that only writes events to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn send(&self, event: TradeEvent) {
        info!("{}", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_tag_and_mint() {
        let mint = Pubkey::new_unique();
        let signature = Signature::default();

        let buy = TradeEvent::BuyConfirmed { mint, signature };
        assert!(buy.message().starts_with("#BUY\n"));
        assert!(buy.message().contains(&mint.to_string()));
        assert!(buy.message().contains(&format!("solscan.io/tx/{}", signature)));

        let sell = TradeEvent::SellConfirmed { mint, signature, trigger: ExitTrigger::TakeProfit };
        assert!(sell.message().starts_with("#SELL (take profit)"));

        let filtered = TradeEvent::FilterRejected { mint, reason: "Burned -> Creator didn't burn LP".into() };
        assert!(filtered.message().contains("Reason: Burned"));
        assert_eq!(filtered.mint(), &mint);
    }

    #[test]
    fn test_display_is_single_line() {
        let event = TradeEvent::SellFailed { mint: Pubkey::new_unique() };
        assert!(!event.to_string().contains('\n'));
    }
}
