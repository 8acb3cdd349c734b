//! Price monitor: decides when a held position exits
//!
//! WARNING: TP/SL is best-effort, not guaranteed. Between two polls a pool
//! can be drained far below the stop-loss; the exit then happens at
//! whatever price the sell lands at.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, trace};

use super::debounce::evaluation_budget;
use crate::amm::{PoolKeys, QuoteEngine, SwapDirection};
use crate::interrupt::OperatorInterruptSource;

/// Why monitoring ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    TakeProfit,
    StopLoss,
    /// The operator asked to sell now
    Interrupted,
    /// Iteration budget ran out, or monitoring is disabled
    Exhausted,
}

impl fmt::Display for ExitTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitTrigger::TakeProfit => "take profit",
            ExitTrigger::StopLoss => "stop loss",
            ExitTrigger::Interrupted => "interrupted",
            ExitTrigger::Exhausted => "exhausted",
        };
        f.write_str(s)
    }
}

/// Exit levels in raw quote units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitThresholds {
    pub take_profit: u64,
    pub stop_loss: u64,
}

impl ExitThresholds {
    /// Levels relative to the amount spent on the buy
    pub fn from_quote_amount(quote_amount: u64, take_profit_bps: u64, stop_loss_bps: u64) -> Self {
        let fraction = |bps: u64| ((quote_amount as u128 * bps as u128) / 10_000) as u64;

        Self {
            take_profit: quote_amount.saturating_add(fraction(take_profit_bps)),
            stop_loss: quote_amount.saturating_sub(fraction(stop_loss_bps)),
        }
    }

    /// Threshold comparison for one quoted output
    pub fn evaluate(&self, amount_out: u64) -> Option<ExitTrigger> {
        if amount_out < self.stop_loss {
            Some(ExitTrigger::StopLoss)
        } else if amount_out > self.take_profit {
            Some(ExitTrigger::TakeProfit)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOutcome {
    pub trigger: ExitTrigger,
    /// Polling iterations consumed
    pub iterations: u32,
    /// Most recent successful quote
    pub last_amount_out: Option<u64>,
}

pub struct PriceMonitor<'a> {
    pub quotes: &'a dyn QuoteEngine,
    pub interrupt: &'a dyn OperatorInterruptSource,
    pub thresholds: ExitThresholds,
    pub interval: Duration,
    pub duration: Duration,
    pub slippage_pct: u8,
}

impl PriceMonitor<'_> {
    /// Poll the sell-side quote for `amount_in` base tokens until an exit triggers
    pub async fn run(&self, keys: &PoolKeys, amount_in: u64) -> MonitorOutcome {
        let budget = evaluation_budget(self.interval, self.duration);
        let mint = keys.base_mint;
        let mut last_amount_out = None;

        if budget == 0 {
            debug!("Price monitoring disabled for {}", mint);
            return MonitorOutcome {
                trigger: ExitTrigger::Exhausted,
                iterations: 0,
                last_amount_out,
            };
        }

        for iteration in 1..=budget {
            match self
                .quotes
                .quote(keys, amount_in, SwapDirection::Sell, self.slippage_pct)
                .await
            {
                Ok(quote) => {
                    last_amount_out = Some(quote.amount_out);
                    debug!(
                        "{} take profit: {} | stop loss: {} | current: {}",
                        mint, self.thresholds.take_profit, self.thresholds.stop_loss, quote.amount_out
                    );

                    if let Some(trigger) = self.thresholds.evaluate(quote.amount_out) {
                        info!("{} triggered for {} at {}", trigger, mint, quote.amount_out);
                        return MonitorOutcome {
                            trigger,
                            iterations: iteration,
                            last_amount_out,
                        };
                    }

                    // Only polled after a price check so a failed quote keeps the signal
                    if self.interrupt.poll_interrupt() {
                        info!("Monitoring of {} interrupted by operator", mint);
                        return MonitorOutcome {
                            trigger: ExitTrigger::Interrupted,
                            iterations: iteration,
                            last_amount_out,
                        };
                    }
                }
                Err(e) => trace!("Failed to check token price for {}: {}", mint, e),
            }

            if iteration < budget {
                tokio::time::sleep(self.interval).await;
            }
        }

        MonitorOutcome {
            trigger: ExitTrigger::Exhausted,
            iterations: budget,
            last_amount_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::testing::{pool_keys, ScriptedInterrupt, ScriptedQuotes};
    use tokio::time::Instant;

    const INTERVAL: Duration = Duration::from_millis(100);

    // Spent 1_000_000, TP +50%, SL -20%
    fn thresholds() -> ExitThresholds {
        ExitThresholds::from_quote_amount(1_000_000, 5_000, 2_000)
    }

    fn monitor<'a>(
        quotes: &'a ScriptedQuotes,
        interrupt: &'a ScriptedInterrupt,
        duration: Duration,
    ) -> PriceMonitor<'a> {
        PriceMonitor {
            quotes,
            interrupt,
            thresholds: thresholds(),
            interval: INTERVAL,
            duration,
            slippage_pct: 20,
        }
    }

    #[test]
    fn test_thresholds() {
        let t = thresholds();
        assert_eq!(t.take_profit, 1_500_000);
        assert_eq!(t.stop_loss, 800_000);

        assert_eq!(t.evaluate(799_999), Some(ExitTrigger::StopLoss));
        assert_eq!(t.evaluate(800_000), None);
        assert_eq!(t.evaluate(1_500_000), None);
        assert_eq!(t.evaluate(1_500_001), Some(ExitTrigger::TakeProfit));
    }

    #[test]
    fn test_stop_loss_never_underflows() {
        let t = ExitThresholds::from_quote_amount(100, 0, 20_000);
        assert_eq!(t.stop_loss, 0);
        assert_eq!(t.evaluate(0), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_monitor_exhausts_without_quoting() {
        let quotes = ScriptedQuotes::repeat(Ok(1_000_000));
        let interrupt = ScriptedInterrupt::never();

        let outcome = monitor(&quotes, &interrupt, Duration::ZERO)
            .run(&pool_keys(), 10)
            .await;

        assert_eq!(outcome.trigger, ExitTrigger::Exhausted);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(quotes.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_profit() {
        let quotes = ScriptedQuotes::new(vec![Ok(1_000_000), Ok(1_200_000), Ok(1_600_000)]);
        let interrupt = ScriptedInterrupt::never();

        let outcome = monitor(&quotes, &interrupt, Duration::from_secs(1))
            .run(&pool_keys(), 10)
            .await;

        assert_eq!(outcome.trigger, ExitTrigger::TakeProfit);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.last_amount_out, Some(1_600_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_loss() {
        let quotes = ScriptedQuotes::new(vec![Ok(900_000), Ok(700_000)]);
        let interrupt = ScriptedInterrupt::never();

        let outcome = monitor(&quotes, &interrupt, Duration::from_secs(1))
            .run(&pool_keys(), 10)
            .await;

        assert_eq!(outcome.trigger, ExitTrigger::StopLoss);
        assert_eq!(outcome.iterations, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_loss_on_small_position() {
        let quotes = ScriptedQuotes::new(vec![Ok(95), Ok(92), Ok(88)]);
        let interrupt = ScriptedInterrupt::never();
        let monitor = PriceMonitor {
            thresholds: ExitThresholds::from_quote_amount(100, 5_000, 1_000),
            ..monitor(&quotes, &interrupt, Duration::from_secs(1))
        };
        assert_eq!(monitor.thresholds.stop_loss, 90);

        let outcome = monitor.run(&pool_keys(), 10).await;
        assert_eq!(outcome.trigger, ExitTrigger::StopLoss);
        assert_eq!(outcome.iterations, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_checked_before_interrupt() {
        let quotes = ScriptedQuotes::new(vec![Ok(100)]);
        let interrupt = ScriptedInterrupt::at(&[1]);

        let outcome = monitor(&quotes, &interrupt, Duration::from_secs(1))
            .run(&pool_keys(), 10)
            .await;

        assert_eq!(outcome.trigger, ExitTrigger::StopLoss);
        assert_eq!(interrupt.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt() {
        let quotes = ScriptedQuotes::repeat(Ok(1_000_000));
        let interrupt = ScriptedInterrupt::at(&[2]);

        let outcome = monitor(&quotes, &interrupt, Duration::from_secs(1))
            .run(&pool_keys(), 10)
            .await;

        assert_eq!(outcome.trigger, ExitTrigger::Interrupted);
        assert_eq!(outcome.iterations, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_failures_consume_iterations() {
        let quotes = ScriptedQuotes::repeat(Err(()));
        let interrupt = ScriptedInterrupt::never();
        let start = Instant::now();

        let outcome = monitor(&quotes, &interrupt, Duration::from_millis(500))
            .run(&pool_keys(), 10)
            .await;

        assert_eq!(outcome.trigger, ExitTrigger::Exhausted);
        assert_eq!(outcome.iterations, 5);
        assert_eq!(outcome.last_amount_out, None);
        assert_eq!(quotes.calls(), 5);
        assert_eq!(interrupt.polls(), 0);
        assert_eq!(start.elapsed(), INTERVAL * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_waits_for_a_priced_iteration() {
        let quotes = ScriptedQuotes::new(vec![Err(()), Err(()), Ok(1_000_000)]);
        let interrupt = ScriptedInterrupt::at(&[1]);

        let outcome = monitor(&quotes, &interrupt, Duration::from_secs(1))
            .run(&pool_keys(), 10)
            .await;

        assert_eq!(outcome.trigger, ExitTrigger::Interrupted);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.last_amount_out, Some(1_000_000));
        assert_eq!(interrupt.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_within_band() {
        let quotes = ScriptedQuotes::repeat(Ok(1_000_000));
        let interrupt = ScriptedInterrupt::never();

        let outcome = monitor(&quotes, &interrupt, Duration::from_millis(300))
            .run(&pool_keys(), 10)
            .await;

        assert_eq!(outcome.trigger, ExitTrigger::Exhausted);
        assert_eq!(outcome.iterations, 3);
    }
}
