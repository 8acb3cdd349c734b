//! Buy/sell concurrency gate
//!
//! One exclusive lock for buys and a counter of in-flight sells. Buys are
//! refused outright, never queued, while another buy holds the lock or any
//! sell is running. Sells always enter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Why a buy could not enter the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRefusal {
    BuyInProgress,
    SellInProgress,
}

#[derive(Debug, Default)]
pub struct ConcurrencyGate {
    buy_lock: Mutex<()>,
    active_sells: Arc<AtomicUsize>,
}

/// Held for the whole buy; dropping it releases the lock
#[derive(Debug)]
pub struct BuyPermit<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// Held for the whole sell; dropping it decrements the sell counter
#[derive(Debug)]
pub struct SellPermit {
    active_sells: Arc<AtomicUsize>,
}

impl Drop for SellPermit {
    fn drop(&mut self) {
        self.active_sells.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the buy lock without waiting
    pub fn try_enter_buy(&self) -> Result<BuyPermit<'_>, GateRefusal> {
        let guard = self
            .buy_lock
            .try_lock()
            .map_err(|_| GateRefusal::BuyInProgress)?;

        if self.active_sells.load(Ordering::SeqCst) > 0 {
            return Err(GateRefusal::SellInProgress);
        }

        Ok(BuyPermit { _guard: guard })
    }

    /// Register an in-flight sell
    pub fn enter_sell(&self) -> SellPermit {
        self.active_sells.fetch_add(1, Ordering::SeqCst);
        SellPermit {
            active_sells: Arc::clone(&self.active_sells),
        }
    }

    pub fn active_sells(&self) -> usize {
        self.active_sells.load(Ordering::SeqCst)
    }

    pub fn buy_in_progress(&self) -> bool {
        self.buy_lock.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_buy_is_refused() {
        let gate = ConcurrencyGate::new();
        let permit = gate.try_enter_buy().unwrap();
        assert!(gate.buy_in_progress());
        assert_eq!(gate.try_enter_buy().unwrap_err(), GateRefusal::BuyInProgress);

        drop(permit);
        assert!(!gate.buy_in_progress());
        assert!(gate.try_enter_buy().is_ok());
    }

    #[test]
    fn test_buy_refused_while_selling() {
        let gate = ConcurrencyGate::new();
        let sell = gate.enter_sell();
        assert_eq!(gate.try_enter_buy().unwrap_err(), GateRefusal::SellInProgress);
        // A refused buy leaves the lock free
        assert!(!gate.buy_in_progress());

        drop(sell);
        assert!(gate.try_enter_buy().is_ok());
    }

    #[test]
    fn test_sell_counter_balances() {
        let gate = ConcurrencyGate::new();
        let a = gate.enter_sell();
        let b = gate.enter_sell();
        assert_eq!(gate.active_sells(), 2);

        drop(a);
        assert_eq!(gate.active_sells(), 1);
        drop(b);
        assert_eq!(gate.active_sells(), 0);
    }

    #[test]
    fn test_sells_enter_during_buy() {
        let gate = ConcurrencyGate::new();
        let _buy = gate.try_enter_buy().unwrap();
        let _sell = gate.enter_sell();
        assert_eq!(gate.active_sells(), 1);
    }
}
