//! Operator interrupt: ends price monitoring early

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Read-and-clear interrupt signal polled by the price monitor
pub trait OperatorInterruptSource: Send + Sync {
    /// True if an interrupt was raised since the last poll; clears it
    fn poll_interrupt(&self) -> bool;
}

/// Process-wide interrupt flag
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

impl OperatorInterruptSource for InterruptFlag {
    fn poll_interrupt(&self) -> bool {
        self.raised.swap(false, Ordering::SeqCst)
    }
}

/// Raise `flag` every time the operator presses Enter
pub fn spawn_stdin_listener(flag: InterruptFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            info!("Operator interrupt received, selling at the next price check");
            flag.raise();
        }
        debug!("Stdin closed, interrupt listener stopped");
    })
}
