//! Admission filter debounce loop
//!
//! A pool is admitted after `required` consecutive passing evaluations.
//! The budget is `duration / interval` evaluations; a failing evaluation
//! resets the streak.

use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::PoolRecord;
use crate::filter::AdmissionFilterPipeline;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted { evaluations: u32 },
    Rejected { reason: String, evaluations: u32 },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

/// Number of evaluations that fit in the check window; 0 disables the loop
pub fn evaluation_budget(interval: Duration, duration: Duration) -> u32 {
    let interval = interval.as_millis();
    if interval == 0 || duration.is_zero() {
        return 0;
    }
    u32::try_from(duration.as_millis() / interval).unwrap_or(u32::MAX)
}

/// Evaluate `pipeline` until a streak of `required` passes or the budget runs out
pub async fn debounce_admission(
    pipeline: &dyn AdmissionFilterPipeline,
    pool: &PoolRecord,
    interval: Duration,
    duration: Duration,
    required: u32,
) -> Admission {
    let budget = evaluation_budget(interval, duration);
    if budget == 0 {
        return Admission::Admitted { evaluations: 0 };
    }

    let mint = pool.base_mint();
    let mut streak = 0u32;
    let mut last_reason = None;

    for evaluation in 1..=budget {
        let verdict = pipeline.evaluate(pool).await;

        if verdict.pass {
            streak += 1;
            debug!("Filter match {}/{} for {}", streak, required, mint);
            if streak >= required {
                return Admission::Admitted { evaluations: evaluation };
            }
        } else {
            trace!("Filter miss for {}: {}", mint, verdict.reason_or_default());
            streak = 0;
            last_reason = verdict.reason;
        }

        if evaluation < budget {
            tokio::time::sleep(interval).await;
        }
    }

    Admission::Rejected {
        reason: last_reason.unwrap_or_else(|| {
            format!("fewer than {} consecutive filter matches", required)
        }),
        evaluations: budget,
    }
}
