//! Bounded retry around transaction submission

use std::future::Future;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::trading::SubmissionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Confirmed { signature: Signature, attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Run `attempt` up to `max_attempts` times, stopping at the first confirmation
///
/// Each call gets the 1-based attempt number. Unconfirmed results and
/// transient errors move on to the next attempt immediately; an unrecoverable
/// error ends the loop and is returned.
pub async fn submit_with_retry<F, Fut>(
    label: &str,
    mint: &Pubkey,
    max_attempts: u32,
    mut attempt: F,
) -> Result<RetryOutcome>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<SubmissionResult>>,
{
    for n in 1..=max_attempts {
        info!("Send {} transaction attempt: {}/{} for {}", label, n, max_attempts, mint);

        match attempt(n).await {
            Ok(SubmissionResult {
                confirmed: true,
                signature: Some(signature),
                ..
            }) => {
                info!("Confirmed {} tx for {}: https://solscan.io/tx/{}", label, mint, signature);
                return Ok(RetryOutcome::Confirmed { signature, attempts: n });
            }
            Ok(result) => {
                info!(
                    "Error confirming {} tx for {} (signature {:?}): {}",
                    label,
                    mint,
                    result.signature,
                    result.error.as_deref().unwrap_or("unconfirmed")
                );
            }
            Err(e) if e.is_unrecoverable() => {
                warn!("Aborting {} of {}: {}", label, mint, e);
                return Err(e);
            }
            Err(e) => debug!("Error during {} attempt {} for {}: {}", label, n, mint, e),
        }
    }

    Ok(RetryOutcome::Exhausted { attempts: max_attempts })
}
