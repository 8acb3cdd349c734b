//! Signature confirmation polling

use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::signature::Signature;
use tokio::time::Instant;
use tracing::{debug, trace};

/// How a sent transaction ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Landed and reached the client's commitment
    Confirmed,
    /// Landed with an execution error
    Failed(String),
    /// Not seen at the required commitment before the deadline
    TimedOut,
}

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poll the signature status until it settles or `timeout` passes
///
/// RPC errors while polling are treated as "not yet seen".
pub async fn wait_for_confirmation(
    rpc: &RpcClient,
    signature: &Signature,
    timeout: Duration,
) -> Confirmation {
    let deadline = Instant::now() + timeout;
    let commitment = rpc.commitment();

    loop {
        match rpc.get_signature_statuses(&[*signature]).await {
            Ok(response) => {
                if let Some(Some(status)) = response.value.into_iter().next() {
                    if let Some(err) = status.err {
                        debug!("Transaction {} failed: {}", signature, err);
                        return Confirmation::Failed(err.to_string());
                    }
                    if status.satisfies_commitment(commitment) {
                        return Confirmation::Confirmed;
                    }
                }
            }
            Err(e) => trace!("Status poll for {} failed: {}", signature, e),
        }

        if Instant::now() + POLL_INTERVAL > deadline {
            return Confirmation::TimedOut;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
