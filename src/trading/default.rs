//! Plain RPC submission with a priority fee

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::signature::Keypair;
use tracing::{debug, warn};

use super::confirm::wait_for_confirmation;
use super::transaction::{build_versioned_transaction, with_compute_budget};
use super::{SubmissionResult, TransactionExecutor};
use crate::error::Result;

pub struct DefaultTransactionExecutor {
    rpc: Arc<RpcClient>,
    compute_unit_limit: u32,
    compute_unit_price: u64,
    confirm_timeout: Duration,
}

impl DefaultTransactionExecutor {
    pub fn new(
        rpc: Arc<RpcClient>,
        compute_unit_limit: u32,
        compute_unit_price: u64,
        confirm_timeout: Duration,
    ) -> Self {
        Self {
            rpc,
            compute_unit_limit,
            compute_unit_price,
            confirm_timeout,
        }
    }
}

#[async_trait]
impl TransactionExecutor for DefaultTransactionExecutor {
    async fn submit(&self, instructions: Vec<Instruction>, payer: &Keypair) -> Result<SubmissionResult> {
        let blockhash = match self.rpc.get_latest_blockhash().await {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Failed to fetch blockhash: {}", e);
                return Ok(SubmissionResult::unconfirmed(None, format!("blockhash: {}", e)));
            }
        };

        let instructions = with_compute_budget(instructions, self.compute_unit_limit, self.compute_unit_price);
        let transaction = build_versioned_transaction(payer, &instructions, blockhash)?;

        let config = RpcSendTransactionConfig {
            skip_preflight: true,
            ..Default::default()
        };
        let signature = match self.rpc.send_transaction_with_config(&transaction, config).await {
            Ok(signature) => signature,
            Err(e) => {
                warn!("Failed to send transaction: {}", e);
                return Ok(SubmissionResult::unconfirmed(transaction.signatures.first().copied(), e.to_string()));
            }
        };

        debug!("Sent transaction {}", signature);
        let confirmation = wait_for_confirmation(&self.rpc, &signature, self.confirm_timeout).await;
        Ok(SubmissionResult::from_confirmation(signature, confirmation))
    }
}
