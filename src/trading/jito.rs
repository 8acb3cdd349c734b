//! Jito bundle submission
//!
//! The trade transaction carries its own tip transfer to a random Jito tip
//! account and is sent as a one-transaction bundle through `sendBundle`.
//! No compute-budget instructions: the tip buys inclusion.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::instruction::Instruction;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::system_instruction;
use solana_sdk::transaction::VersionedTransaction;
use tracing::{debug, info, warn};

use super::confirm::wait_for_confirmation;
use super::transaction::build_versioned_transaction;
use super::{SubmissionResult, TransactionExecutor};
use crate::amm::program::get_random_tip_account;
use crate::error::{Error, Result};

pub struct JitoTransactionExecutor {
    rpc: Arc<RpcClient>,
    http: reqwest::Client,
    bundles_url: String,
    tip_lamports: u64,
    confirm_timeout: Duration,
}

impl JitoTransactionExecutor {
    pub fn new(
        rpc: Arc<RpcClient>,
        block_engine_url: &str,
        tip_lamports: u64,
        confirm_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        info!("Jito executor initialized for {}", block_engine_url);

        Ok(Self {
            rpc,
            http,
            bundles_url: format!("{}/api/v1/bundles", block_engine_url.trim_end_matches('/')),
            tip_lamports,
            confirm_timeout,
        })
    }

    /// Trade instructions followed by the tip transfer
    fn with_tip(&self, mut instructions: Vec<Instruction>, payer: &Keypair) -> Result<Vec<Instruction>> {
        let tip_account = get_random_tip_account().ok_or(Error::JitoTipAccountNotFound)?;
        instructions.push(system_instruction::transfer(&payer.pubkey(), &tip_account, self.tip_lamports));
        Ok(instructions)
    }

    async fn send_bundle(&self, transaction: &VersionedTransaction) -> Result<String> {
        let request = bundle_request(transaction)?;

        let response: Value = self
            .http
            .post(&self.bundles_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::JitoBundleSubmission(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::JitoBundleSubmission(e.to_string()))?;

        parse_bundle_response(&response)
    }
}

/// JSON-RPC `sendBundle` body for a single base64 transaction
fn bundle_request(transaction: &VersionedTransaction) -> Result<Value> {
    let bytes = bincode::serialize(transaction)
        .map_err(|e| Error::Serialization(format!("Transaction serialize failed: {}", e)))?;

    Ok(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "sendBundle",
        "params": [[STANDARD.encode(bytes)], { "encoding": "base64" }],
    }))
}

/// Bundle id from a `sendBundle` response
fn parse_bundle_response(response: &Value) -> Result<String> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(Error::JitoBundleSubmission(message.to_string()));
    }

    response
        .get("result")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::JitoBundleSubmission("Missing bundle id".to_string()))
}

#[async_trait]
impl TransactionExecutor for JitoTransactionExecutor {
    async fn submit(&self, instructions: Vec<Instruction>, payer: &Keypair) -> Result<SubmissionResult> {
        let blockhash = match self.rpc.get_latest_blockhash().await {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Failed to fetch blockhash: {}", e);
                return Ok(SubmissionResult::unconfirmed(None, format!("blockhash: {}", e)));
            }
        };

        let instructions = self.with_tip(instructions, payer)?;
        let transaction = build_versioned_transaction(payer, &instructions, blockhash)?;
        let Some(signature) = transaction.signatures.first().copied() else {
            return Err(Error::Signing("Transaction has no signature".to_string()));
        };

        match self.send_bundle(&transaction).await {
            Ok(bundle_id) => debug!("Bundle {} submitted for {}", bundle_id, signature),
            Err(e) => {
                warn!("Bundle submission failed: {}", e);
                return Ok(SubmissionResult::unconfirmed(Some(signature), e.to_string()));
            }
        }

        let confirmation = wait_for_confirmation(&self.rpc, &signature, self.confirm_timeout).await;
        Ok(SubmissionResult::from_confirmation(signature, confirmation))
    }
}
