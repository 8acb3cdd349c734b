//! Trading module - transaction submission strategies
//!
//! Supports two execution methods behind one `submit` contract:
//! - Default: compute-budget priced, sent through RPC
//! - Jito: tip transfer appended, sent as a block engine bundle

pub mod confirm;
pub mod default;
pub mod jito;
pub mod transaction;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::instruction::Instruction;
use solana_sdk::signature::{Keypair, Signature};

use crate::config::{ExecutorConfig, ExecutorKind};
use crate::error::Result;

pub use confirm::Confirmation;
pub use default::DefaultTransactionExecutor;
pub use jito::JitoTransactionExecutor;

/// Outcome of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub confirmed: bool,
    pub signature: Option<Signature>,
    pub error: Option<String>,
}

impl SubmissionResult {
    pub fn confirmed(signature: Signature) -> Self {
        Self {
            confirmed: true,
            signature: Some(signature),
            error: None,
        }
    }

    pub fn unconfirmed(signature: Option<Signature>, error: impl Into<String>) -> Self {
        Self {
            confirmed: false,
            signature,
            error: Some(error.into()),
        }
    }

    fn from_confirmation(signature: Signature, confirmation: Confirmation) -> Self {
        match confirmation {
            Confirmation::Confirmed => Self::confirmed(signature),
            Confirmation::Failed(err) => Self::unconfirmed(Some(signature), err),
            Confirmation::TimedOut => Self::unconfirmed(Some(signature), "confirmation timed out"),
        }
    }
}

/// Signs, sends and confirms a list of trade instructions
///
/// Network and confirmation failures are reported in the result; `Err` is
/// reserved for local failures no retry can fix (signing, message compilation).
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    async fn submit(&self, instructions: Vec<Instruction>, payer: &Keypair) -> Result<SubmissionResult>;
}

/// Build the executor selected in `config`
pub fn build_executor(config: &ExecutorConfig, rpc: Arc<RpcClient>) -> Result<Arc<dyn TransactionExecutor>> {
    let confirm_timeout = Duration::from_millis(config.confirm_timeout_ms);

    Ok(match config.kind {
        ExecutorKind::Default => Arc::new(DefaultTransactionExecutor::new(
            rpc,
            config.compute_unit_limit,
            config.compute_unit_price,
            confirm_timeout,
        )),
        ExecutorKind::Jito => Arc::new(JitoTransactionExecutor::new(
            rpc,
            &config.block_engine_url,
            config.jito_tip_lamports,
            confirm_timeout,
        )?),
    })
}
