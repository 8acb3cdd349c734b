//! Versioned transaction assembly shared by the executors

use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    hash::Hash,
    instruction::Instruction,
    message::{v0::Message as MessageV0, VersionedMessage},
    signature::Keypair,
    signer::Signer,
    transaction::VersionedTransaction,
};

use crate::error::{Error, Result};

/// Compute-unit price and limit, prepended ahead of the trade instructions
pub fn with_compute_budget(
    instructions: Vec<Instruction>,
    unit_limit: u32,
    unit_price_micro_lamports: u64,
) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(instructions.len() + 2);
    out.push(ComputeBudgetInstruction::set_compute_unit_price(unit_price_micro_lamports));
    out.push(ComputeBudgetInstruction::set_compute_unit_limit(unit_limit));
    out.extend(instructions);
    out
}

/// Compile a v0 message paid by `payer` and sign it
pub fn build_versioned_transaction(
    payer: &Keypair,
    instructions: &[Instruction],
    recent_blockhash: Hash,
) -> Result<VersionedTransaction> {
    let message = MessageV0::try_compile(&payer.pubkey(), instructions, &[], recent_blockhash)
        .map_err(|e| Error::TransactionBuild(format!("Message compile failed: {}", e)))?;

    VersionedTransaction::try_new(VersionedMessage::V0(message), &[payer])
        .map_err(|e| Error::Signing(e.to_string()))
}
