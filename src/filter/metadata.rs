//! Metaplex token metadata lookup

use std::sync::Arc;

use async_trait::async_trait;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;

use crate::amm::program::METADATA_PROGRAM_ID;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct Creator {
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct MetadataData {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
}

/// Leading fields of a Metaplex `Metadata` account
///
/// Later optional fields (collection, uses, ...) are never read.
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct TokenMetadata {
    pub key: u8,
    pub update_authority: Pubkey,
    pub mint: Pubkey,
    pub data: MetadataData,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
}

impl TokenMetadata {
    /// Decode the prefix of a metadata account, ignoring trailing bytes
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut metadata = Self::deserialize(&mut &data[..])
            .map_err(|e| Error::AccountDecode(format!("Metadata decode failed: {}", e)))?;

        // On-chain strings are padded with NULs to a fixed width
        for field in [
            &mut metadata.data.name,
            &mut metadata.data.symbol,
            &mut metadata.data.uri,
        ] {
            let trimmed = field.trim_end_matches('\0').to_string();
            *field = trimmed;
        }

        Ok(metadata)
    }

    pub fn uri(&self) -> &str {
        &self.data.uri
    }
}

/// Metadata PDA for a mint
pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[b"metadata", METADATA_PROGRAM_ID.as_ref(), mint.as_ref()],
        &METADATA_PROGRAM_ID,
    )
    .0
}

/// Source of token metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Metadata for `mint`, or `None` when the account does not exist
    async fn fetch(&self, mint: &Pubkey) -> Result<Option<TokenMetadata>>;
}

pub struct RpcMetadataSource {
    rpc: Arc<RpcClient>,
}

impl RpcMetadataSource {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl MetadataSource for RpcMetadataSource {
    async fn fetch(&self, mint: &Pubkey) -> Result<Option<TokenMetadata>> {
        let address = metadata_address(mint);
        let response = self
            .rpc
            .get_account_with_commitment(&address, self.rpc.commitment())
            .await?;

        response
            .value
            .map(|account| TokenMetadata::decode(&account.data))
            .transpose()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn metadata(uri: &str, is_mutable: bool) -> TokenMetadata {
        TokenMetadata {
            key: 4,
            update_authority: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            data: MetadataData {
                name: "Token".into(),
                symbol: "TKN".into(),
                uri: uri.into(),
                seller_fee_basis_points: 0,
                creators: None,
            },
            primary_sale_happened: false,
            is_mutable,
        }
    }

    #[test]
    fn test_decode_trims_padding_and_ignores_tail() {
        let mut padded = metadata("https://example.com/meta.json", true);
        padded.data.name = format!("Token{}", "\0".repeat(27));

        let mut bytes = borsh::to_vec(&padded).unwrap();
        bytes.extend_from_slice(&[0u8; 64]);

        let decoded = TokenMetadata::decode(&bytes).unwrap();
        assert_eq!(decoded.data.name, "Token");
        assert_eq!(decoded.uri(), "https://example.com/meta.json");
        assert!(decoded.is_mutable);
    }

    #[test]
    fn test_decode_rejects_truncated_account() {
        assert!(TokenMetadata::decode(&[4u8; 10]).is_err());
    }

    #[test]
    fn test_metadata_address_is_deterministic() {
        let mint = Pubkey::new_unique();
        assert_eq!(metadata_address(&mint), metadata_address(&mint));
        assert_ne!(metadata_address(&mint), metadata_address(&Pubkey::new_unique()));
    }
}
