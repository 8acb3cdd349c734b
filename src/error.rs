//! Error types for the sniper bot

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sniper bot
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Insecure keypair permissions: {0}")]
    InsecureKeypair(String),

    // RPC errors
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Websocket subscription failed: {0}")]
    Subscription(String),

    // Directory lookups
    #[error("Market not found: {0}")]
    MarketNotFound(String),

    // Raydium / OpenBook protocol errors
    #[error("Account decode failed: {0}")]
    AccountDecode(String),

    #[error("Invalid program address: {0}")]
    InvalidProgramAddress(String),

    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("Swap math overflow")]
    SwapOverflow,

    // Trading errors
    #[error("Transaction build failed: {0}")]
    TransactionBuild(String),

    #[error("Transaction signing failed: {0}")]
    Signing(String),

    // Jito errors
    #[error("Jito bundle submission failed: {0}")]
    JitoBundleSubmission(String),

    #[error("Jito tip account not found")]
    JitoTipAccountNotFound,

    // Filter errors
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),

    // Notification errors
    #[error("Notification delivery failed: {0}")]
    Notification(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("HTTP error: {0}")]
    Http(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Rpc(_)
                | Error::Subscription(_)
                | Error::QuoteUnavailable(_)
                | Error::JitoBundleSubmission(_)
                | Error::Http(_)
        )
    }

    /// Check if this error is a local failure that no retry can fix
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::MissingEnvVar(_)
                | Error::InvalidKeypair(_)
                | Error::InsecureKeypair(_)
                | Error::Signing(_)
                | Error::TransactionBuild(_)
        )
    }
}

// Conversion from solana_client errors
impl From<solana_client::client_error::ClientError> for Error {
    fn from(e: solana_client::client_error::ClientError) -> Self {
        Error::Rpc(e.to_string())
    }
}

impl From<solana_sdk::program_error::ProgramError> for Error {
    fn from(e: solana_sdk::program_error::ProgramError) -> Self {
        Error::AccountDecode(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::QuoteUnavailable("reserves".into()).is_retryable());
        assert!(Error::JitoBundleSubmission("rate limited".into()).is_retryable());
        assert!(!Error::Signing("missing signer".into()).is_retryable());
    }

    #[test]
    fn test_unrecoverable_classification() {
        assert!(Error::Signing("missing signer".into()).is_unrecoverable());
        assert!(Error::TransactionBuild("too large".into()).is_unrecoverable());
        assert!(!Error::Rpc("503".into()).is_unrecoverable());
    }
}
