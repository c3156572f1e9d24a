//! Error types for the BorkChain client.

use bork_core::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("No wallet detected. Install a wallet extension to continue")]
    Unavailable,

    #[error("Wallet returned no accounts")]
    NoAccounts,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("Connect your wallet first")]
    NotConnected,

    #[error("Backend error ({status}, {code}): {message}")]
    Backend {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
