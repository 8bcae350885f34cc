use alloy_primitives::{Address, hex::FromHexError};
use alloy_transport::TransportError;

use crate::wallet_browser::error::BrowserWalletError;

#[derive(Debug, thiserror::Error)]
pub enum PrivateKeyError {
    #[error("Failed to create wallet from private key. Private key is invalid hex: {0}")]
    InvalidHex(#[from] FromHexError),
    #[error(
        "Failed to create wallet from private key. Invalid private key. But env var {0} exists. Is the `$` anchor missing?"
    )]
    ExistsAsEnvVar(String),
    #[error("Failed to create wallet from private key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error(transparent)]
    Browser(#[from] BrowserWalletError),
    #[error(transparent)]
    PrivateKey(#[from] PrivateKeyError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("at least one private key is required")]
    NoSigners,
    #[error("account {0} is not managed by this wallet")]
    UnknownAccount(Address),
    #[error("account index {index} out of range, wallet holds {len} accounts")]
    AccountIndex { index: usize, len: usize },
    #[error("transaction has no sender")]
    MissingSender,
}

impl WalletError {
    /// Whether the user declined the request in the wallet.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Browser(BrowserWalletError::Rejected { .. }))
    }
}
