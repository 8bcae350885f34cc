use alloy_primitives::{TxHash, utils::UnitsError};
use alloy_provider::PendingTransactionError;
use alloy_transport::TransportError;
use ntc_wallets::WalletError;

/// A decimal amount that can't be converted into wei.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount must not be negative: {0}")]
    Negative(String),
    #[error("amount {0} has more than 18 decimals")]
    TooPrecise(String),
    #[error("invalid amount {amount}: {source}")]
    Invalid {
        amount: String,
        #[source]
        source: UnitsError,
    },
}

/// Errors talking to the bank contract.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to decode contract response: {0}")]
    Decode(#[from] alloy_sol_types::Error),
    #[error("failed to confirm transaction: {0}")]
    Confirmation(#[from] PendingTransactionError),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
}

/// Why a session action did not go through.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no wallet extension detected, install one to use the bank")]
    NoWallet,
    #[error("connect your wallet first")]
    NotConnected,
    #[error("the wallet returned no accounts")]
    NoAccount,
    #[error("{0} is empty")]
    EmptyInput(&'static str),
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error("{0} is not available in this front-end")]
    Unsupported(&'static str),
    #[error("the session account changed while the request was in flight")]
    AccountChanged,
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Contract(#[from] BankError),
}

impl SessionError {
    /// Whether the user declined the request in the wallet.
    pub fn is_rejection(&self) -> bool {
        match self {
            Self::Wallet(err) | Self::Contract(BankError::Wallet(err)) => err.is_rejection(),
            _ => false,
        }
    }
}
