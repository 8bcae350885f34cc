use std::fmt;

use alloy_primitives::{Address, ChainId, TxHash};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::WalletError;

/// Events pushed by a wallet, mirroring the EIP-1193 provider events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// `accountsChanged`: the authorized accounts, first one active. Empty when the user
    /// disconnected or locked the wallet.
    AccountsChanged(Vec<Address>),
    /// `chainChanged`
    ChainChanged(ChainId),
}

/// The request side of an injected EIP-1193 provider.
#[async_trait]
pub trait WalletProvider: fmt::Debug + Send + Sync {
    /// Human readable backend name, for logs.
    fn name(&self) -> &'static str;

    /// `eth_accounts`: accounts already authorized, without prompting the user.
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// `eth_requestAccounts`: asks the user to authorize accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Subscribes to wallet events.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;

    /// `eth_sendTransaction`: signs and submits `tx`, returning its hash once broadcast.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError>;
}
