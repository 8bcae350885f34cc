use alloy_primitives::{Address, ChainId, TxHash};
use alloy_rpc_types::TransactionRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::wallet_browser::queue::Identified;

/// The account and chain the bridge page is connected with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub address: Address,
    pub chain_id: ChainId,
}

impl Connection {
    pub const fn new(address: Address, chain_id: ChainId) -> Self {
        Self { address, chain_id }
    }
}

/// Presence report of the injected provider, sent by the bridge page once loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProviderStatus {
    pub installed: bool,
}

/// A pending `eth_sendTransaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BrowserTransaction {
    pub id: Uuid,
    #[serde(flatten)]
    pub request: TransactionRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TransactionResponse {
    pub id: Uuid,
    pub hash: Option<TxHash>,
    pub error: Option<String>,
}

/// A pending `eth_requestAccounts`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct AccountsRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AccountsResponse {
    pub id: Uuid,
    pub accounts: Option<Vec<Address>>,
    pub error: Option<String>,
}

impl Identified for BrowserTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Identified for AccountsRequest {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Envelope of every API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub(crate) enum BrowserApiResponse<T> {
    Ok(T),
    Error { message: String },
}

impl<T> BrowserApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }
}
