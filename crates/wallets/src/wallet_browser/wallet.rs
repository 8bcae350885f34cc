use std::time::Duration;

use alloy_primitives::{Address, TxHash};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    WalletError, WalletEvent, WalletProvider,
    wallet_browser::{
        error::BrowserWalletError, server::BrowserWalletServer, types::BrowserTransaction,
    },
};

/// A browser extension wallet reached through the local bridge page.
///
/// Accounts and transactions are relayed to whatever provider the page finds injected as
/// `window.ethereum` (MetaMask and compatible extensions).
#[derive(Clone, Debug)]
pub struct BrowserWallet {
    server: BrowserWalletServer,
}

impl BrowserWallet {
    /// Starts the bridge server on `port`. Wallet prompts wait up to `timeout`.
    pub async fn spawn(port: u16, timeout: Duration) -> Result<Self, BrowserWalletError> {
        let mut server = BrowserWalletServer::new(port, timeout);
        server.start().await?;
        Ok(Self { server })
    }

    /// URL the user has to open in a browser with the extension installed.
    pub fn url(&self) -> String {
        self.server.url()
    }

    pub fn server(&self) -> &BrowserWalletServer {
        &self.server
    }

    /// Waits for the bridge page to load and report on the injected provider.
    ///
    /// Returns `None` when the browser has no wallet extension, or when the page did not report
    /// within `timeout`. The caller should then show the install prompt instead of a wallet.
    pub async fn detect(self, timeout: Duration) -> Result<Option<Self>, BrowserWalletError> {
        let installed = match self.server.wait_for_provider(timeout).await {
            Ok(installed) => installed,
            Err(BrowserWalletError::Timeout { .. }) => {
                debug!(target: "wallets::browser", ?timeout, "no wallet report from the bridge page");
                false
            }
            Err(err) => return Err(err),
        };
        debug!(target: "wallets::browser", installed, "wallet detection");
        Ok(installed.then_some(self))
    }

    /// Stops the bridge server.
    pub async fn shutdown(mut self) -> Result<(), BrowserWalletError> {
        self.server.stop().await
    }
}

#[async_trait]
impl WalletProvider for BrowserWallet {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.server.get_connection().map(|c| vec![c.address]).unwrap_or_default())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.server.request_accounts().await?)
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.server.subscribe()
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        let request = BrowserTransaction { id: Uuid::new_v4(), request: tx };
        let hash = self.server.request_transaction(request).await?;
        debug!(target: "wallets::browser", %hash, "transaction submitted by browser wallet");
        Ok(hash)
    }
}
