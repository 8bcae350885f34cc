use alloy_network::EthereumWallet;
use alloy_primitives::{Address, TxHash};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use url::Url;

use crate::{WalletError, WalletEvent, WalletProvider, utils::create_private_key_signer};

/// A wallet backed by private keys held in this process.
///
/// Behaves like an extension that holds several accounts: nothing is authorized until
/// [`request_accounts`](WalletProvider::request_accounts) is called, which authorizes the first
/// key. [`switch_account`](Self::switch_account) and [`revoke`](Self::revoke) emit
/// `accountsChanged` like a user switching or disconnecting accounts in the extension would.
#[derive(Debug)]
pub struct LocalWallet {
    signers: Vec<PrivateKeySigner>,
    provider: DynProvider,
    /// Index of the active signer, `None` while unauthorized.
    active: Mutex<Option<usize>>,
    events: broadcast::Sender<WalletEvent>,
}

impl LocalWallet {
    /// Creates a wallet submitting through the node at `rpc_url`.
    pub fn new(signers: Vec<PrivateKeySigner>, rpc_url: Url) -> Result<Self, WalletError> {
        Self::with_provider(signers, |wallet| {
            ProviderBuilder::new().wallet(wallet).connect_http(rpc_url).erased()
        })
    }

    /// Creates a wallet submitting through the provider `connect` builds around the signers.
    fn with_provider(
        signers: Vec<PrivateKeySigner>,
        connect: impl FnOnce(EthereumWallet) -> DynProvider,
    ) -> Result<Self, WalletError> {
        let (first, rest) = signers.split_first().ok_or(WalletError::NoSigners)?;
        let mut wallet = EthereumWallet::new(first.clone());
        for signer in rest {
            wallet.register_signer(signer.clone());
        }
        let provider = connect(wallet);
        let (events, _) = broadcast::channel(16);
        Ok(Self { signers, provider, active: Mutex::new(None), events })
    }

    /// Creates a wallet from hex encoded private keys.
    pub fn from_private_keys<S: AsRef<str>>(keys: &[S], rpc_url: Url) -> Result<Self, WalletError> {
        let signers = keys
            .iter()
            .map(|key| create_private_key_signer(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(signers, rpc_url)
    }

    /// All addresses held, authorized or not.
    pub fn addresses(&self) -> Vec<Address> {
        self.signers.iter().map(|s| s.address()).collect()
    }

    /// Makes the signer at `index` the active account.
    pub fn switch_account(&self, index: usize) -> Result<Address, WalletError> {
        let address = self
            .signers
            .get(index)
            .map(|s| s.address())
            .ok_or(WalletError::AccountIndex { index, len: self.signers.len() })?;
        self.set_active(Some(index));
        Ok(address)
    }

    /// Withdraws the authorization, like disconnecting the site in the extension.
    pub fn revoke(&self) {
        self.set_active(None);
    }

    fn active_accounts(&self) -> Vec<Address> {
        self.active.lock().map(|i| vec![self.signers[i].address()]).unwrap_or_default()
    }

    fn set_active(&self, index: Option<usize>) {
        let changed = {
            let mut active = self.active.lock();
            let changed = *active != index;
            *active = index;
            changed
        };
        if changed {
            let accounts = self.active_accounts();
            debug!(target: "wallets::local", ?accounts, "accounts changed");
            // no receivers is fine
            let _ = self.events.send(WalletEvent::AccountsChanged(accounts));
        }
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.active_accounts())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.active.lock().is_none() {
            self.set_active(Some(0));
        }
        Ok(self.active_accounts())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        let from = tx.from.ok_or(WalletError::MissingSender)?;
        if !self.active_accounts().contains(&from) {
            return Err(WalletError::UnknownAccount(from));
        }
        let pending = self.provider.send_transaction(tx).await?;
        let hash = *pending.tx_hash();
        debug!(target: "wallets::local", %hash, %from, "submitted transaction");
        Ok(hash)
    }
}
