//! Client for the deployed bank contract.

use std::{fmt, sync::Arc, time::Duration};

use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use ntc_wallets::WalletProvider;

use crate::error::BankError;

sol! {
    /// Call interface of the NTC Bank contract.
    interface INTCBank {
        function balances(address owner) external view returns (uint256);
        function deposit() external payable;
        function withdraw(uint256 amount) external;
        function transfer(address to, uint256 amount) external;
    }
}

/// A contract client bound to one session account.
///
/// Mutating calls resolve once the transaction is confirmed.
#[async_trait]
pub trait BankApi: fmt::Debug + Send + Sync {
    /// Address of the contract.
    fn address(&self) -> Address;

    /// Account the mutating calls are sent from.
    fn account(&self) -> Address;

    /// Reads `balances(owner)`.
    async fn balance_of(&self, owner: Address) -> Result<U256, BankError>;

    /// Calls `deposit()` attaching `value` wei.
    async fn deposit(&self, value: U256) -> Result<TxHash, BankError>;

    async fn withdraw(&self, amount: U256) -> Result<TxHash, BankError>;

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash, BankError>;
}

/// Creates contract clients for a wallet and the account it authorized.
pub trait Binder: fmt::Debug + Send + Sync {
    fn bind(&self, wallet: Arc<dyn WalletProvider>, account: Address) -> Arc<dyn BankApi>;
}

/// Binds [`BankContract`]s reading through a JSON-RPC provider.
#[derive(Clone, Debug)]
pub struct RpcBinder {
    provider: DynProvider,
    contract: Address,
    confirmations: u64,
    timeout: Option<Duration>,
}

impl RpcBinder {
    pub fn new(provider: DynProvider, contract: Address) -> Self {
        Self { provider, contract, confirmations: 1, timeout: None }
    }

    /// Sets the number of confirmations to wait for after submitting.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Gives up waiting for a receipt after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Binder for RpcBinder {
    fn bind(&self, wallet: Arc<dyn WalletProvider>, account: Address) -> Arc<dyn BankApi> {
        debug!(target: "bank::contract", contract = %self.contract, %account, wallet = wallet.name(), "binding contract");
        Arc::new(BankContract {
            provider: self.provider.clone(),
            wallet,
            address: self.contract,
            account,
            confirmations: self.confirmations,
            timeout: self.timeout,
        })
    }
}

/// The bank contract at a fixed address, signed for by a wallet.
///
/// Reads go through `eth_call` on the provider, writes are handed to the wallet and then awaited
/// on the provider.
pub struct BankContract {
    provider: DynProvider,
    wallet: Arc<dyn WalletProvider>,
    address: Address,
    account: Address,
    confirmations: u64,
    timeout: Option<Duration>,
}

impl fmt::Debug for BankContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankContract")
            .field("address", &self.address)
            .field("account", &self.account)
            .field("wallet", &self.wallet.name())
            .finish_non_exhaustive()
    }
}

impl BankContract {
    async fn send<C: SolCall>(&self, call: C, value: U256) -> Result<TxHash, BankError> {
        let mut tx = TransactionRequest::default()
            .from(self.account)
            .to(self.address)
            .input(TransactionInput::both(call.abi_encode().into()));
        if !value.is_zero() {
            tx = tx.value(value);
        }

        let hash = self.wallet.send_transaction(tx).await?;
        debug!(target: "bank::contract", %hash, method = C::SIGNATURE, "waiting for confirmation");

        let receipt = match self.provider.get_transaction_receipt(hash).await? {
            Some(receipt) if self.confirmations <= 1 => receipt,
            _ => {
                PendingTransactionBuilder::new(self.provider.root().clone(), hash)
                    .with_required_confirmations(self.confirmations)
                    .with_timeout(self.timeout)
                    .get_receipt()
                    .await?
            }
        };
        if !receipt.status() {
            return Err(BankError::Reverted(hash));
        }

        info!(target: "bank::contract", %hash, method = C::SIGNATURE, "transaction confirmed");
        Ok(hash)
    }
}

#[async_trait]
impl BankApi for BankContract {
    fn address(&self) -> Address {
        self.address
    }

    fn account(&self) -> Address {
        self.account
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, BankError> {
        let tx = TransactionRequest::default()
            .to(self.address)
            .input(TransactionInput::new(INTCBank::balancesCall { owner }.abi_encode().into()));
        let output = self.provider.call(tx).await?;
        Ok(INTCBank::balancesCall::abi_decode_returns(&output)?)
    }

    async fn deposit(&self, value: U256) -> Result<TxHash, BankError> {
        self.send(INTCBank::depositCall {}, value).await
    }

    async fn withdraw(&self, amount: U256) -> Result<TxHash, BankError> {
        self.send(INTCBank::withdrawCall { amount }, U256::ZERO).await
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash, BankError> {
        self.send(INTCBank::transferCall { to, amount }, U256::ZERO).await
    }
}
