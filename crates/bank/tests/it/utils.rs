//! In-memory wallet and bank doubles.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy_primitives::{Address, TxHash, U256, address};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use ntc_bank::{BankApi, BankError, Binder, SessionController, SessionOptions};
use ntc_config::Variant;
use ntc_wallets::{BrowserWalletError, WalletError, WalletEvent, WalletProvider};
use parking_lot::Mutex;
use tokio::sync::broadcast;

pub const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const CONTRACT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

pub const ETHER: u128 = 1_000_000_000_000_000_000;

pub fn ether(amount: u128) -> U256 {
    U256::from(amount * ETHER)
}

fn rejected() -> WalletError {
    BrowserWalletError::Rejected {
        operation: "Transaction",
        reason: "User rejected the request.".to_string(),
    }
    .into()
}

/// A wallet extension holding a fixed set of accounts.
#[derive(Debug)]
pub struct MockWallet {
    accounts: Vec<Address>,
    authorized: Mutex<Vec<Address>>,
    reject: AtomicBool,
    events: broadcast::Sender<WalletEvent>,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts,
            authorized: Mutex::default(),
            reject: AtomicBool::new(false),
            events,
        })
    }

    /// A wallet that already authorized this site in an earlier visit.
    pub fn authorized(accounts: Vec<Address>) -> Arc<Self> {
        let wallet = Self::new(accounts.clone());
        *wallet.authorized.lock() = accounts;
        wallet
    }

    /// Makes the user decline every following account request.
    pub fn reject_requests(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    /// Simulates the user switching or disconnecting accounts in the extension.
    pub fn emit_accounts(&self, accounts: Vec<Address>) {
        *self.authorized.lock() = accounts.clone();
        let _ = self.events.send(WalletEvent::AccountsChanged(accounts));
    }

    /// Simulates the user switching networks in the extension.
    pub fn emit_chain(&self, chain_id: u64) {
        let _ = self.events.send(WalletEvent::ChainChanged(chain_id));
    }

    pub fn subscribers(&self) -> usize {
        self.events.receiver_count()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.authorized.lock().clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(BrowserWalletError::Rejected {
                operation: "Account request",
                reason: "User rejected the request.".to_string(),
            }
            .into());
        }
        *self.authorized.lock() = self.accounts.clone();
        Ok(self.accounts.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    async fn send_transaction(&self, _tx: TransactionRequest) -> Result<TxHash, WalletError> {
        Err(WalletError::MissingSender)
    }
}

/// Balances of the bank contract, kept in memory.
#[derive(Debug, Default)]
pub struct Ledger {
    balances: Mutex<HashMap<Address, U256>>,
    fail_next: AtomicBool,
    binds: AtomicUsize,
    nonce: AtomicU64,
}

impl Ledger {
    pub fn new() -> Arc<Self> {
        Arc::default()
    }

    pub fn with_balances(balances: impl IntoIterator<Item = (Address, U256)>) -> Arc<Self> {
        let ledger = Self::new();
        ledger.balances.lock().extend(balances);
        ledger
    }

    pub fn balance(&self, owner: Address) -> U256 {
        self.balances.lock().get(&owner).copied().unwrap_or_default()
    }

    /// Changes a balance behind the session's back.
    pub fn set_balance(&self, owner: Address, value: U256) {
        self.balances.lock().insert(owner, value);
    }

    /// Makes the user decline the next transaction.
    pub fn reject_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// How many clients were bound so far.
    pub fn binds(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }

    fn next_hash(&self) -> TxHash {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst) + 1;
        TxHash::left_padding_from(&nonce.to_be_bytes())
    }

    fn submit(
        &self,
        apply: impl FnOnce(&mut HashMap<Address, U256>) -> bool,
    ) -> Result<TxHash, BankError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(rejected().into());
        }
        let hash = self.next_hash();
        if apply(&mut self.balances.lock()) { Ok(hash) } else { Err(BankError::Reverted(hash)) }
    }
}

#[derive(Debug)]
pub struct MockBinder {
    pub ledger: Arc<Ledger>,
}

impl Binder for MockBinder {
    fn bind(&self, _wallet: Arc<dyn WalletProvider>, account: Address) -> Arc<dyn BankApi> {
        self.ledger.binds.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockBank { ledger: self.ledger.clone(), account })
    }
}

#[derive(Debug)]
pub struct MockBank {
    ledger: Arc<Ledger>,
    account: Address,
}

#[async_trait]
impl BankApi for MockBank {
    fn address(&self) -> Address {
        CONTRACT
    }

    fn account(&self) -> Address {
        self.account
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, BankError> {
        Ok(self.ledger.balance(owner))
    }

    async fn deposit(&self, value: U256) -> Result<TxHash, BankError> {
        let account = self.account;
        self.ledger.submit(|balances| {
            *balances.entry(account).or_default() += value;
            true
        })
    }

    async fn withdraw(&self, amount: U256) -> Result<TxHash, BankError> {
        let account = self.account;
        self.ledger.submit(|balances| {
            let balance = balances.entry(account).or_default();
            match balance.checked_sub(amount) {
                Some(rest) => {
                    *balance = rest;
                    true
                }
                None => false,
            }
        })
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash, BankError> {
        let account = self.account;
        self.ledger.submit(|balances| {
            let from = balances.get(&account).copied().unwrap_or_default();
            let Some(rest) = from.checked_sub(amount) else { return false };
            balances.insert(account, rest);
            *balances.entry(to).or_default() += amount;
            true
        })
    }
}

pub fn options(variant: Variant) -> SessionOptions {
    SessionOptions { variant, ..Default::default() }
}

/// A controller over `wallet` and `ledger`.
pub fn controller(
    wallet: Option<Arc<MockWallet>>,
    ledger: &Arc<Ledger>,
    variant: Variant,
) -> SessionController {
    let wallet = wallet.map(|wallet| wallet as Arc<dyn WalletProvider>);
    SessionController::new(wallet, Arc::new(MockBinder { ledger: ledger.clone() }), options(variant))
}

/// Waits for background work to make `check` true.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
