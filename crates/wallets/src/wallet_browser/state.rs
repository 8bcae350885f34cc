use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    WalletEvent,
    wallet_browser::{
        queue::RequestQueue,
        types::{AccountsRequest, AccountsResponse, BrowserTransaction, Connection, TransactionResponse},
    },
};

#[derive(Debug, Clone)]
pub(crate) struct BrowserWalletState {
    /// Current information about the wallet connection.
    connection: Arc<Mutex<Option<Connection>>>,
    /// Whether the bridge page found an injected provider, once it reported.
    installed: Arc<Mutex<Option<bool>>>,
    /// Request/response queue for account authorizations.
    accounts: Arc<Mutex<RequestQueue<AccountsRequest, AccountsResponse>>>,
    /// Request/response queue for transactions.
    transactions: Arc<Mutex<RequestQueue<BrowserTransaction, TransactionResponse>>>,
    /// Provider events forwarded by the bridge page.
    events: broadcast::Sender<WalletEvent>,
    /// Token the bridge page has to present on every API call.
    session_token: Arc<String>,
}

impl Default for BrowserWalletState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserWalletState {
    /// Create a new browser wallet state.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            connection: Arc::new(Mutex::new(None)),
            installed: Arc::new(Mutex::new(None)),
            accounts: Arc::new(Mutex::new(RequestQueue::new())),
            transactions: Arc::new(Mutex::new(RequestQueue::new())),
            events,
            session_token: Arc::new(Uuid::new_v4().simple().to_string()),
        }
    }

    pub fn session_token(&self) -> Arc<String> {
        self.session_token.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    /// Check if wallet is connected.
    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    /// Get current connection information.
    pub fn get_connection(&self) -> Option<Connection> {
        *self.connection.lock()
    }

    /// Set connection information, emitting `accountsChanged` / `chainChanged` on changes.
    pub fn set_connection(&self, connection: Option<Connection>) {
        let previous = std::mem::replace(&mut *self.connection.lock(), connection);

        let address = connection.map(|c| c.address);
        if previous.map(|c| c.address) != address {
            let _ = self.events.send(WalletEvent::AccountsChanged(address.into_iter().collect()));
        }
        if let (Some(prev), Some(next)) = (previous, connection)
            && prev.chain_id != next.chain_id
        {
            let _ = self.events.send(WalletEvent::ChainChanged(next.chain_id));
        }
    }

    /// Presence of the injected provider, `None` until the page reported.
    pub fn installed(&self) -> Option<bool> {
        *self.installed.lock()
    }

    pub fn set_installed(&self, installed: bool) {
        *self.installed.lock() = Some(installed);
    }

    /// Add an account request.
    pub fn add_accounts_request(&self, request: AccountsRequest) {
        self.accounts.lock().add_request(request);
    }

    pub fn has_accounts_request(&self, id: &Uuid) -> bool {
        self.accounts.lock().has_request(id)
    }

    pub fn read_next_accounts_request(&self) -> Option<AccountsRequest> {
        self.accounts.lock().read_request().copied()
    }

    pub fn remove_accounts_request(&self, id: &Uuid) {
        self.accounts.lock().remove_request(id);
    }

    pub fn add_accounts_response(&self, response: AccountsResponse) {
        let id = response.id;
        let mut accounts = self.accounts.lock();
        accounts.add_response(id, response);
        accounts.remove_request(&id);
    }

    pub fn get_accounts_response(&self, id: &Uuid) -> Option<AccountsResponse> {
        self.accounts.lock().get_response(id)
    }

    /// Add a transaction request.
    pub fn add_transaction_request(&self, request: BrowserTransaction) {
        self.transactions.lock().add_request(request);
    }

    /// Check if a transaction request exists.
    pub fn has_transaction_request(&self, id: &Uuid) -> bool {
        self.transactions.lock().has_request(id)
    }

    /// Read the next transaction request.
    pub fn read_next_transaction_request(&self) -> Option<BrowserTransaction> {
        self.transactions.lock().read_request().cloned()
    }

    // Remove a transaction request.
    pub fn remove_transaction_request(&self, id: &Uuid) {
        self.transactions.lock().remove_request(id);
    }

    /// Add transaction response.
    pub fn add_transaction_response(&self, response: TransactionResponse) {
        let id = response.id;
        let mut transactions = self.transactions.lock();
        transactions.add_response(id, response);
        transactions.remove_request(&id);
    }

    /// Get transaction response, removing it from the queue.
    pub fn get_transaction_response(&self, id: &Uuid) -> Option<TransactionResponse> {
        self.transactions.lock().get_response(id)
    }
}
