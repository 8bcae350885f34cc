use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use alloy_primitives::{Address, TxHash};
use parking_lot::Mutex;
use tokio::{
    net::TcpListener,
    sync::{broadcast, oneshot},
};
use uuid::Uuid;

use crate::{
    WalletEvent,
    wallet_browser::{
        error::BrowserWalletError,
        router::build_router,
        state::BrowserWalletState,
        types::{AccountsRequest, BrowserTransaction, Connection},
    },
};

/// How often pending requests check for an answer from the bridge page.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Local HTTP server bridging this process and the bridge page running in the browser.
///
/// The page talks to the injected provider and polls the server for queued requests; callers of
/// [`request_accounts`](Self::request_accounts) and
/// [`request_transaction`](Self::request_transaction) wait until the page answers or the timeout
/// elapses.
#[derive(Debug, Clone)]
pub struct BrowserWalletServer {
    port: u16,
    timeout: Duration,
    state: Arc<BrowserWalletState>,
    shutdown: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl BrowserWalletServer {
    /// Creates a server for `port`, `0` picks a free port on [`start`](Self::start).
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self {
            port,
            timeout,
            state: Arc::new(BrowserWalletState::new()),
            shutdown: Arc::new(Mutex::new(None)),
        }
    }

    /// The bound port, once started.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL of the bridge page.
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Token the bridge page sends along with every API call.
    pub fn session_token(&self) -> String {
        self.state.session_token().to_string()
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.lock().is_some()
    }

    /// Binds the listener and serves in the background.
    pub async fn start(&mut self) -> Result<(), BrowserWalletError> {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, self.port))).await?;
        self.port = listener.local_addr()?.port();

        let (tx, rx) = oneshot::channel::<()>();
        *self.shutdown.lock() = Some(tx);

        let router = build_router(self.state.clone());
        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(err) = server.await {
                error!(target: "wallets::browser", %err, "browser wallet server failed");
            }
        });

        debug!(target: "wallets::browser", url = %self.url(), "browser wallet server started");
        Ok(())
    }

    /// Stops serving. Pending requests run into their timeout.
    pub async fn stop(&mut self) -> Result<(), BrowserWalletError> {
        let tx = self.shutdown.lock().take().ok_or(BrowserWalletError::NotRunning)?;
        let _ = tx.send(());
        debug!(target: "wallets::browser", "browser wallet server stopped");
        Ok(())
    }

    /// Check if a wallet is connected.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Get the current connection, if any.
    pub fn get_connection(&self) -> Option<Connection> {
        self.state.get_connection()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.state.subscribe()
    }

    /// Waits for the bridge page to report whether an injected provider exists.
    pub async fn wait_for_provider(&self, timeout: Duration) -> Result<bool, BrowserWalletError> {
        let state = self.state.clone();
        poll_until(timeout, "Wallet detection", move || state.installed()).await
    }

    /// Asks the bridge page to run `eth_requestAccounts`.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, BrowserWalletError> {
        let id = Uuid::new_v4();
        self.state.add_accounts_request(AccountsRequest { id });

        let state = self.state.clone();
        let response =
            match poll_until(self.timeout, "Account request", move || state.get_accounts_response(&id))
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    self.state.remove_accounts_request(&id);
                    return Err(err);
                }
            };

        match (response.accounts, response.error) {
            (_, Some(reason)) => Err(BrowserWalletError::Rejected { operation: "Account request", reason }),
            (Some(accounts), None) => Ok(accounts),
            (None, None) => Err(BrowserWalletError::InvalidResponse(
                "account response carries neither accounts nor error".to_string(),
            )),
        }
    }

    /// Queues `tx` for `eth_sendTransaction` and waits for the hash.
    pub(crate) async fn request_transaction(
        &self,
        tx: BrowserTransaction,
    ) -> Result<TxHash, BrowserWalletError> {
        if !self.is_connected() {
            return Err(BrowserWalletError::NotConnected);
        }

        let id = tx.id;
        self.state.add_transaction_request(tx);

        let state = self.state.clone();
        let response =
            match poll_until(self.timeout, "Transaction", move || state.get_transaction_response(&id))
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    self.state.remove_transaction_request(&id);
                    return Err(err);
                }
            };

        match (response.hash, response.error) {
            (_, Some(reason)) => Err(BrowserWalletError::Rejected { operation: "Transaction", reason }),
            (Some(hash), None) => Ok(hash),
            (None, None) => Err(BrowserWalletError::InvalidResponse(
                "transaction response carries neither hash nor error".to_string(),
            )),
        }
    }
}

async fn poll_until<T>(
    timeout: Duration,
    operation: &'static str,
    mut check: impl FnMut() -> Option<T>,
) -> Result<T, BrowserWalletError> {
    let wait = async {
        loop {
            if let Some(value) = check() {
                return value;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(timeout, wait).await.map_err(|_| BrowserWalletError::Timeout { operation })
}
