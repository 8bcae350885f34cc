use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use alloy_primitives::{Address, TxHash, U256};
use ntc_config::{Config, Variant};
use ntc_wallets::{WalletEvent, WalletProvider};
use parking_lot::Mutex;
use tokio::{
    sync::{Notify, broadcast::error::RecvError},
    task::JoinSet,
};

use crate::{
    contract::{BankApi, Binder},
    error::{AmountError, SessionError},
    session::{BalanceSnapshot, Forms, Notice, Session},
    units::parse_ether,
    view::Panel,
};

/// Behaviour knobs of a [`SessionController`].
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub variant: Variant,
    /// How long a looked up balance stays visible.
    pub lookup_display: Duration,
    pub install_url: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            variant: config.variant,
            lookup_display: config.lookup_display(),
            install_url: config.install_url.clone(),
        }
    }
}

/// Drives one bank session: wallet detection, account, contract binding, balances and the
/// mutating calls.
///
/// Every action locks the session only briefly and never across an await, so actions may run
/// concurrently. Background work (the `accountsChanged` watcher, lookup timers) is aborted when
/// the controller is dropped.
#[derive(Debug)]
pub struct SessionController {
    inner: Arc<Inner>,
    tasks: Mutex<JoinSet<()>>,
    mounted: AtomicBool,
}

#[derive(Debug)]
struct Inner {
    session: Mutex<Session>,
    wallet: Option<Arc<dyn WalletProvider>>,
    binder: Arc<dyn Binder>,
    options: SessionOptions,
    changed: Notify,
}

impl SessionController {
    /// Creates a controller. `wallet` is `None` when no wallet extension was detected.
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        binder: Arc<dyn Binder>,
        options: SessionOptions,
    ) -> Self {
        let session = Session::new(wallet.is_some());
        let inner = Inner { session: Mutex::new(session), wallet, binder, options, changed: Notify::new() };
        Self {
            inner: Arc::new(inner),
            tasks: Mutex::new(JoinSet::new()),
            mounted: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }

    /// Initial load: starts watching the wallet for account changes.
    ///
    /// [`Variant::Atm`] adopts an account the wallet already authorized, [`Variant::Bank`] asks the
    /// user to connect. Only the first call does anything.
    pub async fn mount(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            trace!(target: "bank::session", "already mounted");
            return;
        }
        let Some(wallet) = self.inner.wallet.clone() else {
            debug!(target: "bank::session", "no wallet detected");
            return;
        };
        debug!(target: "bank::session", wallet = wallet.name(), variant = %self.inner.options.variant, "wallet detected");

        let events = wallet.subscribe();
        let inner = self.inner.clone();
        self.spawn(async move { inner.watch(events).await });

        if self.inner.options.variant.adopts_authorized_account() {
            match wallet.accounts().await {
                Ok(accounts) if !accounts.is_empty() => self.inner.handle_accounts(accounts).await,
                Ok(_) => debug!(target: "bank::session", "no account authorized yet"),
                Err(err) => warn!(target: "bank::session", %err, "failed to read authorized accounts"),
            }
        } else if !self.inner.session.lock().state.is_connected() {
            self.inner.notice(Notice::ConnectWallet);
        }
    }

    /// Asks the wallet for an account, adopts the first one and binds the contract to it.
    pub async fn connect(&self) -> Result<Address, SessionError> {
        let Some(wallet) = self.inner.wallet.clone() else {
            self.inner.notice(Notice::WalletRequired);
            return Err(SessionError::NoWallet);
        };

        let accounts = wallet.request_accounts().await.inspect_err(|err| {
            warn!(target: "bank::session", %err, "account connection failed");
        })?;
        let Some(&account) = accounts.first() else {
            warn!(target: "bank::session", "no account found");
            return Err(SessionError::NoAccount);
        };

        info!(target: "bank::session", %account, "account connected");
        self.inner.adopt(account);
        self.inner.refresh_logged().await;
        Ok(account)
    }

    /// Binds a fresh contract client to the session account, replacing the previous one.
    pub fn bind_contract(&self) -> Result<(), SessionError> {
        let account = self.inner.session.lock().state.account();
        match account {
            Some(account) => {
                self.inner.adopt(account);
                Ok(())
            }
            None if self.inner.wallet.is_none() => Err(SessionError::NoWallet),
            None => {
                if self.inner.options.variant.alerts_without_account() {
                    self.inner.notice(Notice::ConnectWallet);
                }
                Err(SessionError::NotConnected)
            }
        }
    }

    /// Refreshes the balance of the session account, or looks up `address`.
    ///
    /// A looked up balance is shown for the configured window, then cleared. The lookup field is
    /// cleared either way.
    pub async fn refresh_balance(&self, address: Option<Address>) -> Result<U256, SessionError> {
        match address {
            None => self.inner.refresh().await,
            Some(address) => {
                let result = self.look_up(address).await;
                self.inner.session.lock().forms.lookup_address.clear();
                result
            }
        }
    }

    /// Looks up the balance of the address in the lookup field.
    pub async fn check_balance(&self) -> Result<U256, SessionError> {
        let input = {
            let session = self.inner.session.lock();
            session.client()?;
            session.forms.lookup_address.trim().to_string()
        };
        if input.is_empty() {
            return Err(SessionError::EmptyInput("lookup address"));
        }
        let address = match input.parse::<Address>() {
            Ok(address) => address,
            Err(_) => {
                self.inner.session.lock().forms.lookup_address.clear();
                warn!(target: "bank::session", %input, "error fetching balance: invalid address");
                return Err(SessionError::InvalidAddress(input));
            }
        };
        self.refresh_balance(Some(address)).await
    }

    /// Deposits the amount in the deposit field.
    pub async fn deposit(&self) -> Result<TxHash, SessionError> {
        let (client, amount) = self.inner.prepare(|forms| &forms.deposit_amount, "deposit amount")?;
        let hash = self.inner.logged("depositing funds", client.deposit(amount)).await?;
        self.inner.session.lock().forms.deposit_amount.clear();
        self.inner.refresh_logged().await;
        Ok(hash)
    }

    /// Withdraws the amount in the withdraw field.
    pub async fn withdraw(&self) -> Result<TxHash, SessionError> {
        let (client, amount) =
            self.inner.prepare(|forms| &forms.withdraw_amount, "withdraw amount")?;
        let hash = self.inner.logged("withdrawing funds", client.withdraw(amount)).await?;
        self.inner.session.lock().forms.withdraw_amount.clear();
        self.inner.refresh_logged().await;
        Ok(hash)
    }

    /// Transfers the amount in the transfer field to the recipient field.
    pub async fn transfer(&self) -> Result<TxHash, SessionError> {
        if !self.inner.options.variant.supports_transfer() {
            return Err(SessionError::Unsupported("transfer"));
        }
        let (client, amount, recipient) = {
            let session = self.inner.session.lock();
            match session.client() {
                Ok(client) => (
                    client,
                    session.forms.transfer_amount.clone(),
                    session.forms.transfer_recipient.clone(),
                ),
                Err(err) => {
                    drop(session);
                    self.inner.notice(Notice::BankNotConnected);
                    return Err(err);
                }
            }
        };

        let amount = parse_field(&amount, "transfer amount")?;
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(SessionError::EmptyInput("recipient address"));
        }
        let recipient = recipient
            .parse::<Address>()
            .map_err(|_| SessionError::InvalidAddress(recipient.to_string()))?;

        let hash = self.inner.logged("transfer", client.transfer(recipient, amount)).await?;
        self.inner.refresh_logged().await;
        {
            let mut session = self.inner.session.lock();
            session.forms.transfer_amount.clear();
            session.forms.transfer_recipient.clear();
        }
        Ok(hash)
    }

    /// Resets the session locally. Wallet permissions are left alone.
    pub fn disconnect(&self) {
        self.inner.session.lock().reset();
        info!(target: "bank::session", "disconnected");
        if self.inner.options.variant.alerts_without_account() && self.inner.wallet.is_some() {
            self.inner.notice(Notice::ConnectWallet);
        }
    }

    /// Masks or unmasks the own address, returning whether it is now shown.
    pub fn toggle_address(&self) -> Result<bool, SessionError> {
        if !self.inner.options.variant.supports_masking() {
            return Err(SessionError::Unsupported("address masking"));
        }
        let mut session = self.inner.session.lock();
        session.show_address = !session.show_address;
        Ok(session.show_address)
    }

    /// Applies an `accountsChanged` notification.
    pub async fn handle_accounts(&self, accounts: Vec<Address>) {
        self.inner.handle_accounts(accounts).await
    }

    pub fn set_deposit_amount(&self, amount: impl Into<String>) {
        self.inner.session.lock().forms.deposit_amount = amount.into();
    }

    pub fn set_withdraw_amount(&self, amount: impl Into<String>) {
        self.inner.session.lock().forms.withdraw_amount = amount.into();
    }

    pub fn set_lookup_address(&self, address: impl Into<String>) {
        self.inner.session.lock().forms.lookup_address = address.into();
    }

    pub fn set_transfer_amount(&self, amount: impl Into<String>) {
        self.inner.session.lock().forms.transfer_amount = amount.into();
    }

    pub fn set_transfer_recipient(&self, recipient: impl Into<String>) {
        self.inner.session.lock().forms.transfer_recipient = recipient.into();
    }

    pub fn forms(&self) -> Forms {
        self.inner.session.lock().forms.clone()
    }

    pub fn is_wallet_detected(&self) -> bool {
        self.inner.wallet.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.inner.session.lock().state.account()
    }

    pub fn client(&self) -> Option<Arc<dyn BankApi>> {
        self.inner.session.lock().state.client().cloned()
    }

    /// Last known balance of the session account.
    pub fn balance(&self) -> Option<U256> {
        let session = self.inner.session.lock();
        session.balance.filter(|b| Some(b.address) == session.state.account()).map(|b| b.value)
    }

    /// The looked up balance currently on display.
    pub fn lookup(&self) -> Option<BalanceSnapshot> {
        self.inner.session.lock().lookup
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        self.inner.session.lock().take_notices()
    }

    pub fn panel(&self) -> Panel {
        let session = self.inner.session.lock();
        Panel::new(&session, self.inner.options.variant, &self.inner.options.install_url)
    }

    /// Resolves when background work changed the session: a wallet event was applied, a lookup
    /// expired or a notice was raised.
    pub async fn changed(&self) {
        self.inner.changed.notified().await
    }

    async fn look_up(&self, address: Address) -> Result<U256, SessionError> {
        let client = self.inner.session.lock().client()?;
        let value = self.inner.logged("fetching balance", client.balance_of(address)).await?;

        let generation = {
            let mut session = self.inner.session.lock();
            // the session moved on while the call was in flight
            if session.state.account() != Some(client.account()) {
                return Err(SessionError::AccountChanged);
            }
            let generation = session.begin_lookup();
            session.lookup = Some(BalanceSnapshot { address, value });
            generation
        };
        debug!(target: "bank::session", %address, %value, generation, "showing looked up balance");

        let inner = self.inner.clone();
        let window = self.inner.options.lookup_display;
        self.spawn(async move {
            tokio::time::sleep(window).await;
            if inner.session.lock().expire_lookup(generation) {
                trace!(target: "bank::session", generation, "looked up balance expired");
                inner.changed.notify_one();
            }
        });
        Ok(value)
    }

    fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) {
        let mut tasks = self.tasks.lock();
        // reap finished timers
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }
}

impl Inner {
    async fn watch(self: Arc<Self>, mut events: tokio::sync::broadcast::Receiver<WalletEvent>) {
        loop {
            match events.recv().await {
                Ok(WalletEvent::AccountsChanged(accounts)) => {
                    self.handle_accounts(accounts).await;
                    self.changed.notify_one();
                }
                Ok(WalletEvent::ChainChanged(chain_id)) => {
                    debug!(target: "bank::session", chain_id, "chain changed");
                    if self.session.lock().state.is_connected() {
                        self.refresh_logged().await;
                        self.changed.notify_one();
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "bank::session", skipped, "missed wallet events");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!(target: "bank::session", "wallet event stream closed");
    }

    async fn handle_accounts(&self, accounts: Vec<Address>) {
        match accounts.first() {
            Some(&account) => {
                info!(target: "bank::session", %account, "account connected");
                self.adopt(account);
                self.refresh_logged().await;
            }
            None => {
                info!(target: "bank::session", "no account found");
                let was_connected = {
                    let mut session = self.session.lock();
                    let was_connected = session.state.is_connected();
                    if was_connected {
                        session.reset();
                    }
                    was_connected
                };
                if was_connected && self.options.variant.alerts_without_account() {
                    self.notice(Notice::ConnectWallet);
                }
            }
        }
    }

    /// Makes `account` the session account with a freshly bound client.
    fn adopt(&self, account: Address) {
        let Some(wallet) = self.wallet.clone() else { return };
        let client = self.binder.bind(wallet, account);
        self.session.lock().connect(account, client);
    }

    async fn refresh(&self) -> Result<U256, SessionError> {
        let client = self.session.lock().client()?;
        let account = client.account();
        let value = client.balance_of(account).await?;

        let mut session = self.session.lock();
        if session.state.account() != Some(account) {
            return Err(SessionError::AccountChanged);
        }
        session.balance = Some(BalanceSnapshot { address: account, value });
        trace!(target: "bank::session", %account, %value, "balance refreshed");
        Ok(value)
    }

    async fn refresh_logged(&self) {
        if let Err(err) = self.refresh().await {
            warn!(target: "bank::session", %err, "failed to refresh balance");
        }
    }

    /// Takes the bound client and the parsed amount of a form field.
    fn prepare(
        &self,
        field: impl FnOnce(&Forms) -> &String,
        name: &'static str,
    ) -> Result<(Arc<dyn BankApi>, U256), SessionError> {
        let (client, amount) = {
            let session = self.session.lock();
            (session.client()?, field(&session.forms).clone())
        };
        Ok((client, parse_field(&amount, name)?))
    }

    async fn logged<T>(
        &self,
        action: &'static str,
        call: impl Future<Output = Result<T, crate::error::BankError>>,
    ) -> Result<T, SessionError> {
        call.await.map_err(|err| {
            warn!(target: "bank::session", %err, "error {action}");
            SessionError::from(err)
        })
    }

    fn notice(&self, notice: Notice) {
        debug!(target: "bank::session", %notice, "notice");
        self.session.lock().push_notice(notice);
        self.changed.notify_one();
    }
}

fn parse_field(amount: &str, name: &'static str) -> Result<U256, SessionError> {
    match parse_ether(amount) {
        Err(AmountError::Empty) => Err(SessionError::EmptyInput(name)),
        result => Ok(result?),
    }
}
