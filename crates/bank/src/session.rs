//! Session state owned by the [`SessionController`](crate::SessionController).

use std::{fmt, sync::Arc};

use alloy_primitives::{Address, U256};

use crate::{contract::BankApi, error::SessionError};

/// Where the session stands with the wallet.
#[derive(Clone, Default)]
pub enum SessionState {
    /// No wallet extension was found.
    #[default]
    NoWallet,
    /// A wallet is available but no account is authorized for this session.
    Disconnected,
    /// An account is authorized and the contract is bound to it.
    Connected { account: Address, client: Arc<dyn BankApi> },
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWallet => f.write_str("NoWallet"),
            Self::Disconnected => f.write_str("Disconnected"),
            Self::Connected { account, .. } => {
                f.debug_struct("Connected").field("account", account).finish_non_exhaustive()
            }
        }
    }
}

impl SessionState {
    pub fn account(&self) -> Option<Address> {
        match self {
            Self::Connected { account, .. } => Some(*account),
            _ => None,
        }
    }

    pub fn client(&self) -> Option<&Arc<dyn BankApi>> {
        match self {
            Self::Connected { client, .. } => Some(client),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Pending user input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Forms {
    pub deposit_amount: String,
    pub withdraw_amount: String,
    pub lookup_address: String,
    pub transfer_amount: String,
    pub transfer_recipient: String,
}

impl Forms {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A balance read from the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub address: Address,
    pub value: U256,
}

/// Something the user has to be told about, outside of an action's result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Connecting needs a wallet extension.
    WalletRequired,
    /// No account is connected.
    ConnectWallet,
    /// The contract client is missing.
    BankNotConnected,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WalletRequired => "A wallet extension is required to connect",
            Self::ConnectWallet => "Please connect your wallet to interact with NTC Bank",
            Self::BankNotConnected => "NTC Bank is not connected",
        })
    }
}

/// Everything the front-end shows, in one place.
#[derive(Debug, Default)]
pub struct Session {
    pub state: SessionState,
    pub forms: Forms,
    /// Balance of the session account.
    pub balance: Option<BalanceSnapshot>,
    /// Balance of a looked up address, shown for a limited time.
    pub lookup: Option<BalanceSnapshot>,
    /// Bumped by every lookup and reset, so only the latest lookup's timer clears the display.
    pub lookup_generation: u64,
    /// Whether the own address is shown unmasked.
    pub show_address: bool,
    notices: Vec<Notice>,
}

impl Session {
    pub fn new(wallet_detected: bool) -> Self {
        let state = if wallet_detected { SessionState::Disconnected } else { SessionState::NoWallet };
        Self { state, show_address: true, ..Default::default() }
    }

    /// The bound client, or why there is none.
    pub fn client(&self) -> Result<Arc<dyn BankApi>, SessionError> {
        match &self.state {
            SessionState::NoWallet => Err(SessionError::NoWallet),
            SessionState::Disconnected => Err(SessionError::NotConnected),
            SessionState::Connected { client, .. } => Ok(client.clone()),
        }
    }

    /// Connects `account` through `client`, replacing any previous binding.
    pub fn connect(&mut self, account: Address, client: Arc<dyn BankApi>) {
        if self.state.account() != Some(account) {
            self.balance = None;
        }
        self.state = SessionState::Connected { account, client };
    }

    /// Forgets the account, the client, balances and input. Wallet detection is kept.
    pub fn reset(&mut self) {
        if self.state.is_connected() {
            self.state = SessionState::Disconnected;
        }
        self.forms = Forms::default();
        self.balance = None;
        self.lookup = None;
        self.lookup_generation += 1;
        self.show_address = true;
    }

    /// Starts a new lookup, returning its generation.
    pub fn begin_lookup(&mut self) -> u64 {
        self.lookup_generation += 1;
        self.lookup_generation
    }

    /// Clears the lookup display if no newer lookup or reset happened since `generation`.
    pub fn expire_lookup(&mut self, generation: u64) -> bool {
        if self.lookup_generation != generation || self.lookup.is_none() {
            return false;
        }
        self.lookup = None;
        true
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
