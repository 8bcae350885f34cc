//! # ntc-config
//!
//! NTC Bank client configuration.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

use alloy_primitives::{Address, address};
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

pub mod error;
pub use error::{ConfigError, ExtractConfigError};

// reexport so cli types can implement `figment::Provider` to merge their overrides
pub use figment;

/// Which of the two bank front-ends the session behaves like.
///
/// The variants differ in small details: only [`Variant::Bank`] offers transfers and alerts when
/// an action needs a connected account, only [`Variant::Atm`] offers masking the account address
/// and silently adopts an already authorized account on mount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Bank,
    Atm,
}

impl Variant {
    /// Whether transfers between accounts are offered.
    pub const fn supports_transfer(self) -> bool {
        matches!(self, Self::Bank)
    }

    /// Whether the own address can be masked.
    pub const fn supports_masking(self) -> bool {
        matches!(self, Self::Atm)
    }

    /// Whether actions that need an account raise an alert instead of doing nothing.
    pub const fn alerts_without_account(self) -> bool {
        matches!(self, Self::Bank)
    }

    /// Whether an already authorized account is adopted on mount via `eth_accounts`.
    pub const fn adopts_authorized_account(self) -> bool {
        matches!(self, Self::Atm)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bank => "bank",
            Self::Atm => "atm",
        })
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bank" => Ok(Self::Bank),
            "atm" => Ok(Self::Atm),
            _ => Err(ConfigError::UnknownVariant(s.to_string())),
        }
    }
}

/// Where accounts and transaction signatures come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    /// A browser extension reached through the local bridge page.
    #[default]
    Browser,
    /// Private keys held by this process.
    Local,
}

impl FromStr for WalletKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "local" => Ok(Self::Local),
            _ => Err(ConfigError::UnknownWallet(s.to_string())),
        }
    }
}

/// NTC Bank client configuration
///
/// # Defaults
///
/// All values have a default: a local development node on `http://localhost:8545` with the bank
/// contract at its first deployment address.
///
/// # Provider Details
///
/// `Config` is a Figment [`Provider`] named `NTC Bank Config`, which makes it usable as the base
/// layer of [`Config::figment`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC endpoint used for reads and confirmations.
    pub rpc_url: String,
    /// Address of the deployed bank contract.
    pub contract: Address,
    /// Expected chain id, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Front-end behaviour.
    pub variant: Variant,
    /// How long a looked up balance stays visible, in seconds.
    pub lookup_display_secs: u64,
    /// Number of confirmations to wait for after a mutating call.
    pub confirmations: u64,
    /// Timeout for a submitted transaction to be confirmed, in seconds.
    pub transaction_timeout: u64,
    /// Wallet backend.
    pub wallet: WalletKind,
    /// Port of the browser bridge. `0` picks a free port.
    pub browser_port: u16,
    /// How long to wait for the user to act in the wallet, in seconds.
    pub wallet_timeout: u64,
    /// Where users without a wallet extension are sent.
    pub install_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            contract: Self::DEFAULT_CONTRACT,
            chain_id: None,
            variant: Variant::default(),
            lookup_display_secs: 5,
            confirmations: 1,
            transaction_timeout: 120,
            wallet: WalletKind::default(),
            browser_port: 9545,
            wallet_timeout: 300,
            install_url: "https://metamask.io/download.html".to_string(),
        }
    }
}

impl Config {
    /// File name of the config file.
    pub const FILE_NAME: &'static str = "ntcbank.toml";

    /// Env var that points at an explicit config file.
    pub const CONFIG_ENV: &'static str = "NTCBANK_CONFIG";

    /// Prefix of env vars that override single keys.
    pub const ENV_PREFIX: &'static str = "NTCBANK_";

    /// First contract deployed by the default dev account on a fresh node.
    ///
    /// `0x5FbDB2315678afecb367f032d93F642f64180aa3`
    pub const DEFAULT_CONTRACT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    /// Returns the current `Config` loaded from the working directory.
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment())
    }

    /// Returns the current `Config` loaded from `root`.
    pub fn load_with_root(root: impl AsRef<Path>) -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment_with_root(root.as_ref()))
    }

    /// Attempts to extract a `Config` from `provider` and validates it.
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        trace!("load config with provider: {:?}", provider.metadata());
        let figment = Figment::from(provider);
        let config = figment.extract::<Self>().map_err(ExtractConfigError::new)?;
        config.validate().map_err(ExtractConfigError::invalid)?;
        Ok(config)
    }

    /// Returns the default figment rooted at the working directory.
    ///
    /// See [`figment_with_root`](Self::figment_with_root).
    pub fn figment() -> Figment {
        Self::figment_with_root(Path::new("."))
    }

    /// Returns the default figment: defaults, then the toml file, then `NTCBANK_*` env vars.
    ///
    /// The toml file is `$NTCBANK_CONFIG` if set, otherwise `<root>/ntcbank.toml`.
    pub fn figment_with_root(root: &Path) -> Figment {
        Figment::from(Self::default())
            .merge(Toml::file(Self::config_file(root)))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["CONFIG", "DEBUG"]))
    }

    /// Resolves the config file location for `root`.
    pub fn config_file(root: &Path) -> PathBuf {
        std::env::var_os(Self::CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| root.join(Self::FILE_NAME))
    }

    /// Checks values that deserialize fine but can't work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::EmptyRpcUrl);
        }
        if self.lookup_display_secs == 0 {
            return Err(ConfigError::ZeroDuration("lookup_display_secs"));
        }
        if self.transaction_timeout == 0 {
            return Err(ConfigError::ZeroDuration("transaction_timeout"));
        }
        if self.wallet_timeout == 0 {
            return Err(ConfigError::ZeroDuration("wallet_timeout"));
        }
        Ok(())
    }

    /// How long a looked up balance stays visible.
    pub fn lookup_display(&self) -> Duration {
        Duration::from_secs(self.lookup_display_secs)
    }

    /// Timeout for a transaction to be confirmed.
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout)
    }

    /// Timeout for wallet prompts.
    pub fn wallet_timeout(&self) -> Duration {
        Duration::from_secs(self.wallet_timeout)
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("NTC Bank Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}
