use std::path::PathBuf;

use alloy_primitives::Address;
use clap::Parser;
use ntc_config::{
    Config, ExtractConfigError, Variant, WalletKind,
    figment::{
        self, Metadata, Profile, Provider,
        error::Kind::InvalidType,
        value::{Dict, Map, Value},
    },
};
use serde::Serialize;

/// Interactive client for the NTC Bank contract.
///
/// Values not given on the command line come from `ntcbank.toml` and `NTCBANK_*` environment
/// variables.
#[derive(Clone, Debug, Default, Serialize, Parser)]
#[command(name = "ntcbank", version)]
pub struct BankArgs {
    /// The JSON-RPC endpoint used for reads and confirmations.
    #[arg(long, short, value_name = "URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Address of the bank contract.
    #[arg(long, value_name = "ADDRESS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<Address>,

    /// Front-end behaviour: `bank` or `atm`.
    #[arg(long, value_name = "VARIANT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,

    /// Wallet backend: `browser` or `local`.
    #[arg(long, value_name = "WALLET")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<WalletKind>,

    /// Port of the browser wallet bridge.
    #[arg(long, value_name = "PORT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_port: Option<u16>,

    /// How long a looked up balance stays visible, in seconds.
    #[arg(long, value_name = "SECONDS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_display_secs: Option<u64>,

    /// Number of confirmations to wait for after a transaction.
    #[arg(long, value_name = "CONFIRMATIONS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,

    /// Private keys for the local wallet. Implies `--wallet local`.
    ///
    /// The first key is the account authorized on `connect`.
    #[arg(long = "private-key", value_name = "KEY", value_delimiter = ',')]
    #[serde(skip)]
    pub private_keys: Vec<String>,

    /// Directory to look for `ntcbank.toml` in.
    #[arg(long, value_name = "PATH")]
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

impl BankArgs {
    /// Loads the config with these arguments merged on top.
    pub fn load_config(&self) -> Result<Config, ExtractConfigError> {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
        Config::try_from(Config::figment_with_root(&root).merge(self.clone()))
    }
}

// Make these args a `figment::Provider` so that they can be merged into the `Config`
impl Provider for BankArgs {
    fn metadata(&self) -> Metadata {
        Metadata::named("NTC Bank Args Provider")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let value = Value::serialize(self)?;
        let error = InvalidType(value.to_actual(), "map".into());
        let mut dict = value.into_dict().ok_or(error)?;

        if !self.private_keys.is_empty() {
            dict.insert("wallet".to_string(), "local".into());
        }

        Ok(Map::from([(Profile::Default, dict)]))
    }
}
