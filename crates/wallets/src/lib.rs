//! # ntc-wallets
//!
//! Wallet backends for the NTC Bank client.
//!
//! A wallet hands out accounts and submits signed transactions on the user's behalf, following the
//! request API of [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193):
//! - `eth_accounts` / `eth_requestAccounts` to read or request authorized accounts
//! - the `accountsChanged` event whenever the authorized account set changes
//! - `eth_sendTransaction` to sign and submit a transaction in one step
//!
//! Two backends implement [`WalletProvider`]:
//! - [`BrowserWallet`]: a local HTTP server serving a bridge page which drives the browser
//!   extension injected as `window.ethereum`
//! - [`LocalWallet`]: private keys held by this process, submitting through a JSON-RPC node

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

pub mod error;
pub use error::{PrivateKeyError, WalletError};

mod local;
pub use local::LocalWallet;

mod provider;
pub use provider::{WalletEvent, WalletProvider};

pub mod utils;

pub mod wallet_browser;
pub use wallet_browser::{
    error::BrowserWalletError, server::BrowserWalletServer, wallet::BrowserWallet,
};
