//! # ntc-bank
//!
//! Session client for the NTC Bank contract.
//!
//! A [`SessionController`] owns one session against the bank: it detects the wallet, adopts the
//! account the wallet authorizes, binds the [`contract`] client to it and runs balance queries,
//! deposits, withdrawals and transfers on behalf of the user.

#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

pub mod contract;
pub mod error;
pub mod session;
pub mod units;
pub mod view;

mod controller;
pub use controller::{SessionController, SessionOptions};

pub use contract::{BankApi, BankContract, Binder, RpcBinder};
pub use error::{AmountError, BankError, SessionError};
pub use session::{Notice, SessionState};
pub use view::Panel;
