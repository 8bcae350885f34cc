//! Text rendering of the session.

use std::fmt;

use alloy_primitives::{Address, U256};
use ntc_config::Variant;

use crate::{
    session::{Session, SessionState},
    units::format_ether,
};

const MASK: &str = "********";

/// Snapshot of what the front-end shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Panel {
    NotInstalled {
        variant: Variant,
        install_url: String,
    },
    NotConnected {
        variant: Variant,
    },
    Connected {
        variant: Variant,
        account: Address,
        show_address: bool,
        balance: Option<U256>,
        lookup: Option<U256>,
    },
}

impl Panel {
    pub fn new(session: &Session, variant: Variant, install_url: &str) -> Self {
        match &session.state {
            SessionState::NoWallet => {
                Self::NotInstalled { variant, install_url: install_url.to_string() }
            }
            SessionState::Disconnected => Self::NotConnected { variant },
            SessionState::Connected { account, .. } => Self::Connected {
                variant,
                account: *account,
                show_address: session.show_address || !variant.supports_masking(),
                balance: session.balance.filter(|b| b.address == *account).map(|b| b.value),
                lookup: session.lookup.map(|b| b.value),
            },
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled { variant: Variant::Bank, install_url } => {
                writeln!(f, "MetaMask not installed!")?;
                write!(f, "Install MetaMask: {install_url}")
            }
            Self::NotInstalled { variant: Variant::Atm, install_url } => {
                writeln!(f, "Welcome to NTC Bank!")?;
                writeln!(f, "Please install MetaMask in order to use this ATM.")?;
                write!(f, "{install_url}")
            }
            Self::NotConnected { variant: Variant::Bank } => {
                writeln!(f, "Connect your MetaMask wallet")?;
                write!(f, "[connect]")
            }
            Self::NotConnected { variant: Variant::Atm } => {
                writeln!(f, "Welcome to NTC Bank!")?;
                write!(f, "[connect] Please connect your MetaMask wallet")
            }
            Self::Connected { variant, account, show_address, balance, lookup } => {
                let balance = balance.map(format_ether).unwrap_or_else(|| "-".to_string());
                writeln!(f, "Welcome to NTC Bank!")?;
                match variant {
                    Variant::Bank => {
                        writeln!(f, "Account: {account}")?;
                        write!(f, "Total Balance: {balance} ETH")?;
                    }
                    Variant::Atm => {
                        if *show_address {
                            writeln!(f, "Your Account: {account} [hide]")?;
                        } else {
                            writeln!(f, "Your Account: {MASK} [show]")?;
                        }
                        write!(f, "Your Balance: {balance} ETH")?;
                    }
                }
                if let Some(lookup) = lookup {
                    write!(f, "\nTotal Balance: {} ETH", format_ether(*lookup))?;
                }
                Ok(())
            }
        }
    }
}
