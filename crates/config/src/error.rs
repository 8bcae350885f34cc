//! error handling for config extraction
use figment::providers::{Format, Toml};
use std::{collections::HashSet, error::Error, fmt};

/// The message shown when the config could not be extracted from the figment
pub const FAILED_TO_EXTRACT_CONFIG_MSG: &str = "failed to extract ntcbank config:";

/// A value that deserialized fine but can't be used.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("`rpc_url` must not be empty")]
    EmptyRpcUrl,
    #[error("`{0}` must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("unknown variant `{0}`, expected `bank` or `atm`")]
    UnknownVariant(String),
    #[error("unknown wallet `{0}`, expected `browser` or `local`")]
    UnknownWallet(String),
}

/// Represents a failed attempt to extract `Config` from a `Figment`
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfigError {
    kind: ExtractKind,
}

#[derive(Clone, Debug, PartialEq)]
enum ExtractKind {
    Figment(figment::Error),
    Invalid(ConfigError),
}

impl ExtractConfigError {
    /// Wraps the figment error
    pub fn new(error: figment::Error) -> Self {
        Self { kind: ExtractKind::Figment(error) }
    }

    /// Wraps a validation error
    pub fn invalid(error: ConfigError) -> Self {
        Self { kind: ExtractKind::Invalid(error) }
    }
}

impl fmt::Display for ExtractConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{FAILED_TO_EXTRACT_CONFIG_MSG}")?;
        match &self.kind {
            ExtractKind::Figment(error) => {
                let mut unique = HashSet::with_capacity(error.count());
                for err in error.clone() {
                    let from_toml = err
                        .metadata
                        .as_ref()
                        .map(|meta| meta.name.contains(Toml::NAME))
                        .unwrap_or_default();
                    let msg = if from_toml {
                        format!("ntcbank.toml error: {err}")
                    } else {
                        err.to_string()
                    };
                    if unique.insert(msg.clone()) {
                        writeln!(f, "{msg}")?;
                    }
                }
                Ok(())
            }
            ExtractKind::Invalid(error) => writeln!(f, "{error}"),
        }
    }
}

impl Error for ExtractConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            ExtractKind::Figment(error) => Error::source(error),
            ExtractKind::Invalid(error) => Some(error),
        }
    }
}
