#[derive(Debug, thiserror::Error)]
pub enum BrowserWalletError {
    #[error("{operation} rejected: {reason}")]
    Rejected { operation: &'static str, reason: String },

    #[error("{operation} timed out after waiting for the browser wallet")]
    Timeout { operation: &'static str },

    #[error("browser wallet is not connected")]
    NotConnected,

    #[error("browser wallet server is not running")]
    NotRunning,

    #[error("invalid response from the browser wallet: {0}")]
    InvalidResponse(String),

    #[error("browser wallet server error: {0}")]
    Server(#[from] std::io::Error),
}
