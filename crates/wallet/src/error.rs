use std::time::Duration;

use crate::config::ConfigError;

/// EIP-1193 code for a request the user rejected.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors reported by a signing provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{message} (code {code})")]
    Rpc { code: i64, message: String },
    #[error("User rejected the request")]
    UserRejected,
    #[error("Timed out after {0:?} waiting for wallet approval")]
    Timeout(Duration),
    #[error("Invalid response from wallet: {0}")]
    InvalidResponse(String),
    #[error("Wallet did not return any accounts")]
    NoAccounts,
    #[error("Signing provider is unavailable: {0}")]
    Unavailable(String),
    #[error("Wallet connection closed")]
    Closed,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Builds an error from an EIP-1193 `{code, message}` pair.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        if code == USER_REJECTED_CODE {
            return Self::UserRejected;
        }
        Self::Rpc { code, message: message.into() }
    }

    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(err.into())
    }

    /// Returns `true` if the user declined the request in their wallet.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected)
    }
}

/// Errors surfaced by the session manager and the request dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Failed to load signing provider")]
    Load(#[source] ProviderError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("Failed to initialize wallet session")]
    Initialization(#[source] Option<ProviderError>),
    #[error("Failed to connect wallet")]
    Connection(#[source] ProviderError),
    #[error("Wallet not connected")]
    NotConnected,
    #[error("Failed to sign message")]
    Signing(#[source] ProviderError),
    #[error("Failed to send transaction")]
    Submission(#[source] ProviderError),
}

impl WalletError {
    /// The provider error behind this failure, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Load(err)
            | Self::Connection(err)
            | Self::Signing(err)
            | Self::Submission(err) => Some(err),
            Self::Initialization(err) => err.as_ref(),
            Self::Configuration(_) | Self::NotConnected => None,
        }
    }
}
