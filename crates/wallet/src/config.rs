//! Wallet configuration.
//!
//! Values are layered, lowest precedence first:
//! 1. built-in defaults
//! 2. [`CONFIG_FILE`] in the working directory
//! 3. `COINPAY_` prefixed environment variables, e.g. `COINPAY_PROJECT_ID`

use std::time::Duration;

use alloy_primitives::ChainId;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Name of the optional config file.
pub const CONFIG_FILE: &str = "coinpay.toml";

/// Prefix of the environment variables merged into the config.
pub const ENV_PREFIX: &str = "COINPAY_";

/// Project id shipped in sample `.env` files. Treated like a missing id.
pub const PLACEHOLDER_PROJECT_ID: &str = "your_project_id_here";

/// Chain used when none is configured.
pub const DEFAULT_CHAIN_ID: ChainId = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Wallet project id not configured. Set COINPAY_PROJECT_ID or `project_id` in coinpay.toml")]
    MissingProjectId,
    #[error("Wallet project id is still the placeholder value. Set COINPAY_PROJECT_ID")]
    PlaceholderProjectId,
    #[error("failed to extract wallet config: {0}")]
    Extract(#[from] Box<figment::Error>),
}

/// Immutable settings read once when the session is initialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Project id issued by the signing provider.
    pub project_id: Option<String>,
    /// Chain the wallet is asked to connect to.
    pub chain_id: ChainId,
    /// Application name shown in the wallet.
    pub name: String,
    /// Application description shown in the wallet.
    pub description: String,
    /// Origin used when the environment does not report one.
    pub url: String,
    /// Icon path, relative to the origin.
    pub icon_path: String,
    /// Whether the provider shows its own pairing modal.
    pub show_qr_modal: bool,
    /// Upper bound, in seconds, on waiting for the user to approve a connection.
    ///
    /// Unset means wait until the provider settles the request.
    pub approval_timeout: Option<u64>,
    /// Port of the local browser bridge. `0` picks a free port.
    pub bridge_port: u16,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            chain_id: DEFAULT_CHAIN_ID,
            name: "CoinPay".to_string(),
            description: "Cryptocurrency Payment Gateway".to_string(),
            url: "http://localhost:3000".to_string(),
            icon_path: "/walletconnect.svg".to_string(),
            show_qr_modal: true,
            approval_timeout: None,
            bridge_port: 0,
        }
    }
}

impl WalletConfig {
    /// Returns the default [`Figment`] for the wallet config.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads the config from the default [`Figment`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|err| ConfigError::Extract(Box::new(err)))
    }

    /// Returns the project id, rejecting missing and placeholder values.
    pub fn project_id(&self) -> Result<&str, ConfigError> {
        match self.project_id.as_deref().map(str::trim) {
            None | Some("") => Err(ConfigError::MissingProjectId),
            Some(PLACEHOLDER_PROJECT_ID) => Err(ConfigError::PlaceholderProjectId),
            Some(id) => Ok(id),
        }
    }

    pub fn approval_timeout(&self) -> Option<Duration> {
        self.approval_timeout.map(Duration::from_secs)
    }

    /// Display metadata for the given origin.
    pub fn metadata(&self, origin: &str) -> AppMetadata {
        let origin = origin.trim_end_matches('/');
        AppMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            url: origin.to_string(),
            icons: vec![format!("{origin}{}", self.icon_path)],
        }
    }
}

/// Application metadata displayed by the wallet during pairing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}
