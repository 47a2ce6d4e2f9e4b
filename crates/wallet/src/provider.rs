//! The capability surface consumed from a signing provider.
//!
//! A provider follows [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193): a generic
//! `request({method, params})` entry point plus `accountsChanged`, `chainChanged` and
//! `disconnect` notifications.

use std::{fmt, sync::Arc};

use alloy_primitives::{Address, ChainId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::{config::AppMetadata, error::ProviderError};

/// `personal_sign` request method.
pub const PERSONAL_SIGN: &str = "personal_sign";
/// `eth_sendTransaction` request method.
pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";
/// `eth_requestAccounts` request method.
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
/// `eth_chainId` request method.
pub const ETH_CHAIN_ID: &str = "eth_chainId";

/// Arguments of an EIP-1193 `request` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RequestArguments {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self { method: method.into(), params }
    }
}

/// Notifications emitted by a provider handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(ChainId),
    Disconnect,
}

/// Options passed to [`SigningProvider::init`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOptions {
    pub project_id: String,
    pub chains: Vec<ChainId>,
    pub show_qr_modal: bool,
    pub metadata: AppMetadata,
}

/// Loads a signing provider implementation on demand.
///
/// The session manager calls this at most once per successful load and memoizes the result.
#[async_trait]
pub trait ProviderLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn SigningProvider>, ProviderError>;
}

/// A loaded signing provider implementation.
#[async_trait]
pub trait SigningProvider: Send + Sync {
    /// Runs the provider's initialization handshake and returns a ready handle.
    async fn init(&self, options: ProviderOptions) -> Result<Arc<dyn ProviderHandle>, ProviderError>;
}

/// A live, initialized connection to a wallet.
#[async_trait]
pub trait ProviderHandle: Send + Sync + fmt::Debug {
    /// Asks the user to approve the connection and returns the approved accounts.
    ///
    /// This may stay pending for as long as the user takes to respond.
    async fn enable(&self) -> Result<Vec<Address>, ProviderError>;

    /// Tears the connection down.
    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Forwards a raw request to the wallet.
    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError>;

    /// Subscribes to the handle's notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;

    /// Accounts approved so far, in wallet order.
    fn accounts(&self) -> Vec<Address>;

    /// Chain the wallet is currently on, once known.
    fn chain_id(&self) -> Option<ChainId>;
}
