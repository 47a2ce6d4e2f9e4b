//! # coinpay-wallet
//!
//! Wallet session management for the CoinPay payment gateway.
//!
//! A [`SessionManager`] lazily loads a signing provider, runs its initialization handshake once,
//! keeps the resulting session in a [`SessionStore`] and exposes it to the rest of the
//! application. Signing and transaction requests go through a [`RequestDispatcher`].
//!
//! Providers follow [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193). The `browser` feature
//! ships one that relays requests to a browser wallet through a local HTTP server.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

pub mod config;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod manager;
pub mod payment;
pub mod provider;
pub mod store;
pub mod units;

#[cfg(feature = "browser")]
pub mod bridge;

#[cfg(test)]
mod mock;

pub use config::{AppMetadata, ConfigError, WalletConfig};
pub use dispatch::RequestDispatcher;
pub use environment::{Environment, Headless, Interactive};
pub use error::{ProviderError, WalletError};
pub use manager::{Connection, SessionEvent, SessionManager, SessionState};
pub use payment::{PaymentError, PaymentForm, PaymentReceipt};
pub use provider::{
    ProviderEvent, ProviderHandle, ProviderLoader, ProviderOptions, RequestArguments,
    SigningProvider,
};
pub use store::{Session, SessionId, SessionStore};

#[cfg(feature = "browser")]
pub use bridge::{BridgeHandle, BridgeLoader, BridgeProvider};
