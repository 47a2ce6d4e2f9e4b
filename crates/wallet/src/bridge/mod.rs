//! Browser wallet bridge.
//!
//! A [`SigningProvider`] backed by a local HTTP server. The user opens the served page in a
//! browser with an injected wallet; the page polls for queued EIP-1193 requests, forwards them
//! to `window.ethereum` and posts the outcome back. Every API call must carry the per-session
//! token embedded in the page.

use std::{fmt, sync::Arc};

use alloy_primitives::{Address, ChainId, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::broadcast;

use crate::{
    error::ProviderError,
    provider::{
        ETH_CHAIN_ID, ETH_REQUEST_ACCOUNTS, ProviderEvent, ProviderHandle, ProviderLoader,
        ProviderOptions, RequestArguments, SigningProvider,
    },
    units,
};

mod app;
mod handlers;
mod queue;
mod router;
mod server;
mod state;
pub mod types;

pub use router::SESSION_TOKEN_HEADER;

use server::BridgeServer;
use state::BridgeState;

/// `wallet_switchEthereumChain` request method.
pub const WALLET_SWITCH_ETHEREUM_CHAIN: &str = "wallet_switchEthereumChain";

type ListenCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Loads the browser bridge provider.
#[derive(Clone, Default)]
pub struct BridgeLoader {
    port: u16,
    on_listen: Option<ListenCallback>,
}

impl fmt::Debug for BridgeLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeLoader").field("port", &self.port).finish_non_exhaustive()
    }
}

impl BridgeLoader {
    /// Serves the bridge on `port`; `0` picks a free one.
    pub fn new(port: u16) -> Self {
        Self { port, on_listen: None }
    }

    /// Calls `f` with the page URL once the server is listening.
    pub fn on_listen(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_listen = Some(Arc::new(f));
        self
    }
}

#[async_trait]
impl ProviderLoader for BridgeLoader {
    async fn load(&self) -> Result<Arc<dyn SigningProvider>, ProviderError> {
        Ok(Arc::new(BridgeProvider { port: self.port, on_listen: self.on_listen.clone() }))
    }
}

/// Starts one bridge server per initialized session.
#[derive(Clone)]
pub struct BridgeProvider {
    port: u16,
    on_listen: Option<ListenCallback>,
}

impl fmt::Debug for BridgeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeProvider").field("port", &self.port).finish_non_exhaustive()
    }
}

impl BridgeProvider {
    pub fn new(port: u16) -> Self {
        Self { port, on_listen: None }
    }

    /// Binds the server and returns the concrete handle.
    pub async fn start(&self, options: ProviderOptions) -> Result<Arc<BridgeHandle>, ProviderError> {
        let state = Arc::new(BridgeState::new(options));
        let server = BridgeServer::start(state.clone(), self.port).await.map_err(|err| {
            ProviderError::Unavailable(format!("could not bind wallet bridge on port {}: {err}", self.port))
        })?;

        let url = server.url();
        info!(%url, "wallet bridge listening, open it in a browser with a wallet extension");
        if let Some(on_listen) = &self.on_listen {
            on_listen(&url);
        }

        Ok(Arc::new(BridgeHandle { state, url, port: server.port(), server: Mutex::new(Some(server)) }))
    }
}

#[async_trait]
impl SigningProvider for BridgeProvider {
    async fn init(&self, options: ProviderOptions) -> Result<Arc<dyn ProviderHandle>, ProviderError> {
        let handle: Arc<dyn ProviderHandle> = self.start(options).await?;
        Ok(handle)
    }
}

/// A session relayed through the browser page.
#[derive(Debug)]
pub struct BridgeHandle {
    state: Arc<BridgeState>,
    url: String,
    port: u16,
    server: Mutex<Option<BridgeServer>>,
}

impl BridgeHandle {
    /// URL of the relay page.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Token the page sends in [`SESSION_TOKEN_HEADER`].
    pub fn session_token(&self) -> Arc<String> {
        self.state.session_token()
    }

    /// Queues a request for the page and waits, possibly indefinitely, for the outcome.
    async fn relay(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let rx = self.state.enqueue(method.to_string(), params)?;
        rx.await.map_err(|_| ProviderError::Closed)?
    }

    async fn relay_as<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ProviderError> {
        let value = self.relay(method, params).await?;
        serde_json::from_value(value)
            .map_err(|err| ProviderError::InvalidResponse(format!("{method}: {err}")))
    }

    /// Best effort: a refusal leaves the wallet on its current chain.
    async fn switch_chain(&self, chain_id: ChainId) {
        let params = json!([{ "chainId": units::to_quantity(U256::from(chain_id)) }]);
        match self.relay(WALLET_SWITCH_ETHEREUM_CHAIN, params).await {
            Ok(_) => self.state.set_chain_id(chain_id),
            Err(err) => warn!(%err, chain_id, "wallet did not switch chains"),
        }
    }
}

#[async_trait]
impl ProviderHandle for BridgeHandle {
    async fn enable(&self) -> Result<Vec<Address>, ProviderError> {
        let accounts: Vec<Address> = self.relay_as(ETH_REQUEST_ACCOUNTS, json!([])).await?;
        self.state.set_accounts(accounts.clone());

        let chain: String = self.relay_as(ETH_CHAIN_ID, json!([])).await?;
        let chain_id = units::parse_chain_id(&chain)
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
        self.state.set_chain_id(chain_id);

        if let Some(&wanted) = self.state.options().chains.first()
            && wanted != chain_id
        {
            debug!(current = chain_id, wanted, "requesting chain switch");
            self.switch_chain(wanted).await;
        }

        Ok(accounts)
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        if !self.state.close() {
            return Ok(());
        }
        let server = self.server.lock().take();
        if let Some(mut server) = server {
            server.stop().await;
        }
        debug!(url = %self.url, "wallet bridge closed");
        Ok(())
    }

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        self.relay(&args.method, args.params).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.state.subscribe()
    }

    fn accounts(&self) -> Vec<Address> {
        self.state.accounts()
    }

    fn chain_id(&self) -> Option<ChainId> {
        self.state.chain_id()
    }
}
