//! Wallet session lifecycle.
//!
//! [`SessionManager`] owns the single shared session. It loads the signing provider on first
//! use, runs at most one initialization handshake at a time, drives the user approval step and
//! relays provider notifications to subscribers.

use std::{fmt, sync::Arc};

use alloy_primitives::{Address, ChainId};
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{OnceCell, broadcast};

use crate::{
    config::WalletConfig,
    dispatch::RequestDispatcher,
    environment::Environment,
    error::{ProviderError, WalletError},
    provider::{ProviderEvent, ProviderLoader, ProviderOptions, SigningProvider},
    store::{Session, SessionId, SessionStore},
};

/// Capacity of the session notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Wallet connection information returned by [`SessionManager::connect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub address: Address,
    pub chain_id: ChainId,
}

/// Observable lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    Connected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Connected => "connected",
        })
    }
}

/// Notifications published to subscribers of [`SessionManager::subscribe`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session finished initializing.
    Ready,
    /// The user approved the connection.
    Connected(Connection),
    /// The wallet switched accounts. `None` once no account is exposed anymore.
    AccountChanged(Option<Address>),
    /// The wallet switched chains.
    ChainChanged(ChainId),
    /// The session is gone, either torn down locally or dropped by the wallet.
    Disconnected,
}

type PendingInit = Shared<BoxFuture<'static, Option<Session>>>;

enum Lifecycle {
    Uninitialized,
    Initializing(PendingInit),
    Ready,
    Connected,
}

impl Lifecycle {
    fn state(&self) -> SessionState {
        match self {
            Self::Uninitialized => SessionState::Uninitialized,
            Self::Initializing(_) => SessionState::Initializing,
            Self::Ready => SessionState::Ready,
            Self::Connected => SessionState::Connected,
        }
    }
}

struct Inner {
    config: WalletConfig,
    loader: Arc<dyn ProviderLoader>,
    environment: Arc<dyn Environment>,
    provider: OnceCell<Arc<dyn SigningProvider>>,
    store: SessionStore,
    lifecycle: Mutex<Lifecycle>,
    events: broadcast::Sender<SessionEvent>,
}

/// Owns the wallet session. Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .field("session", &self.inner.store.get().map(|s| s.id()))
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(
        config: WalletConfig,
        loader: Arc<dyn ProviderLoader>,
        environment: Arc<dyn Environment>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                loader,
                environment,
                provider: OnceCell::new(),
                store: SessionStore::new(),
                lifecycle: Mutex::new(Lifecycle::Uninitialized),
                events: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            }),
        }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.inner.config
    }

    pub fn state(&self) -> SessionState {
        self.inner.lifecycle.lock().state()
    }

    /// Returns a dispatcher forwarding requests over this manager's session.
    pub fn dispatcher(&self) -> RequestDispatcher {
        RequestDispatcher::new(self.clone())
    }

    /// Subscribes to session notifications. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Initializes the session if needed and returns it.
    ///
    /// Returns `None` when running headless, when the configuration is unusable, or when the
    /// provider fails to load or to complete its handshake. Concurrent callers share a single
    /// handshake and observe the same outcome.
    pub async fn initialize(&self) -> Option<Session> {
        if !self.inner.environment.is_interactive() {
            debug!("skipping wallet initialization outside an interactive environment");
            return None;
        }

        let pending = {
            let mut lifecycle = self.inner.lifecycle.lock();
            match &*lifecycle {
                Lifecycle::Ready | Lifecycle::Connected => return self.inner.store.get(),
                Lifecycle::Initializing(pending) => pending.clone(),
                Lifecycle::Uninitialized => {
                    let inner = self.inner.clone();
                    let pending = async move { inner.initialize_once().await }.boxed().shared();
                    *lifecycle = Lifecycle::Initializing(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    /// Like [`initialize`](Self::initialize), but reports why no session could be produced.
    ///
    /// Headless and configuration problems are reported as such. Provider load and handshake
    /// failures are logged and surface as [`WalletError::Initialization`].
    pub async fn try_initialize(&self) -> Result<Session, WalletError> {
        if let Some(session) = self.initialize().await {
            return Ok(session);
        }
        if !self.inner.environment.is_interactive() {
            return Err(WalletError::Initialization(Some(ProviderError::Unavailable(
                "no interactive environment".to_string(),
            ))));
        }
        self.inner.config.project_id()?;
        Err(WalletError::Initialization(None))
    }

    /// Asks the user to approve the connection, initializing first if needed.
    pub async fn connect(&self) -> Result<Connection, WalletError> {
        let session = match self.inner.store.get() {
            Some(session) => session,
            None => self.initialize().await.ok_or(WalletError::Initialization(None))?,
        };

        let approval = session.handle().enable();
        let accounts = match self.inner.config.approval_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, approval)
                .await
                .map_err(|_| WalletError::Connection(ProviderError::Timeout(timeout)))?,
            None => approval.await,
        }
        .map_err(|err| {
            debug!(session = %session.id(), %err, "wallet connection rejected");
            WalletError::Connection(err)
        })?;

        let address = accounts
            .first()
            .copied()
            .or_else(|| session.account())
            .ok_or(WalletError::Connection(ProviderError::NoAccounts))?;
        let chain_id = session.chain_id().unwrap_or(self.inner.config.chain_id);
        let connection = Connection { address, chain_id };

        {
            let mut lifecycle = self.inner.lifecycle.lock();
            if !self.inner.store.holds(session.id()) {
                debug!(session = %session.id(), "session closed while awaiting approval");
                return Err(WalletError::Connection(ProviderError::Closed));
            }
            *lifecycle = Lifecycle::Connected;
        }
        debug!(session = %session.id(), %address, chain_id, "wallet connected");
        self.inner.publish(SessionEvent::Connected(connection));
        Ok(connection)
    }

    /// Tears the session down. The stored session is cleared even if teardown fails.
    pub async fn disconnect(&self) {
        let Some(session) = self.inner.store.get() else { return };

        if let Err(err) = session.handle().disconnect().await {
            warn!(session = %session.id(), %err, "wallet teardown failed, clearing session anyway");
        }

        if self.inner.reset(session.id()) {
            debug!(session = %session.id(), "wallet disconnected");
            self.inner.publish(SessionEvent::Disconnected);
        }
    }

    /// First account exposed by the live session.
    pub fn current_account(&self) -> Option<Address> {
        self.inner.store.get().and_then(|session| session.account())
    }

    /// The live session, for consumers needing the raw handle.
    pub fn current_handle(&self) -> Option<Session> {
        self.inner.store.get()
    }
}

impl Inner {
    /// Runs one initialization attempt and settles the lifecycle state.
    async fn initialize_once(self: Arc<Self>) -> Option<Session> {
        let outcome = self.handshake().await;
        let mut lifecycle = self.lifecycle.lock();
        match outcome {
            Ok(session) => {
                self.store.set(Some(session.clone()));
                *lifecycle = Lifecycle::Ready;
                drop(lifecycle);

                debug!(session = %session.id(), "wallet session ready");
                self.watch(&session);
                self.publish(SessionEvent::Ready);
                Some(session)
            }
            Err(err) => {
                *lifecycle = Lifecycle::Uninitialized;
                drop(lifecycle);

                match &err {
                    WalletError::Configuration(err) => warn!(%err, "wallet unavailable"),
                    err => error!(%err, source = ?err.provider_error(), "wallet initialization failed"),
                }
                None
            }
        }
    }

    async fn handshake(&self) -> Result<Session, WalletError> {
        let project_id = self.config.project_id()?.to_string();
        let origin = self.environment.origin().unwrap_or_else(|| self.config.url.clone());

        let provider = self
            .provider
            .get_or_try_init(|| async {
                trace!("loading signing provider");
                self.loader.load().await
            })
            .await
            .map_err(WalletError::Load)?;

        let options = ProviderOptions {
            project_id,
            chains: vec![self.config.chain_id],
            show_qr_modal: self.config.show_qr_modal,
            metadata: self.config.metadata(&origin),
        };
        let handle = provider
            .init(options)
            .await
            .map_err(|err| WalletError::Initialization(Some(err)))?;
        Ok(Session::new(handle))
    }

    /// Forwards the session's provider notifications until it is replaced or closed.
    fn watch(self: &Arc<Self>, session: &Session) {
        let mut events = session.handle().subscribe();
        let id = session.id();
        let inner = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(session = %id, skipped, "dropped wallet notifications");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(inner) = inner.upgrade() else { break };
                if !inner.store.holds(id) {
                    break;
                }
                inner.on_provider_event(id, event);
            }
            trace!(session = %id, "stopped watching wallet notifications");
        });
    }

    fn on_provider_event(&self, id: SessionId, event: ProviderEvent) {
        trace!(session = %id, ?event, "wallet notification");
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                self.publish(SessionEvent::AccountChanged(accounts.first().copied()));
            }
            ProviderEvent::ChainChanged(chain_id) => {
                self.publish(SessionEvent::ChainChanged(chain_id));
            }
            ProviderEvent::Disconnect => {
                // No automatic reconnection: the user has to connect again.
                if self.reset(id) {
                    warn!(session = %id, "wallet disconnected unexpectedly");
                    self.publish(SessionEvent::Disconnected);
                }
            }
        }
    }

    /// Clears the session identified by `id` and returns to `Uninitialized`.
    fn reset(&self, id: SessionId) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if !self.store.clear_if(id) {
            return false;
        }
        if !matches!(*lifecycle, Lifecycle::Initializing(_)) {
            *lifecycle = Lifecycle::Uninitialized;
        }
        true
    }

    fn publish(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}
