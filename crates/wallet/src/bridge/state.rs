use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use alloy_primitives::{Address, ChainId};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, oneshot};
use uuid::Uuid;

use crate::{
    bridge::{
        queue::RequestQueue,
        types::{BridgeRequest, ConnectionInfo},
    },
    error::ProviderError,
    provider::{ProviderEvent, ProviderOptions},
};

const EVENT_CAPACITY: usize = 16;

#[derive(Debug)]
pub(crate) struct BridgeState {
    /// Token the page must echo in `X-Session-Token`.
    session_token: Arc<String>,
    options: ProviderOptions,
    /// Requests waiting for the page.
    requests: Mutex<RequestQueue>,
    connection: Mutex<ConnectionInfo>,
    events: broadcast::Sender<ProviderEvent>,
    closed: AtomicBool,
}

impl BridgeState {
    pub fn new(options: ProviderOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session_token: Arc::new(Uuid::new_v4().to_string()),
            options,
            requests: Mutex::new(RequestQueue::new()),
            connection: Mutex::new(ConnectionInfo::default()),
            events,
            closed: AtomicBool::new(false),
        }
    }

    pub fn session_token(&self) -> Arc<String> {
        self.session_token.clone()
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Queues a request and returns the receiver of its outcome.
    pub fn enqueue(
        &self,
        method: String,
        params: Value,
    ) -> Result<oneshot::Receiver<Result<Value, ProviderError>>, ProviderError> {
        // Checked under the queue lock so `close` cannot race a late request.
        let mut requests = self.requests.lock();
        if self.is_closed() {
            return Err(ProviderError::Closed);
        }
        let (tx, rx) = oneshot::channel();
        let request = BridgeRequest { id: Uuid::new_v4(), method, params };
        trace!(id = %request.id, method = %request.method, pending = requests.len(), "queued bridge request");
        requests.add_request(request, tx);
        Ok(rx)
    }

    pub fn read_next_request(&self) -> Option<BridgeRequest> {
        self.requests.lock().read_request().cloned()
    }

    pub fn has_request(&self, id: &Uuid) -> bool {
        self.requests.lock().has_request(id)
    }

    pub fn resolve(&self, id: &Uuid, outcome: Result<Value, ProviderError>) -> bool {
        self.requests.lock().resolve(id, outcome)
    }

    pub fn connection(&self) -> ConnectionInfo {
        self.connection.lock().clone()
    }

    pub fn accounts(&self) -> Vec<Address> {
        self.connection.lock().accounts.clone()
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.connection.lock().chain_id
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.connection.lock().accounts = accounts;
    }

    pub fn set_chain_id(&self, chain_id: ChainId) {
        self.connection.lock().chain_id = Some(chain_id);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }

    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Marks the bridge closed and fails every pending request.
    ///
    /// Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        let mut requests = self.requests.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        requests.close();
        *self.connection.lock() = ConnectionInfo::default();
        true
    }
}
