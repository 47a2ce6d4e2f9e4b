//! Call-counting fake provider used by the unit tests.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy_primitives::{Address, ChainId, address};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{Notify, broadcast};

use crate::{
    error::ProviderError,
    provider::{
        ProviderEvent, ProviderHandle, ProviderLoader, ProviderOptions, RequestArguments,
        SigningProvider,
    },
};

pub(crate) const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub(crate) const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Approval {
    Approve,
    Reject,
    Pending,
    /// Approves once [`MockHandle::release`] is called.
    Gated,
}

#[derive(Debug)]
pub(crate) struct MockHandle {
    approved: Vec<Address>,
    approved_chain: Option<ChainId>,
    approval: Approval,
    fail_disconnect: bool,
    accounts: Mutex<Vec<Address>>,
    chain_id: Mutex<Option<ChainId>>,
    responses: Mutex<HashMap<String, Result<Value, (i64, String)>>>,
    requests: Mutex<Vec<RequestArguments>>,
    enables: AtomicUsize,
    disconnects: AtomicUsize,
    gate: Notify,
    events: broadcast::Sender<ProviderEvent>,
}

impl Default for MockHandle {
    fn default() -> Self {
        Self {
            approved: vec![ALICE],
            approved_chain: Some(1),
            approval: Approval::Approve,
            fail_disconnect: false,
            accounts: Mutex::new(Vec::new()),
            chain_id: Mutex::new(None),
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            enables: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            gate: Notify::new(),
            events: broadcast::channel(16).0,
        }
    }
}

impl MockHandle {
    pub(crate) fn approving(accounts: Vec<Address>, chain_id: Option<ChainId>) -> Self {
        Self { approved: accounts, approved_chain: chain_id, ..Default::default() }
    }

    pub(crate) fn with_approval(mut self, approval: Approval) -> Self {
        self.approval = approval;
        self
    }

    pub(crate) fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    pub(crate) fn respond(&self, method: &str, result: Value) {
        self.responses.lock().insert(method.to_string(), Ok(result));
    }

    pub(crate) fn respond_error(&self, method: &str, code: i64, message: &str) {
        self.responses.lock().insert(method.to_string(), Err((code, message.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<RequestArguments> {
        self.requests.lock().clone()
    }

    pub(crate) fn enables(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }

    pub(crate) fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Lets a gated approval through.
    pub(crate) fn release(&self) {
        self.gate.notify_one();
    }

    /// Emits a notification as the wallet would.
    pub(crate) fn emit(&self, event: ProviderEvent) {
        match &event {
            ProviderEvent::AccountsChanged(accounts) => *self.accounts.lock() = accounts.clone(),
            ProviderEvent::ChainChanged(chain_id) => *self.chain_id.lock() = Some(*chain_id),
            ProviderEvent::Disconnect => self.accounts.lock().clear(),
        }
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl ProviderHandle for MockHandle {
    async fn enable(&self) -> Result<Vec<Address>, ProviderError> {
        self.enables.fetch_add(1, Ordering::SeqCst);
        if self.approval == Approval::Gated {
            self.gate.notified().await;
        }
        match self.approval {
            Approval::Approve | Approval::Gated => {
                *self.accounts.lock() = self.approved.clone();
                *self.chain_id.lock() = self.approved_chain;
                Ok(self.approved.clone())
            }
            Approval::Reject => Err(ProviderError::from_rpc(4001, "User rejected the request.")),
            Approval::Pending => std::future::pending().await,
        }
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect {
            return Err(ProviderError::Closed);
        }
        self.accounts.lock().clear();
        Ok(())
    }

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        self.requests.lock().push(args.clone());
        match self.responses.lock().get(&args.method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err((code, message))) => Err(ProviderError::from_rpc(*code, message.clone())),
            None => Err(ProviderError::from_rpc(4200, "The requested method is not supported.")),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }

    fn accounts(&self) -> Vec<Address> {
        self.accounts.lock().clone()
    }

    fn chain_id(&self) -> Option<ChainId> {
        *self.chain_id.lock()
    }
}

#[derive(Debug)]
pub(crate) struct MockProvider {
    pub(crate) handle: Arc<MockHandle>,
    inits: AtomicUsize,
    init_delay: Option<Duration>,
    fail_init: bool,
    options: Mutex<Option<ProviderOptions>>,
}

impl MockProvider {
    pub(crate) fn new(handle: MockHandle) -> Self {
        Self {
            handle: Arc::new(handle),
            inits: AtomicUsize::new(0),
            init_delay: None,
            fail_init: false,
            options: Mutex::new(None),
        }
    }

    pub(crate) fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = Some(delay);
        self
    }

    pub(crate) fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub(crate) fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub(crate) fn last_options(&self) -> Option<ProviderOptions> {
        self.options.lock().clone()
    }
}

#[async_trait]
impl SigningProvider for MockProvider {
    async fn init(
        &self,
        options: ProviderOptions,
    ) -> Result<Arc<dyn ProviderHandle>, ProviderError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        *self.options.lock() = Some(options);
        if let Some(delay) = self.init_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_init {
            return Err(ProviderError::Unavailable("relay unreachable".to_string()));
        }
        Ok(self.handle.clone())
    }
}

pub(crate) struct MockLoader {
    pub(crate) provider: Arc<MockProvider>,
    loads: AtomicUsize,
    failures_left: AtomicUsize,
}

impl MockLoader {
    pub(crate) fn new(provider: MockProvider) -> Self {
        Self {
            provider: Arc::new(provider),
            loads: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
        }
    }

    /// Makes the next `n` loads fail.
    pub(crate) fn failing_loads(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub(crate) fn handle(&self) -> &Arc<MockHandle> {
        &self.provider.handle
    }
}

#[async_trait]
impl ProviderLoader for MockLoader {
    async fn load(&self) -> Result<Arc<dyn SigningProvider>, ProviderError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ProviderError::Unavailable("module not found".to_string()));
        }
        Ok(self.provider.clone())
    }
}
