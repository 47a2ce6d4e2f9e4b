use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::{bridge::types::BridgeRequest, error::ProviderError};

pub(crate) type Responder = oneshot::Sender<Result<Value, ProviderError>>;

/// Requests waiting for the browser, in arrival order, plus whoever awaits their outcome.
#[derive(Debug, Default)]
pub(crate) struct RequestQueue {
    requests: VecDeque<BridgeRequest>,
    responders: HashMap<Uuid, Responder>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_request(&mut self, request: BridgeRequest, responder: Responder) {
        self.responders.insert(request.id, responder);
        self.requests.push_back(request);
    }

    pub fn has_request(&self, id: &Uuid) -> bool {
        self.responders.contains_key(id)
    }

    /// The oldest request. It stays queued until answered.
    pub fn read_request(&self) -> Option<&BridgeRequest> {
        self.requests.front()
    }

    /// Removes a request and hands its outcome to the waiting caller.
    pub fn resolve(&mut self, id: &Uuid, outcome: Result<Value, ProviderError>) -> bool {
        self.requests.retain(|request| request.id != *id);
        let Some(responder) = self.responders.remove(id) else { return false };
        // The caller may have given up waiting.
        let _ = responder.send(outcome);
        true
    }

    /// Fails every pending request with [`ProviderError::Closed`].
    pub fn close(&mut self) {
        self.requests.clear();
        for (_, responder) in self.responders.drain() {
            let _ = responder.send(Err(ProviderError::Closed));
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}
