use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use alloy_primitives::{Address, ChainId};
use parking_lot::RwLock;

use crate::provider::ProviderHandle;

/// Process-unique identifier of a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// A live wallet session: an initialized provider handle plus what it currently knows.
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    handle: Arc<dyn ProviderHandle>,
}

impl Session {
    pub(crate) fn new(handle: Arc<dyn ProviderHandle>) -> Self {
        Self { id: SessionId::next(), handle }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The raw provider handle.
    pub fn handle(&self) -> &Arc<dyn ProviderHandle> {
        &self.handle
    }

    /// First approved account, if any.
    pub fn account(&self) -> Option<Address> {
        self.handle.accounts().first().copied()
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.handle.chain_id()
    }
}

/// Holds the single shared session. Performs no validation.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Session> {
        self.session.read().clone()
    }

    pub fn set(&self, session: Option<Session>) {
        *self.session.write() = session;
    }

    pub fn take(&self) -> Option<Session> {
        self.session.write().take()
    }

    /// Clears the stored session if it is the one identified by `id`.
    pub fn clear_if(&self, id: SessionId) -> bool {
        let mut session = self.session.write();
        if session.as_ref().is_some_and(|s| s.id == id) {
            *session = None;
            return true;
        }
        false
    }

    /// Returns `true` if the stored session is the one identified by `id`.
    pub fn holds(&self, id: SessionId) -> bool {
        self.session.read().as_ref().is_some_and(|s| s.id == id)
    }
}
