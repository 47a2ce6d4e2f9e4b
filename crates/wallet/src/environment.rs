//! Execution context checks.
//!
//! Wallet pairing needs someone in front of a browser. Headless contexts (CI jobs, piped
//! invocations, pre-rendering) must never start a handshake.

/// Describes where the session manager runs.
pub trait Environment: Send + Sync {
    /// Origin of the interactive surface the wallet is paired from, or `None` when headless.
    fn origin(&self) -> Option<String>;

    fn is_interactive(&self) -> bool {
        self.origin().is_some()
    }
}

/// An interactive context served from a fixed origin.
#[derive(Clone, Debug)]
pub struct Interactive {
    origin: String,
}

impl Interactive {
    pub fn new(origin: impl Into<String>) -> Self {
        Self { origin: origin.into() }
    }
}

impl Environment for Interactive {
    fn origin(&self) -> Option<String> {
        Some(self.origin.clone())
    }
}

/// A context without any user-facing surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Environment for Headless {
    fn origin(&self) -> Option<String> {
        None
    }
}
