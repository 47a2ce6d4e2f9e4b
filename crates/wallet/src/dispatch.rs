use alloy_primitives::{Bytes, TxHash};
use alloy_rpc_types::TransactionRequest;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    error::{ProviderError, WalletError},
    manager::SessionManager,
    provider::{ETH_SEND_TRANSACTION, PERSONAL_SIGN, RequestArguments},
    store::Session,
};

/// Forwards signing and transaction requests over the live session.
#[derive(Clone, Debug)]
pub struct RequestDispatcher {
    manager: SessionManager,
}

impl RequestDispatcher {
    pub fn new(manager: SessionManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// Signs `message` with the first connected account via `personal_sign`.
    pub async fn sign_message(&self, message: &str) -> Result<Bytes, WalletError> {
        let session = self.session()?;
        let account = session.account().ok_or(WalletError::NotConnected)?;

        let args = RequestArguments::new(PERSONAL_SIGN, json!([message, account]));
        trace!(session = %session.id(), %account, "requesting message signature");
        request(&session, args).await.map_err(WalletError::Signing)
    }

    /// Submits `tx` via `eth_sendTransaction` and returns its hash.
    ///
    /// The transaction is forwarded as is; callers are responsible for unit conversion.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, WalletError> {
        let session = self.session()?;

        let args = RequestArguments::new(ETH_SEND_TRANSACTION, json!([tx]));
        trace!(session = %session.id(), ?tx, "requesting transaction");
        request(&session, args).await.map_err(WalletError::Submission)
    }

    fn session(&self) -> Result<Session, WalletError> {
        self.manager.current_handle().ok_or(WalletError::NotConnected)
    }
}

async fn request<T: DeserializeOwned>(
    session: &Session,
    args: RequestArguments,
) -> Result<T, ProviderError> {
    let method = args.method.clone();
    let value: Value = session.handle().request(args).await?;
    serde_json::from_value(value)
        .map_err(|err| ProviderError::InvalidResponse(format!("{method}: {err}")))
}
