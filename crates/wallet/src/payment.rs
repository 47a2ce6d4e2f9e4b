//! Payment form submission.
//!
//! Mirrors what the checkout form does with its two inputs: validate them, convert the ether
//! amount into a `{from, to, value, gas}` transfer and hand it to the wallet.

use std::str::FromStr;

use alloy_chains::Chain;
use alloy_primitives::{Address, ChainId, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use serde::{Deserialize, Serialize};

use crate::{
    dispatch::RequestDispatcher,
    error::WalletError,
    units::{self, UnitsError},
};

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Explorer used for chains without a known one.
const DEFAULT_EXPLORER: &str = "https://etherscan.io";

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Please connect your wallet first")]
    NotConnected,
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Invalid recipient address `{0}`")]
    InvalidRecipient(String),
    #[error(transparent)]
    InvalidAmount(#[from] UnitsError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// The two user inputs of the payment form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    pub recipient: String,
    /// Amount in ether, as typed.
    pub amount: String,
}

impl PaymentForm {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self { recipient: recipient.into(), amount: amount.into() }
    }

    /// Validates the inputs and builds the transfer sent from `from`.
    pub fn to_transaction(&self, from: Address) -> Result<TransactionRequest, PaymentError> {
        let (recipient, amount) = (self.recipient.trim(), self.amount.trim());
        if recipient.is_empty() || amount.is_empty() {
            return Err(PaymentError::MissingFields);
        }

        let to = Address::from_str(recipient)
            .map_err(|_| PaymentError::InvalidRecipient(recipient.to_string()))?;
        let value: U256 = units::parse_amount(amount)?;

        Ok(TransactionRequest::default().from(from).to(to).value(value).gas_limit(TRANSFER_GAS_LIMIT))
    }

    /// Sends the payment from the connected account.
    pub async fn submit(&self, dispatcher: &RequestDispatcher) -> Result<PaymentReceipt, PaymentError> {
        let manager = dispatcher.manager();
        let from = manager.current_account().ok_or(PaymentError::NotConnected)?;
        let tx = self.to_transaction(from)?;

        let chain_id = manager
            .current_handle()
            .and_then(|session| session.chain_id())
            .unwrap_or(manager.config().chain_id);

        let tx_hash = dispatcher.send_transaction(&tx).await?;
        debug!(%tx_hash, %from, to = %self.recipient, amount = %self.amount, "payment submitted");
        Ok(PaymentReceipt::new(tx_hash, chain_id))
    }
}

/// Outcome of a submitted payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub tx_hash: TxHash,
    pub chain_id: ChainId,
    pub explorer_url: String,
}

impl PaymentReceipt {
    pub fn new(tx_hash: TxHash, chain_id: ChainId) -> Self {
        Self { tx_hash, chain_id, explorer_url: explorer_tx_url(chain_id, &tx_hash) }
    }
}

/// Block explorer link for a transaction.
pub fn explorer_tx_url(chain_id: ChainId, tx_hash: &TxHash) -> String {
    let base = Chain::from_id(chain_id)
        .etherscan_urls()
        .map(|(_, base)| base)
        .unwrap_or(DEFAULT_EXPLORER);
    format!("{}/tx/{tx_hash}", base.trim_end_matches('/'))
}
