use alloy_primitives::{Address, ChainId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// An EIP-1193 request waiting to be relayed by the browser page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub id: Uuid,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// EIP-1193 `ProviderRpcError` as reported by the injected wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Outcome of a relayed request, posted back by the browser page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub id: Uuid,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// Notifications forwarded from the injected wallet's event emitter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum WalletNotification {
    AccountsChanged {
        accounts: Vec<Address>,
    },
    ChainChanged {
        #[serde(rename = "chainId")]
        chain_id: String,
    },
    Disconnect,
}

/// Accounts and chain currently exposed through the bridge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub accounts: Vec<Address>,
    pub chain_id: Option<ChainId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BridgeApiResponse<T> {
    Ok { data: T },
    Error { message: String },
}

impl<T> BridgeApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::Ok { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }
}

impl BridgeApiResponse<()> {
    pub fn success() -> Self {
        Self::Ok { data: () }
    }
}
