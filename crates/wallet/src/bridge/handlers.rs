use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{Html, IntoResponse},
};

use crate::{
    bridge::{
        app,
        state::BridgeState,
        types::{
            BridgeApiResponse, BridgeRequest, BridgeResponse, ConnectionInfo, WalletNotification,
        },
    },
    error::ProviderError,
    provider::ProviderEvent,
    units,
};

pub(crate) async fn serve_index(State(state): State<Arc<BridgeState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    (headers, Html(app::render(&state.session_token(), state.options())))
}

/// Oldest request the page has not answered yet.
pub(crate) async fn get_next_request(
    State(state): State<Arc<BridgeState>>,
) -> Json<BridgeApiResponse<BridgeRequest>> {
    match state.read_next_request() {
        Some(request) => Json(BridgeApiResponse::ok(request)),
        None => Json(BridgeApiResponse::error("No pending request")),
    }
}

pub(crate) async fn post_response(
    State(state): State<Arc<BridgeState>>,
    Json(body): Json<BridgeResponse>,
) -> Json<BridgeApiResponse<()>> {
    if !state.has_request(&body.id) {
        return Json(BridgeApiResponse::error("Unknown request id"));
    }

    let outcome = match (body.result, body.error) {
        (_, Some(err)) => Err(ProviderError::from_rpc(err.code, err.message)),
        (Some(result), None) => Ok(result),
        // `wallet_switchEthereumChain` resolves to `null`, which the page may omit.
        (None, None) => Ok(serde_json::Value::Null),
    };
    debug!(id = %body.id, ok = outcome.is_ok(), "bridge response received");
    state.resolve(&body.id, outcome);

    Json(BridgeApiResponse::success())
}

pub(crate) async fn post_event(
    State(state): State<Arc<BridgeState>>,
    Json(notification): Json<WalletNotification>,
) -> Json<BridgeApiResponse<()>> {
    let event = match notification {
        WalletNotification::AccountsChanged { accounts } => {
            state.set_accounts(accounts.clone());
            ProviderEvent::AccountsChanged(accounts)
        }
        WalletNotification::ChainChanged { chain_id } => match units::parse_chain_id(&chain_id) {
            Ok(id) => {
                state.set_chain_id(id);
                ProviderEvent::ChainChanged(id)
            }
            Err(err) => return Json(BridgeApiResponse::error(err.to_string())),
        },
        WalletNotification::Disconnect => {
            state.set_accounts(Vec::new());
            ProviderEvent::Disconnect
        }
    };
    debug!(?event, "wallet notification");
    state.emit(event);

    Json(BridgeApiResponse::success())
}

pub(crate) async fn get_connection(
    State(state): State<Arc<BridgeState>>,
) -> Json<BridgeApiResponse<ConnectionInfo>> {
    Json(BridgeApiResponse::ok(state.connection()))
}
