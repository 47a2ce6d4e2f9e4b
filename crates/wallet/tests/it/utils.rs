//! A scripted stand-in for the relay page and the wallet behind it.

use std::time::Duration;

use coinpay_wallet::bridge::{
    SESSION_TOKEN_HEADER,
    types::{BridgeApiResponse, BridgeRequest, BridgeResponse, RpcErrorObject},
};
use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Debug)]
pub struct BrowserPage {
    client: reqwest::Client,
    base: String,
    token: String,
}

impl BrowserPage {
    /// Waits for the bridge to come up and loads its page the way a browser would.
    pub async fn open(urls: &mut mpsc::UnboundedReceiver<String>) -> Self {
        let base = tokio::time::timeout(Duration::from_secs(5), urls.recv())
            .await
            .expect("bridge never started")
            .expect("loader dropped");
        let client = reqwest::Client::new();
        let html = client.get(&base).send().await.unwrap().text().await.unwrap();
        let token = html
            .split_once(r#"const SESSION_TOKEN = ""#)
            .and_then(|(_, rest)| rest.split_once('"'))
            .map(|(token, _)| token.to_string())
            .expect("page embeds the session token");
        Self { client, base, token }
    }

    /// Next request queued for the wallet.
    pub async fn next_request(&self) -> BridgeRequest {
        for _ in 0..200 {
            let resp: BridgeApiResponse<BridgeRequest> = self
                .client
                .get(format!("{}/api/request", self.base))
                .header(SESSION_TOKEN_HEADER, &self.token)
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            if let BridgeApiResponse::Ok { data } = resp {
                return data;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no request queued");
    }

    /// Approves the next request, which must be `method`, with `result`.
    pub async fn approve(&self, method: &str, result: Value) -> BridgeRequest {
        let request = self.next_request().await;
        assert_eq!(request.method, method);
        self.respond(BridgeResponse { id: request.id, result: Some(result), error: None }).await;
        request
    }

    /// Rejects the next request, which must be `method`, the way a wallet does.
    pub async fn reject(&self, method: &str, code: i64, message: &str) {
        let request = self.next_request().await;
        assert_eq!(request.method, method);
        let error = RpcErrorObject { code, message: message.to_string() };
        self.respond(BridgeResponse { id: request.id, result: None, error: Some(error) }).await;
    }

    /// Emits a wallet notification.
    pub async fn notify(&self, event: Value) {
        let resp: BridgeApiResponse<()> = self
            .client
            .post(format!("{}/api/event", self.base))
            .header(SESSION_TOKEN_HEADER, &self.token)
            .json(&event)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(resp, BridgeApiResponse::success());
    }

    async fn respond(&self, response: BridgeResponse) {
        let resp: BridgeApiResponse<()> = self
            .client
            .post(format!("{}/api/response", self.base))
            .header(SESSION_TOKEN_HEADER, &self.token)
            .json(&response)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(resp, BridgeApiResponse::success());
    }
}
