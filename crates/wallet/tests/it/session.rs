use std::sync::Arc;

use alloy_primitives::{Address, TxHash, address, b256, bytes};
use coinpay_wallet::{
    BridgeLoader, Connection, Headless, Interactive, PaymentForm, ProviderError, SessionEvent,
    SessionManager, SessionState, WalletConfig, WalletError,
};
use serde_json::json;
use tokio::sync::mpsc;

use crate::utils::BrowserPage;

const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
const TX_HASH: TxHash = b256!("0x7e2b1d5a9a4cf1c3f6d35c2b48f0a8d3f1c0e9b8a7d6c5b4a39281706f5e4d3c");

fn manager(interactive: bool) -> (SessionManager, mpsc::UnboundedReceiver<String>) {
    crate::init_tracing();
    let (tx, rx) = mpsc::unbounded_channel();
    let loader = BridgeLoader::new(0).on_listen(move |url| {
        let _ = tx.send(url.to_string());
    });
    let config = WalletConfig { project_id: Some("test-project".to_string()), ..Default::default() };
    let manager = if interactive {
        SessionManager::new(config, Arc::new(loader), Arc::new(Interactive::new("http://localhost:3000")))
    } else {
        SessionManager::new(config, Arc::new(loader), Arc::new(Headless))
    };
    (manager, rx)
}

/// Connects through the page, approving with `ALICE` on mainnet.
async fn connect(manager: &SessionManager, urls: &mut mpsc::UnboundedReceiver<String>) -> BrowserPage {
    let connecting = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.connect().await })
    };
    let page = BrowserPage::open(urls).await;
    page.approve("eth_requestAccounts", json!([ALICE])).await;
    page.approve("eth_chainId", json!("0x1")).await;

    let connection = connecting.await.unwrap().unwrap();
    assert_eq!(connection, Connection { address: ALICE, chain_id: 1 });
    page
}

#[tokio::test(flavor = "multi_thread")]
async fn connect_sign_pay_disconnect() {
    let (manager, mut urls) = manager(true);
    let mut events = manager.subscribe();

    let page = connect(&manager, &mut urls).await;
    assert_eq!(manager.state(), SessionState::Connected);
    assert_eq!(manager.current_account(), Some(ALICE));
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Ready);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Connected(Connection { address: ALICE, chain_id: 1 })
    );

    let dispatcher = manager.dispatcher();
    let signing = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.sign_message("Hello, CoinPay!").await })
    };
    let request = page.approve("personal_sign", json!("0xc0ffee")).await;
    assert_eq!(request.params, json!(["Hello, CoinPay!", ALICE]));
    assert_eq!(signing.await.unwrap().unwrap(), bytes!("c0ffee"));

    let paying = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { PaymentForm::new(BOB.to_string(), "1.5").submit(&dispatcher).await })
    };
    let request = page.approve("eth_sendTransaction", json!(TX_HASH)).await;
    let tx = &request.params[0];
    assert_eq!(tx["from"], json!(ALICE));
    assert_eq!(tx["to"], json!(BOB));
    assert_eq!(tx["value"], "0x14d1120d7b160000");
    assert_eq!(tx["gas"], "0x5208");

    let receipt = paying.await.unwrap().unwrap();
    assert_eq!(receipt.tx_hash, TX_HASH);
    assert_eq!(receipt.explorer_url, format!("https://etherscan.io/tx/{TX_HASH}"));

    manager.disconnect().await;
    assert_eq!(manager.state(), SessionState::Uninitialized);
    assert!(manager.current_account().is_none());
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Disconnected);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_connection_keeps_session() {
    let (manager, mut urls) = manager(true);
    let connecting = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.connect().await })
    };

    let page = BrowserPage::open(&mut urls).await;
    page.reject("eth_requestAccounts", 4001, "User rejected the request.").await;

    match connecting.await.unwrap() {
        Err(WalletError::Connection(ProviderError::UserRejected)) => {}
        other => panic!("expected a rejected connection, got {other:?}"),
    }
    assert_eq!(manager.state(), SessionState::Ready);
    assert!(manager.current_account().is_none());
    manager.disconnect().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn wallet_side_disconnect_resets_session() {
    let (manager, mut urls) = manager(true);
    let page = connect(&manager, &mut urls).await;
    let mut events = manager.subscribe();

    page.notify(json!({ "event": "chainChanged", "chainId": "0x89" })).await;
    assert_eq!(events.recv().await.unwrap(), SessionEvent::ChainChanged(137));

    page.notify(json!({ "event": "disconnect" })).await;
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Disconnected);
    assert_eq!(manager.state(), SessionState::Uninitialized);
    assert!(matches!(
        manager.dispatcher().sign_message("too late").await,
        Err(WalletError::NotConnected)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn headless_never_starts_bridge() {
    let (manager, mut urls) = manager(false);

    assert!(manager.initialize().await.is_none());
    assert!(matches!(manager.connect().await, Err(WalletError::Initialization(None))));
    assert_eq!(manager.state(), SessionState::Uninitialized);
    assert!(urls.try_recv().is_err());
}
