//! End-to-end tests against an in-process WebSocket server.
//!
//! The server plays the service side of one conversation: it checks each
//! outbound message and answers with recorded frames from `fixtures/events/`.

use blocknative_core::{Config, Header, Message};
use blocknative_ws::{BlocknativeClient, ClientError, ClientOptions, Connection};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as Frame;

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn fixture(name: &str) -> String {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.pop();
    p.pop();
    p.push("fixtures");
    p.push("events");
    p.push(name);
    std::fs::read_to_string(&p).unwrap_or_else(|e| panic!("cannot read {}: {e}", p.display()))
}

/// Serve one connection. For each expected `(categoryCode, eventCode)` read a
/// frame, check its codes, and send the paired reply. Returns every frame the
/// client sent.
async fn serve_once(
    listener: TcpListener,
    script: Vec<((&'static str, &'static str), String)>,
) -> Vec<Value> {
    let (tcp, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
    let mut received = Vec::new();

    for ((category, event), reply) in script {
        let text = loop {
            match ws.next().await.unwrap().unwrap() {
                Frame::Text(text) => break text,
                _ => continue,
            }
        };
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["categoryCode"], category);
        assert_eq!(value["eventCode"], event);
        received.push(value);
        ws.send(Frame::Text(reply.into())).await.unwrap();
    }

    // drain until the client closes
    while let Some(Ok(frame)) = ws.next().await {
        if let Frame::Close(_) = frame {
            break;
        }
    }
    received
}

async fn start(
    script: Vec<((&'static str, &'static str), String)>,
) -> (ClientOptions, JoinHandle<Vec<Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(serve_once(listener, script));
    let options = ClientOptions {
        scheme: "ws".into(),
        host: format!("127.0.0.1:{port}"),
        path: "/v0".into(),
        api_key: Some("test-key".into()),
        print_connect_response: true,
    };
    (options, server)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn handshake_subscribe_and_receive_event() {
    let (options, server) = start(vec![
        (("initialize", "checkDappId"), fixture("initialize_ack.json")),
        (("accountAddress", "watch"), fixture("address_txpool_internal.json")),
        (("configs", "put"), json!({ "version": 1, "status": "ok" }).to_string()),
    ])
    .await;

    let mut client = BlocknativeClient::connect(options).await.unwrap();
    assert_eq!(client.api_key(), "test-key");
    assert!(client.url().starts_with("ws://127.0.0.1:"));
    assert!(client.url().ends_with("/v0"));

    let ack = client.initialize(client.mainnet_header()).await.unwrap();
    assert_eq!(ack.status, "ok");

    let address = "0xfa6de2697D59E88Ed7Fc4dFE5A33daC43565ea41";
    client
        .send_json(&Message::subscribe_address(client.mainnet_header(), address))
        .await
        .unwrap();
    let frame = client.receive_event().await.unwrap();
    let tx = frame.transaction().unwrap();
    assert_eq!(tx.internal_transactions.len(), 1);
    assert_eq!(tx.net_balance_changes.len(), 2);

    let cfg = Config::new(address, false, Some(json!(["event Transfer(address,address,uint256)"])));
    client
        .send_json(&Message::put_configuration(client.mainnet_header(), cfg))
        .await
        .unwrap();
    let reply: Value = client.receive_json().await.unwrap();
    assert_eq!(reply["status"], "ok");

    client.close().await.unwrap();
    client.close().await.unwrap();

    let sent = server.await.unwrap();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|m| m["dappId"] == "test-key"));
    assert_eq!(sent[1]["account"]["address"], address);
    assert_eq!(sent[2]["config"]["scope"], address);
    assert!(sent[2]["config"].get("watchAddress").is_none());
}

#[tokio::test]
async fn rejected_key() {
    let refusal = json!({
        "version": 1,
        "status": "error",
        "reason": "'bad-key' is not a valid API key"
    });
    let (options, server) =
        start(vec![(("initialize", "checkDappId"), refusal.to_string())]).await;

    let mut client = BlocknativeClient::connect(options).await.unwrap();
    let header = Header::mainnet("bad-key");
    let err = client.initialize(header).await.unwrap_err();
    match err {
        ClientError::Rejected { reason } => assert!(reason.contains("not a valid API key")),
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert!(!ClientError::Rejected { reason: String::new() }.is_retryable());

    client.close().await.unwrap();
    let sent = server.await.unwrap();
    assert_eq!(sent[0]["dappId"], "bad-key");
}

#[tokio::test]
async fn send_after_close_is_closed_error() {
    let (options, server) = start(vec![]).await;
    let mut client = BlocknativeClient::connect(options).await.unwrap();
    client.close().await.unwrap();

    let msg = Message::subscribe_transaction(client.mainnet_header(), "0x01");
    let err = client.send_json(&msg).await.unwrap_err();
    assert!(matches!(err, ClientError::Closed));
    assert!(server.await.unwrap().is_empty());
}

#[tokio::test]
async fn connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let options = ClientOptions {
        scheme: "ws".into(),
        host: format!("127.0.0.1:{port}"),
        ..Default::default()
    };
    let err = BlocknativeClient::connect(options).await.err().unwrap();
    assert!(matches!(err, ClientError::Connect { .. }));
    assert!(err.is_retryable());
}
