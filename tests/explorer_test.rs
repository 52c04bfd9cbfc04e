mod common;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use common::*;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use vesper_metadata::explorer::{birth_block, EtherscanClient, ExplorerError, TransactionExplorer};
use vesper_metadata::Chain;

#[derive(Clone)]
struct MockApi {
    status: StatusCode,
    body: Value,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn txlist(
    State(api): State<MockApi>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    api.queries.lock().unwrap().push(params);
    (api.status, Json(api.body.clone())).into_response()
}

async fn serve(api: MockApi) -> SocketAddr {
    let app = Router::new().route("/api", get(txlist)).with_state(api);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn mock(status: StatusCode, body: Value) -> MockApi {
    MockApi {
        status,
        body,
        queries: Arc::new(Mutex::new(Vec::new())),
    }
}

#[tokio::test]
async fn test_txlist_query_and_creation_block() {
    let api = mock(
        StatusCode::OK,
        json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "blockNumber": "11869489",
                "contractAddress": VETH.to_lowercase(),
                "hash": "0x01"
            }]
        }),
    );
    let queries = api.queries.clone();
    let server = serve(api).await;

    let client = EtherscanClient::new(format!("http://{}/api", server), Some("KEY".to_string()));
    let block = birth_block(&client, addr(VETH), Chain::Ethereum).await.unwrap();
    assert_eq!(block, 11_869_489);

    let queries = queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    let q = &queries[0];
    assert_eq!(q["module"], "account");
    assert_eq!(q["action"], "txlist");
    assert_eq!(q["address"], VETH);
    assert_eq!(q["startblock"], "11400000");
    assert_eq!(q["page"], "1");
    assert_eq!(q["offset"], "1");
    assert_eq!(q["sort"], "asc");
    assert_eq!(q["apikey"], "KEY");
}

#[tokio::test]
async fn test_avalanche_scans_from_its_own_start_block() {
    let api = mock(
        StatusCode::OK,
        json!({ "status": "0", "message": "No transactions found", "result": [] }),
    );
    let queries = api.queries.clone();
    let server = serve(api).await;

    let client = EtherscanClient::new(format!("http://{}/api", server), None);
    let block = birth_block(&client, addr(VETH), Chain::Avalanche).await.unwrap();
    assert_eq!(block, 0);

    let queries = queries.lock().unwrap();
    assert_eq!(queries[0]["startblock"], "9450000");
    assert!(!queries[0].contains_key("apikey"));
}

#[tokio::test]
async fn test_unrelated_first_transaction_gives_zero() {
    let api = mock(
        StatusCode::OK,
        json!({
            "status": "1",
            "message": "OK",
            "result": [{ "blockNumber": "20000000", "contractAddress": "" }]
        }),
    );
    let server = serve(api).await;

    let client = EtherscanClient::new(format!("http://{}/api", server), None);
    let block = birth_block(&client, addr(VETH), Chain::Polygon).await.unwrap();
    assert_eq!(block, 0);
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let server = serve(mock(StatusCode::SERVICE_UNAVAILABLE, json!({}))).await;

    let client = EtherscanClient::new(format!("http://{}/api", server), None);
    let err = client.first_transaction(addr(VETH), 0).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_rate_limit_payload_is_a_decode_error() {
    let api = mock(
        StatusCode::OK,
        json!({ "status": "0", "message": "NOTOK", "result": "Max rate limit reached" }),
    );
    let server = serve(api).await;

    let client = EtherscanClient::new(format!("http://{}/api", server), None);
    let err = birth_block(&client, addr(VETH), Chain::Ethereum).await.unwrap_err();
    assert!(matches!(err, ExplorerError::JsonError(_)));
}
