//! Contract tests for RpcWallet and SessionBinder against a JSON-RPC node.

use std::sync::Arc;

use pharma_client::{ClientConfig, Deployments, PharmaClient, SessionBinder, WalletError, WalletProvider};
use pharma_core::ChainId;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

fn test_client(uri: String) -> PharmaClient {
    let config = ClientConfig {
        rpc_url: uri,
        timeout_secs: 2,
        ..ClientConfig::default()
    };
    PharmaClient::with_deployments(&config, Deployments::new()).unwrap()
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": code, "message": message}
    }))
}

#[tokio::test]
async fn bind_prompts_once_and_reads_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_requestAccounts"})))
        .respond_with(rpc_result(json!([ACCOUNT, "0x00000000000000000000000000000000000000bb"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "net_version"})))
        .respond_with(rpc_result(json!("5777")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let binder = SessionBinder::new(Arc::new(client.wallet().clone()));
    let first = binder.bind().await.unwrap();
    let again = binder.bind().await.unwrap();

    assert_eq!(first.account.as_str(), ACCOUNT);
    assert_eq!(first.chain_id, ChainId(5777));
    assert_eq!(first, again);
}

#[tokio::test]
async fn falls_back_to_eth_accounts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_requestAccounts"})))
        .respond_with(rpc_error(-32601, "Method eth_requestAccounts not supported."))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_accounts"})))
        .respond_with(rpc_result(json!([ACCOUNT])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let accounts = test_client(mock_server.uri()).wallet().request_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn user_rejection_is_denied_access() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_requestAccounts"})))
        .respond_with(rpc_error(4001, "User rejected the request."))
        .mount(&mock_server)
        .await;

    let err = test_client(mock_server.uri()).wallet().request_accounts().await.unwrap_err();
    assert!(matches!(err, WalletError::UserDeniedAccess), "got {err:?}");
}

#[tokio::test]
async fn hex_network_id_is_accepted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "net_version"})))
        .respond_with(rpc_result(json!("0x539")))
        .mount(&mock_server)
        .await;

    let id = test_client(mock_server.uri()).wallet().network_id().await.unwrap();
    assert_eq!(id, ChainId(1337));
}

#[tokio::test]
async fn no_provider_is_no_wallet_detected() {
    let err = test_client("http://127.0.0.1:1".into())
        .wallet()
        .request_accounts()
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::NoWalletDetected(_)), "got {err:?}");
}
