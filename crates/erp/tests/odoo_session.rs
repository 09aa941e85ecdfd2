use aria_core::config::ErpConfig;
use aria_erp::{ErpError, ErpGateway, OdooClient, OdooGateway, RecordSource, SearchDomain, SearchOptions};
use httpmock::prelude::*;
use serde_json::json;

fn config_for(server: &MockServer) -> ErpConfig {
    ErpConfig {
        url: server.base_url(),
        database: "produccion".to_string(),
        username: "admin".to_string(),
        password: "admin-password".to_string().into(),
        timeout_secs: 5,
    }
}

fn access_denied() -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": 2,
        "error": {
            "code": 200,
            "message": "Odoo Server Error",
            "data": {"name": "odoo.exceptions.AccessDenied", "message": "Access Denied"}
        }
    })
}

#[tokio::test]
async fn session_is_acquired_once_and_reused() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/jsonrpc")
                .body_contains("\"authenticate\"")
                .body_contains("\"produccion\"");
            then.status(200).json_body(json!({"jsonrpc": "2.0", "id": 1, "result": 7}));
        })
        .await;
    let execute = server
        .mock_async(|when, then| {
            when.method(POST).path("/jsonrpc").body_contains("\"execute_kw\"");
            then.status(200).json_body(json!({"jsonrpc": "2.0", "id": 2, "result": []}));
        })
        .await;

    let client = OdooClient::from_config(&config_for(&server)).expect("client should build");
    let domain = SearchDomain::all();
    let options = SearchOptions::fields(&["name"]);

    client.call("res.partner", "search_read", &domain, &options).await.expect("first call");
    client.call("res.partner", "search_read", &domain, &options).await.expect("second call");

    login.assert_hits_async(1).await;
    execute.assert_hits_async(2).await;
}

#[tokio::test]
async fn falsy_uid_is_an_authentication_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/jsonrpc").body_contains("\"authenticate\"");
            then.status(200).json_body(json!({"jsonrpc": "2.0", "id": 1, "result": false}));
        })
        .await;

    let gateway = OdooGateway::new(
        OdooClient::from_config(&config_for(&server)).expect("client should build"),
    );
    let result = gateway.customers(20).await;

    let Err(error) = result else { panic!("login with a falsy uid should fail") };
    assert_eq!(
        error,
        ErpError::Authentication("the configured credentials were rejected".to_string())
    );
    let message = error.to_string();
    assert!(!message.contains("admin"));
    assert!(!message.contains("produccion"));
}

#[tokio::test]
async fn rejected_session_is_renewed_once_before_failing() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/jsonrpc").body_contains("\"authenticate\"");
            then.status(200).json_body(json!({"jsonrpc": "2.0", "id": 1, "result": 7}));
        })
        .await;
    let execute = server
        .mock_async(|when, then| {
            when.method(POST).path("/jsonrpc").body_contains("\"execute_kw\"");
            then.status(200).json_body(access_denied());
        })
        .await;

    let client = OdooClient::from_config(&config_for(&server)).expect("client should build");
    let result = client
        .call("sale.order", "search_read", &SearchDomain::all(), &SearchOptions::default())
        .await;

    assert_eq!(result, Err(ErpError::Authentication("Access Denied".to_string())));
    login.assert_hits_async(2).await;
    execute.assert_hits_async(2).await;
}

#[tokio::test]
async fn renewed_session_serves_later_calls() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/jsonrpc").body_contains("\"authenticate\"");
            then.status(200).json_body(json!({"jsonrpc": "2.0", "id": 1, "result": 7}));
        })
        .await;
    let mut rejected = server
        .mock_async(|when, then| {
            when.method(POST).path("/jsonrpc").body_contains("\"execute_kw\"");
            then.status(200).json_body(access_denied());
        })
        .await;

    let client = OdooClient::from_config(&config_for(&server)).expect("client should build");
    let domain = SearchDomain::all();
    let options = SearchOptions::default();
    let first = client.call("sale.order", "search_read", &domain, &options).await;
    assert!(matches!(first, Err(ErpError::Authentication(_))));

    rejected.delete_async().await;
    let accepted = server
        .mock_async(|when, then| {
            when.method(POST).path("/jsonrpc").body_contains("\"execute_kw\"");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": 5,
                "result": [{"id": 1, "name": "S00001"}]
            }));
        })
        .await;

    let rows = client.call("sale.order", "search_read", &domain, &options).await.expect("renewed");

    assert_eq!(rows.len(), 1);
    accepted.assert_hits_async(1).await;
    login.assert_hits_async(2).await;
}
