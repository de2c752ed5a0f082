//! End-to-end tests: client → proxy → mock Apps Script backend.

use axum::http::StatusCode;
use gas_proxy::config::ProxyConfig;
use serde_json::{json, Value};

mod common;

fn config_for(backend: std::net::SocketAddr) -> ProxyConfig {
    ProxyConfig::with_base_url(format!("http://{backend}/macros/s/abc/exec"))
}

#[tokio::test]
async fn test_json_body_relayed() {
    let (backend, recorder) = common::start_mock_backend(200, r#"{"ok":true}"#).await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{proxy}/api/employee/profile?id=EMP_1"))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"ok": true}));

    assert_eq!(
        recorder.targets(),
        vec!["/macros/s/abc/exec?path=employee%2Fprofile&id=EMP_1".to_string()]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_json_key_order_preserved() {
    let raw = r#"{"zeta":1,"alpha":2,"mid":{"b":1,"a":2},"rate":1.10}"#;
    let (backend, _) = common::start_mock_backend(200, raw).await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{proxy}/api/employees"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), raw);

    shutdown.trigger();
}

#[tokio::test]
async fn test_text_body_relayed() {
    let (backend, _) = common::start_mock_backend(200, "plain text").await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{proxy}/api/report"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(res.text().await.unwrap(), "plain text");

    shutdown.trigger();
}

#[tokio::test]
async fn test_backend_status_passed_through() {
    let (backend, _) = common::start_mock_backend(404, r#"{"error":"unknown route"}"#).await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{proxy}/api/missing"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "unknown route"})
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_inbound_path_param_not_forwarded() {
    let (backend, recorder) = common::start_mock_backend(200, "{}").await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{proxy}/api/a/b/c?path=../admin&q=hello%20world"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let targets = recorder.targets();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0], "/macros/s/abc/exec?path=a%2Fb%2Fc&q=hello+world");

    shutdown.trigger();
}

#[tokio::test]
async fn test_mount_root_forwards_empty_path() {
    let (backend, recorder) = common::start_mock_backend(200, "{}").await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    for uri in ["/api", "/api/"] {
        let res = common::client()
            .get(format!("http://{proxy}{uri}"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
    }

    assert_eq!(
        recorder.targets(),
        vec![
            "/macros/s/abc/exec?path=".to_string(),
            "/macros/s/abc/exec?path=".to_string()
        ]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_non_get_makes_no_backend_call() {
    let (backend, recorder) = common::start_mock_backend(200, "{}").await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;
    let client = common::client();

    let post = client
        .post(format!("http://{proxy}/api/employee"))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(post.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = post.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");

    let put = client
        .put(format!("http://{proxy}/api/employee"))
        .send()
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::METHOD_NOT_ALLOWED);

    let options = client
        .request(reqwest::Method::OPTIONS, format!("http://{proxy}/api/employee?path=x"))
        .send()
        .await
        .unwrap();
    assert_eq!(options.status(), StatusCode::OK);
    assert_eq!(options.headers()["access-control-allow-methods"], "GET,OPTIONS");
    assert_eq!(options.headers()["access-control-allow-headers"], "Content-Type");
    assert!(options.text().await.unwrap().is_empty());

    assert_eq!(recorder.calls(), 0, "no request should reach the backend");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_backend_is_proxy_error() {
    // Bind then drop to get a port nothing listens on.
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let (proxy, shutdown) = common::start_proxy(config_for(dead_addr)).await;

    let res = common::client()
        .get(format!("http://{proxy}/api/employee"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "PROXY_ERROR");
    let message = body["error"]["message"].as_str().unwrap().to_lowercase();
    assert!(
        message.contains("connect") || message.contains("refused"),
        "message should carry the connect cause: {message}"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_base_url_makes_no_backend_call() {
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(format!("http://{proxy}/api/employee/profile"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": {"message": "GAS_BASE_URL is not configured", "code": "MISSING_GAS_BASE_URL"}
        })
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_mount_prefix() {
    let (backend, recorder) = common::start_programmable_backend(|target| async move {
        (200, json!({ "seen": target }).to_string())
    })
    .await;

    let mut config = config_for(backend);
    config.backend.mount_prefix = "/gas".into();
    let (proxy, shutdown) = common::start_proxy(config).await;
    let client = common::client();

    let res = client
        .get(format!("http://{proxy}/gas/sheet%201/rows"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["seen"], "/macros/s/abc/exec?path=sheet%201%2Frows");

    let res = client
        .get(format!("http://{proxy}/api/sheet"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(recorder.calls(), 1);

    shutdown.trigger();
}
