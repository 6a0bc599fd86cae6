use axum_test::TestServer;
use fauxinnati_api::{create_router, AppState};
use fauxinnati_core::Settings;
use serde_json::{json, Value};

fn test_server() -> TestServer {
    let app = create_router(AppState::new(Settings::default()));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn graph_endpoint_returns_simple_graph() {
    let server = test_server();

    let resp = server
        .get("/api/upgrades_info/graph")
        .add_query_param("channel", "simple")
        .add_query_param("version", "4.17.5")
        .await;
    assert_eq!(resp.status_code(), 200);
    let ct = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(ct.contains("application/json"));
    assert!(resp.text().contains("\n  \"nodes\""), "expected pretty-printed JSON");

    let body: Value = resp.json();
    let versions: Vec<&str> = body["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["version"].as_str().unwrap())
        .collect();
    assert_eq!(versions, ["4.17.5", "4.17.6", "4.18.0"]);
    assert_eq!(body["edges"], json!([[0, 1], [0, 2]]));
    assert_eq!(body["conditionalEdges"], json!([]));
}

#[tokio::test]
async fn graph_endpoint_sets_architecture() {
    let server = test_server();

    let resp = server
        .get("/api/upgrades_info/graph?channel=risks-always&version=4.18.42&arch=amd64")
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    for node in body["nodes"].as_array().unwrap() {
        assert_eq!(node["metadata"]["release.openshift.io/architecture"], "amd64");
    }
    assert_eq!(
        body["conditionalEdges"][0]["risks"][0]["matchingRules"][0],
        json!({"type": "Always"})
    );
}

#[tokio::test]
async fn unknown_channel_returns_empty_graph() {
    let server = test_server();

    let resp = server
        .get("/api/upgrades_info/graph?channel=stable-4.17&version=4.17.0")
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body, json!({"nodes": [], "edges": [], "conditionalEdges": []}));
}

#[tokio::test]
async fn missing_parameters_are_rejected() {
    let server = test_server();

    for path in [
        "/api/upgrades_info/graph",
        "/api/upgrades_info/graph?channel=simple",
        "/api/upgrades_info/graph?version=4.17.5",
        "/api/upgrades_info/graph?channel=&version=4.17.5",
    ] {
        let resp = server.get(path).expect_failure().await;
        assert_eq!(resp.status_code(), 400, "{path}");
        let body: Value = resp.json();
        assert_eq!(body["status"], 400);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Missing required parameters: channel and version"));
    }
}

#[tokio::test]
async fn invalid_version_is_rejected() {
    let server = test_server();

    let resp = server
        .get("/api/upgrades_info/graph?channel=simple&version=not-a-version")
        .expect_failure()
        .await;
    assert_eq!(resp.status_code(), 400);
    let body: Value = resp.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid version format"));
}

#[tokio::test]
async fn minor_zero_channel_head_is_bad_request() {
    let server = test_server();

    let resp = server
        .get("/api/upgrades_info/graph?channel=channel-head&version=4.0.3")
        .expect_failure()
        .await;
    assert_eq!(resp.status_code(), 400);
}

#[tokio::test]
async fn non_get_methods_are_not_allowed() {
    let server = test_server();

    let resp = server
        .post("/api/upgrades_info/graph?channel=simple&version=4.17.5")
        .expect_failure()
        .await;
    assert_eq!(resp.status_code(), 405);

    let resp = server.put("/healthz").expect_failure().await;
    assert_eq!(resp.status_code(), 405);
}

#[tokio::test]
async fn probes_return_ok() {
    let server = test_server();

    for path in ["/healthz", "/readyz"] {
        let resp = server.get(path).await;
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.text(), "OK");
    }
}

#[tokio::test]
async fn failing_probe_returns_unavailable() {
    let mut settings = Settings::default();
    settings.health.probe_channel = "smoke-test".to_string();
    settings.health.probe_version = "4.0.0".to_string();
    let server = TestServer::new(create_router(AppState::new(settings))).unwrap();

    let resp = server.get("/readyz").expect_failure().await;
    assert_eq!(resp.status_code(), 503);
}

#[tokio::test]
async fn landing_page_lists_channels() {
    let server = test_server();

    let resp = server.get("/").await;
    assert_eq!(resp.status_code(), 200);
    let ct = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(ct.contains("text/html"), "expected HTML content-type");

    let page = resp.text();
    for name in [
        "version-not-found",
        "channel-head",
        "simple",
        "risks-always",
        "risks-matching",
        "risks-nonmatching",
        "smoke-test",
    ] {
        assert!(page.contains(&format!("<h3>{name}</h3>")), "missing {name}");
    }
    assert!(page.contains("<strong>4.18.42</strong>"));
    assert!(page.contains("/api/upgrades_info/graph"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = test_server();

    let resp = server.get("/nope").expect_failure().await;
    assert_eq!(resp.status_code(), 404);
}

#[tokio::test]
async fn repeated_parameters_use_first_value() {
    let server = test_server();

    let resp = server
        .get("/api/upgrades_info/graph?channel=simple&channel=x&version=4.17.5&version=bogus")
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["nodes"][0]["version"], "4.17.5");
    assert_eq!(body["edges"], json!([[0, 1], [0, 2]]));
}

#[tokio::test]
async fn smoke_test_json_keeps_repeated_versions() {
    let server = test_server();

    let resp = server
        .get("/api/upgrades_info/graph?channel=smoke-test&version=4.17.6")
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["nodes"][3]["version"], "4.17.7");
    assert_eq!(body["nodes"][5]["version"], "4.17.7");
}
