//! CLI integration tests against a mock API.
//!
//! Each test starts a wiremock server standing in for the token endpoints
//! and a protected resource, and gives the binary its own store directory.

mod common;

use common::{jwt, run_cli_failure, run_cli_success};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_login(server: &MockServer, access: &str) {
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({ "username": "alice", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": access,
            "refresh": "refresh-1",
        })))
        .mount(server)
        .await;
}

async fn login(store: &TempDir, host: &str) {
    run_cli_success(
        &["login", "--username", "alice", "--password", "secret"],
        store.path(),
        Some(host),
    )
    .await;
}

#[tokio::test]
async fn test_login_persists_credentials() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt("a1", 300, true)).await;
    let store = TempDir::new().unwrap();

    let stdout = run_cli_success(
        &["login", "--username", "alice", "--password", "secret"],
        store.path(),
        Some(&server.uri()),
    )
    .await;

    assert!(stdout.contains("Logged in successfully"));
    assert!(stdout.contains("Privileged: yes"));
    assert_eq!(
        std::fs::read_to_string(store.path().join("refresh")).unwrap(),
        "refresh-1"
    );

    let whoami = run_cli_success(&["whoami", "--json"], store.path(), None).await;
    let info: Value = serde_json::from_str(&whoami).unwrap();
    assert_eq!(info["signed_in"], json!(true));
    assert_eq!(info["is_privileged"], json!(true));
    assert_eq!(info["access_expired"], json!(false));
}

#[tokio::test]
async fn test_login_form_validation_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let store = TempDir::new().unwrap();

    let (_, stderr) = run_cli_failure(&["login"], store.path(), Some(&server.uri())).await;

    assert!(stderr.contains("username: Username is required"));
    assert!(stderr.contains("password: Password is required"));
}

#[tokio::test]
async fn test_login_rejected_shows_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;
    let store = TempDir::new().unwrap();

    let (_, stderr) = run_cli_failure(
        &["login", "--username", "alice", "--password", "nope"],
        store.path(),
        Some(&server.uri()),
    )
    .await;

    assert!(stderr.contains("No active account found with the given credentials"));
    assert!(!store.path().join("refresh").exists());
}

#[tokio::test]
async fn test_request_renews_after_401() {
    let server = MockServer::start().await;
    let stale = jwt("stale", 300, false);
    let fresh = jwt("fresh", 300, false);
    mount_login(&server, &stale).await;

    Mock::given(method("GET"))
        .and(path("/api/movies/"))
        .and(header("authorization", format!("Bearer {}", stale).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({ "refresh": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": fresh })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/movies/"))
        .and(header("authorization", format!("Bearer {}", fresh).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "title": "Heat" }])))
        .expect(1)
        .mount(&server)
        .await;

    let store = TempDir::new().unwrap();
    let host = server.uri();
    login(&store, &host).await;

    let stdout = run_cli_success(&["request", "/api/movies/"], store.path(), Some(&host)).await;
    let body: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(body, json!([{ "title": "Heat" }]));
    assert_eq!(
        std::fs::read_to_string(store.path().join("access")).unwrap(),
        fresh
    );
}

#[tokio::test]
async fn test_request_reports_error_shape() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt("a1", 300, false)).await;

    Mock::given(method("POST"))
        .and(path("/api/rentals/"))
        .and(body_json(json!({ "movie": 4 })))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "Movie already rented"
        })))
        .mount(&server)
        .await;

    let store = TempDir::new().unwrap();
    let host = server.uri();
    login(&store, &host).await;

    let (stdout, _) = run_cli_failure(
        &["request", "/api/rentals/", "-X", "post", "-d", r#"{"movie":4}"#],
        store.path(),
        Some(&host),
    )
    .await;

    let err: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(err, json!({ "error": "Movie already rented", "status": 409 }));
}

#[tokio::test]
async fn test_logout_then_request_is_unauthorized() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt("a1", 300, false)).await;

    Mock::given(method("GET"))
        .and(path("/api/movies/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let store = TempDir::new().unwrap();
    let host = server.uri();
    login(&store, &host).await;

    run_cli_success(&["logout"], store.path(), Some(&host)).await;
    assert!(!store.path().join("refresh").exists());
    assert!(!store.path().join("access").exists());

    let (stdout, stderr) =
        run_cli_failure(&["request", "/api/movies/"], store.path(), Some(&host)).await;
    let err: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(err, json!({ "error": "Unauthorized", "status": 401 }));
    assert!(stderr.contains("reelpass login"));
}

#[tokio::test]
async fn test_guard_follows_stored_session() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt("a1", 300, false)).await;
    let store = TempDir::new().unwrap();

    let stdout = run_cli_success(&["guard", "/store/movies", "--json"], store.path(), None).await;
    assert_eq!(
        serde_json::from_str::<Value>(stdout.trim()).unwrap(),
        json!({ "decision": "redirect", "location": "/login" })
    );

    login(&store, &server.uri()).await;

    let stdout = run_cli_success(&["guard", "/store/movies", "--json"], store.path(), None).await;
    assert_eq!(
        serde_json::from_str::<Value>(stdout.trim()).unwrap(),
        json!({ "decision": "allow" })
    );

    let stdout = run_cli_success(&["guard", "/admin/panel", "--json"], store.path(), None).await;
    assert_eq!(
        serde_json::from_str::<Value>(stdout.trim()).unwrap(),
        json!({ "decision": "redirect", "location": "/store/movies" })
    );

    let stdout = run_cli_success(&["guard", "/login", "--json"], store.path(), None).await;
    assert_eq!(
        serde_json::from_str::<Value>(stdout.trim()).unwrap(),
        json!({ "decision": "redirect", "location": "/store/movies" })
    );
}

#[tokio::test]
async fn test_guard_uses_configured_routes() {
    let store = TempDir::new().unwrap();
    let routes = store.path().join("routes.json");
    std::fs::write(
        &routes,
        json!({ "login": "/signin", "authenticated": ["/library"] }).to_string(),
    )
    .unwrap();
    let routes = routes.to_str().unwrap();

    let stdout = run_cli_success(
        &["guard", "/library/shelf", "--json", "--routes", routes],
        store.path(),
        None,
    )
    .await;
    assert_eq!(
        serde_json::from_str::<Value>(stdout.trim()).unwrap(),
        json!({ "decision": "redirect", "location": "/signin" })
    );

    // Unlisted in the custom table, so no longer protected.
    let stdout = run_cli_success(
        &["guard", "/store/movies", "--json", "--routes", routes],
        store.path(),
        None,
    )
    .await;
    assert_eq!(
        serde_json::from_str::<Value>(stdout.trim()).unwrap(),
        json!({ "decision": "allow" })
    );

    let (_, stderr) = run_cli_failure(
        &["guard", "/store/movies", "--routes", "/nonexistent/routes.json"],
        store.path(),
        None,
    )
    .await;
    assert!(stderr.contains("Failed to read route table"));
}

#[tokio::test]
async fn test_commands_need_a_host() {
    let store = TempDir::new().unwrap();
    let (_, stderr) = run_cli_failure(&["refresh"], store.path(), None).await;
    assert!(stderr.contains("No API host"));
}

#[tokio::test]
async fn test_whoami_without_session() {
    let store = TempDir::new().unwrap();
    let (_, stderr) = run_cli_failure(&["whoami"], store.path(), None).await;
    assert!(stderr.contains("No active session"));
}
