// End-to-end coverage of the file API over a temporary workspace.

use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use vellum_server::{
    api::{self, AppState},
    auth::jwt::JwtSessionService,
    config::ConfigStore,
};

const TEST_SECRET: &str = "vellum_test_secret_that_is_definitely_long_enough";

fn app_with_state(workspace: &TempDir) -> (Router, AppState) {
    let state = AppState::new(
        JwtSessionService::new(TEST_SECRET, 24).expect("jwt service should initialize"),
        workspace.path().to_path_buf(),
        ConfigStore::new(workspace.path().join("config").join("app_config.json")),
        "test-password".to_string(),
    );
    (api::router(state.clone()), state)
}

fn bearer(state: &AppState) -> String {
    format!("Bearer {}", state.jwt.issue().expect("token should be issued"))
}

fn get(uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, auth)
        .body(Body::empty())
        .expect("request should build")
}

fn post_json(uri: &str, auth: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, auth)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");
    serde_json::from_slice(&bytes).expect("response body should be valid json")
}

#[tokio::test]
async fn save_then_read_round_trips_content_exactly() {
    let workspace = TempDir::new().unwrap();
    let (app, state) = app_with_state(&workspace);
    let auth = bearer(&state);

    let content = "server:\n  host: localhost\n  port: 8000\n";
    let response = app
        .clone()
        .oneshot(post_json("/api/file/configs/app.yaml", &auth, json!({ "content": content })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let saved = body_json(response).await;
    assert_eq!(saved["message"], "file saved");
    let history_name = saved["history_file"]["name"]
        .as_str()
        .expect("save should report its history snapshot");
    assert!(history_name.starts_with("app_"));

    let response =
        app.oneshot(get("/api/file/configs/app.yaml", &auth)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["content"], content);
}

#[tokio::test]
async fn invalid_yaml_is_rejected_with_a_specific_diagnostic() {
    let workspace = TempDir::new().unwrap();
    let (app, state) = app_with_state(&workspace);
    let auth = bearer(&state);

    // Seed a valid version first.
    let response = app
        .clone()
        .oneshot(post_json("/api/file/app.yaml", &auth, json!({ "content": "a: 1\n" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json("/api/file/app.yaml", &auth, json!({ "content": "a: b: c" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = body_json(response).await;
    let message = error["error"]["message"].as_str().unwrap_or_default();
    assert!(
        message.contains("ambiguous mapping"),
        "diagnostic should be specific, got: {message}"
    );

    // The previous content is untouched.
    let response = app.oneshot(get("/api/file/app.yaml", &auth)).await.unwrap();
    assert_eq!(body_json(response).await["content"], "a: 1\n");
}

#[tokio::test]
async fn listing_filters_extensions_and_sorts_directories_first() {
    let workspace = TempDir::new().unwrap();
    std::fs::write(workspace.path().join("a.yaml"), "a: 1\n").unwrap();
    std::fs::write(workspace.path().join("b.txt"), "plain text").unwrap();
    std::fs::create_dir(workspace.path().join("sub")).unwrap();
    std::fs::write(workspace.path().join("sub/c.yml"), "c: 1\n").unwrap();

    let (app, state) = app_with_state(&workspace);

    let response = app.oneshot(get("/api/files", &bearer(&state))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing = body_json(response).await;
    let nodes = listing.as_array().expect("listing should be an array");
    assert_eq!(nodes.len(), 2, "b.txt must be absent: {listing}");

    assert_eq!(nodes[0]["name"], "sub");
    assert_eq!(nodes[0]["isDirectory"], true);
    assert_eq!(nodes[0]["children"][0]["path"], "sub/c.yml");
    assert_eq!(nodes[1]["name"], "a.yaml");
    assert_eq!(nodes[1]["isDirectory"], false);
}

#[tokio::test]
async fn search_returns_flat_matches_only() {
    let workspace = TempDir::new().unwrap();
    std::fs::create_dir_all(workspace.path().join("deep/nested")).unwrap();
    std::fs::write(workspace.path().join("deep/nested/deploy.yaml"), "d: 1\n").unwrap();
    std::fs::write(workspace.path().join("other.yaml"), "o: 1\n").unwrap();

    let (app, state) = app_with_state(&workspace);

    let response =
        app.oneshot(get("/api/files?search=DEPLOY", &bearer(&state))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing = body_json(response).await;
    let nodes = listing.as_array().expect("listing should be an array");
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["path"], "deep/nested/deploy.yaml");
    assert!(nodes[0].get("children").is_none());
}

#[tokio::test]
async fn create_directory_is_idempotent() {
    let workspace = TempDir::new().unwrap();
    let (app, state) = app_with_state(&workspace);
    let auth = bearer(&state);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/api/directory", &auth, json!({ "path": "envs/prod" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert!(workspace.path().join("envs/prod").is_dir());
}

#[tokio::test]
async fn move_creates_missing_target_parent() {
    let workspace = TempDir::new().unwrap();
    std::fs::create_dir(workspace.path().join("sub")).unwrap();
    std::fs::write(workspace.path().join("sub/a.yaml"), "x: 1\n").unwrap();

    let (app, state) = app_with_state(&workspace);
    let auth = bearer(&state);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/file/move",
            &auth,
            json!({ "source_path": "sub/a.yaml", "target_path": "other/a.yaml" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let moved = body_json(response).await;
    assert_eq!(moved["source"], "sub/a.yaml");
    assert_eq!(moved["target"], "other/a.yaml");
    assert!(!workspace.path().join("sub/a.yaml").exists());
    assert_eq!(
        std::fs::read_to_string(workspace.path().join("other/a.yaml")).unwrap(),
        "x: 1\n"
    );
}

#[tokio::test]
async fn move_missing_source_is_not_found_and_creates_no_target() {
    let workspace = TempDir::new().unwrap();
    let (app, state) = app_with_state(&workspace);

    let response = app
        .oneshot(post_json(
            "/api/file/move",
            &bearer(&state),
            json!({ "source_path": "ghost.yaml", "target_path": "other/ghost.yaml" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!workspace.path().join("other/ghost.yaml").exists());
}

#[tokio::test]
async fn delete_removes_files_and_directory_trees() {
    let workspace = TempDir::new().unwrap();
    std::fs::create_dir_all(workspace.path().join("sub/nested")).unwrap();
    std::fs::write(workspace.path().join("sub/nested/a.yaml"), "x: 1\n").unwrap();

    let (app, state) = app_with_state(&workspace);
    let auth = bearer(&state);

    let delete = |uri: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(uri.to_string())
            .header(AUTHORIZATION, auth.clone())
            .body(Body::empty())
            .expect("request should build")
    };

    let response = app.clone().oneshot(delete("/api/file/sub")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!workspace.path().join("sub").exists());

    let response = app.oneshot(delete("/api/file/sub")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_file_read_reports_not_found() {
    let workspace = TempDir::new().unwrap();
    let (app, state) = app_with_state(&workspace);

    let response = app.oneshot(get("/api/file/ghost.yaml", &bearer(&state))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn non_utf8_file_read_reports_invalid_encoding() {
    let workspace = TempDir::new().unwrap();
    std::fs::write(workspace.path().join("binary.yaml"), [0xff, 0xfe, 0x01]).unwrap();

    let (app, state) = app_with_state(&workspace);

    let response = app.oneshot(get("/api/file/binary.yaml", &bearer(&state))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "INVALID_ENCODING");
}

#[tokio::test]
async fn workspace_config_round_trip_swaps_the_live_root() {
    let workspace = TempDir::new().unwrap();
    let replacement = TempDir::new().unwrap();
    std::fs::write(replacement.path().join("fresh.yaml"), "fresh: true\n").unwrap();

    let (app, state) = app_with_state(&workspace);
    let auth = bearer(&state);

    let response = app.clone().oneshot(get("/api/config/workspace", &auth)).await.unwrap();
    let current = body_json(response).await;
    assert_eq!(current["path"], workspace.path().display().to_string());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/config/workspace",
            &auth,
            json!({ "path": replacement.path().display().to_string() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The very next request resolves against the new root, no restart.
    let response = app.clone().oneshot(get("/api/file/fresh.yaml", &auth)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["content"], "fresh: true\n");

    // And the record was persisted for the next boot.
    let persisted: Value = serde_json::from_str(
        &std::fs::read_to_string(workspace.path().join("config").join("app_config.json"))
            .expect("config record should exist"),
    )
    .expect("config record should be valid json");
    assert_eq!(persisted["workspace_dir"], replacement.path().display().to_string());
}

#[tokio::test]
async fn workspace_config_rejects_missing_directories() {
    let workspace = TempDir::new().unwrap();
    let (app, state) = app_with_state(&workspace);

    let response = app
        .oneshot(post_json(
            "/api/config/workspace",
            &bearer(&state),
            json!({ "path": "/definitely/not/a/real/directory" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
