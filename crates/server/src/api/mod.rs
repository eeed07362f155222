// HTTP surface: application state and the route table.

pub mod auth;
pub mod config;
pub mod files;
pub mod history;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{
    auth::{jwt::JwtSessionService, middleware::require_bearer_auth},
    config::ConfigStore,
    store::{content::ContentStore, history::HistoryStore},
    workspace::WorkspaceHandle,
};

#[derive(Clone)]
pub struct AppState {
    pub jwt: Arc<JwtSessionService>,
    pub workspace: Arc<WorkspaceHandle>,
    pub config_store: Arc<ConfigStore>,
    pub content: ContentStore,
    pub history: HistoryStore,
    pub app_password: Arc<String>,
}

impl AppState {
    pub fn new(
        jwt: JwtSessionService,
        workspace_root: PathBuf,
        config_store: ConfigStore,
        app_password: String,
    ) -> Self {
        let history = HistoryStore::default();
        Self {
            jwt: Arc::new(jwt),
            workspace: Arc::new(WorkspaceHandle::new(workspace_root)),
            config_store: Arc::new(config_store),
            content: ContentStore::new(history),
            history,
            app_password: Arc::new(app_password),
        }
    }
}

/// Build the API router. `/login` and `/healthz` are public; everything
/// under `/api` requires a bearer token.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/files", get(files::list_files))
        // Static route: must win over the `{*path}` wildcard below.
        .route("/api/file/move", post(files::move_file))
        .route(
            "/api/file/{*path}",
            get(files::read_file).post(files::save_file).delete(files::delete_file),
        )
        .route("/api/directory", post(files::create_directory))
        .route("/api/history", get(history::list_history))
        .route("/api/history/{*path}", get(history::read_snapshot))
        .route(
            "/api/config/workspace",
            get(config::get_workspace).post(config::set_workspace),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.jwt),
            require_bearer_auth,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
