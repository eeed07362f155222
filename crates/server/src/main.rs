// vellumd: the vellum backend server binary.

use anyhow::Context;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header::HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::{
    path::PathBuf,
    time::Instant,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use uuid::Uuid;

use vellum_server::{
    api::{self, AppState},
    assets,
    auth::jwt::JwtSessionService,
    config::{ConfigStore, ServerConfig},
    cors::cors_layer,
    startup,
};

const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;
const REQUEST_ID_HEADER: &str = "x-request-id";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    if config.is_dev_password() {
        warn!("VELLUM_APP_PASSWORD is unset; using the development-only password");
    }
    if config.is_dev_jwt_secret() {
        warn!("VELLUM_JWT_SECRET is unset; using the development-only signing key");
    }

    let config_store = ConfigStore::new(&config.config_path);
    let workspace_root = resolve_workspace_root(&config, &config_store)?;

    startup::initialize(&workspace_root, &config.config_path)
        .context("workspace initialization failed")?;

    let jwt_service = JwtSessionService::new(&config.jwt_secret, config.token_ttl_hours)
        .context("invalid session token configuration")?;

    let state = AppState::new(
        jwt_service,
        workspace_root,
        config_store,
        config.app_password.clone(),
    );
    let app = build_router(state, &config.assets_dir);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind listener on {}", config.listen_addr))?;

    info!(listen_addr = %config.listen_addr, "starting vellum server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("vellum server exited unexpectedly")
}

// The persisted record wins over the environment default when it names an
// existing directory; otherwise fall back to the environment and let the
// initializer create it.
fn resolve_workspace_root(
    config: &ServerConfig,
    store: &ConfigStore,
) -> anyhow::Result<PathBuf> {
    let record = store
        .load_or_init(&config.workspace_dir.display().to_string().replace('\\', "/"))
        .context("failed to load persisted configuration")?;

    let persisted = PathBuf::from(&record.workspace_dir);
    if persisted.is_dir() {
        return Ok(persisted);
    }
    if persisted != config.workspace_dir {
        warn!(
            persisted = %persisted.display(),
            fallback = %config.workspace_dir.display(),
            "persisted workspace root is not a directory; falling back"
        );
    }
    Ok(config.workspace_dir.clone())
}

fn build_router(state: AppState, assets_dir: &std::path::Path) -> Router {
    apply_middleware(api::router(state).merge(assets::router(assets_dir)))
}

fn apply_middleware(router: Router) -> Router {
    router
        .layer(cors_layer())
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(middleware::from_fn(request_context_middleware))
        .layer(middleware::from_fn(panic_handler))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}

async fn panic_handler(request: Request<Body>, next: Next) -> Response {
    match tokio::spawn(async move { next.run(request).await }).await {
        Ok(response) => response,
        Err(join_error) => {
            error!(?join_error, "request handling panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn request_context_middleware(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let mut response = next.run(request).await;

    if let Ok(request_id_header) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, request_id_header);
    }

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started_at.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
