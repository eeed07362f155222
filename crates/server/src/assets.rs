// Prebuilt browser bundle.
//
// `GET /` serves the editor's `index.html` and `/assets` the hashed bundle
// files. An absent bundle directory is tolerated (API-only deployments);
// the routes then answer 404.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tracing::warn;

pub fn router(assets_dir: &Path) -> Router {
    if !assets_dir.is_dir() {
        warn!(
            path = %assets_dir.display(),
            "browser bundle directory not found; serving API only"
        );
    }

    Router::new()
        .route_service("/", ServeFile::new(assets_dir.join("index.html")))
        .nest_service("/assets", ServeDir::new(assets_dir.join("assets")))
}
