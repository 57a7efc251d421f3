use axum::{routing::get, Router};

use crate::handlers;
use crate::AppState;

/// Create the file sharing routes: embedded assets, zip downloads, and the
/// catch-all file server. Most specific prefix first.
pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/static/*path", get(handlers::serve_static))
        .route("/zip", get(handlers::zip_root))
        .route("/zip/*path", get(handlers::zip_subtree))
        .fallback(get(handlers::serve_path))
}
