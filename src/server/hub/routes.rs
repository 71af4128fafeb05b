use super::handlers;
use crate::server::state::AppState;
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hub/search", get(handlers::search))
        .route("/hub/tags/{namespace}/{repository}", get(handlers::list_tags))
        .route("/hub/popular", get(handlers::popular))
}
