use super::handlers;
use crate::server::state::AppState;
use axum::{routing::post, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/repositories", post(handlers::list_repositories))
        .route("/packages", post(handlers::list_packages))
        .route("/versions", post(handlers::list_versions))
        .route("/docker-images", post(handlers::list_docker_images))
}
