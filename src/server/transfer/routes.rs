use super::handlers;
use crate::server::state::AppState;
use axum::{routing::post, Router};

pub fn routes() -> Router<AppState> {
    Router::new().route("/transfer/plan", post(handlers::plan))
}
