use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tera::Tera;

use crate::server::state::AppState;

use super::StaticAssets;

pub fn frontend_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_static))
}

async fn serve_index(State(state): State<AppState>) -> Response {
    render_index(&state)
}

async fn serve_static(Path(path): Path<String>, State(state): State<AppState>) -> Response {
    serve_file(&path, &state)
}

fn render_index(state: &AppState) -> Response {
    let template_content = match StaticAssets::get("index.html.tera") {
        Some(content) => match std::str::from_utf8(&content.data) {
            Ok(s) => s.to_string(),
            Err(e) => {
                tracing::error!("Failed to parse index.html.tera as UTF-8: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Template encoding error")
                    .into_response();
            }
        },
        None => {
            tracing::error!("index.html.tera template not found in embedded assets");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Template not found").into_response();
        }
    };

    let mut tera = Tera::default();
    if let Err(e) = tera.add_raw_template("index.html.tera", &template_content) {
        tracing::error!("Failed to parse index.html.tera template: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response();
    }

    // Handed to the page as window.CONFIG
    let config = json!({
        "apiBase": "/api/v1",
        "version": env!("CARGO_PKG_VERSION"),
        "candidateLocations": state.registry_settings.candidate_locations,
    });

    let mut context = tera::Context::new();
    context.insert("config", &config.to_string());
    context.insert("version", env!("CARGO_PKG_VERSION"));

    match tera.render("index.html.tera", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render index.html template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Template rendering error",
            )
                .into_response()
        }
    }
}

fn serve_file(path: &str, state: &AppState) -> Response {
    let path = path.trim_start_matches('/');

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                Body::from(content.data),
            )
                .into_response()
        }
        None => {
            if path.starts_with("api/") {
                return (StatusCode::NOT_FOUND, "Not found").into_response();
            }

            // SPA fallback
            render_index(state)
        }
    }
}
