use axum::{extract::State, Json};

use super::models::ListingRequest;
use crate::api::models::{
    DockerImagesResponse, PackagesResponse, RepositoriesResponse, VersionsResponse,
};
use crate::format::{docker_image_record, package_record, repository_record, version_record};
use crate::registry::scan::scan_repositories;
use crate::registry::RegistryError;
use crate::server::auth::{require_credentials, CredentialsBody};
use crate::server::error::ServerError;
use crate::server::state::AppState;

fn scoped(err: RegistryError, location: &str, repository: &str) -> ServerError {
    ServerError::from(err)
        .with_context("location", location)
        .with_context("repository", repository)
}

/// List repositories across every configured candidate location
pub async fn list_repositories(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<RepositoriesResponse>, ServerError> {
    let bundle = require_credentials(body.credentials)?;
    let backend = state.connector.connect(&bundle);

    let scan = scan_repositories(backend.as_ref(), &state.registry_settings.candidate_locations)
        .await
        .map_err(|e| ServerError::from(e).with_context("project", bundle.project_id.clone()))?;

    let failed = scan.failed_locations().count();
    if failed > 0 {
        tracing::info!(
            project = %bundle.project_id,
            failed,
            "Repository listing skipped failing locations"
        );
    }

    let repositories: Vec<_> = scan.repositories.iter().map(repository_record).collect();
    Ok(Json(RepositoriesResponse {
        count: repositories.len(),
        repositories,
        locations: scan.outcomes,
    }))
}

pub async fn list_packages(
    State(state): State<AppState>,
    Json(body): Json<ListingRequest>,
) -> Result<Json<PackagesResponse>, ServerError> {
    let (location, repository) = body.scope()?;
    let bundle = require_credentials(body.credentials.clone())?;
    let backend = state.connector.connect(&bundle);

    let packages: Vec<_> = backend
        .list_packages(location, repository)
        .await
        .map_err(|e| scoped(e, location, repository))?
        .iter()
        .map(package_record)
        .collect();

    Ok(Json(PackagesResponse {
        count: packages.len(),
        packages,
    }))
}

pub async fn list_versions(
    State(state): State<AppState>,
    Json(body): Json<ListingRequest>,
) -> Result<Json<VersionsResponse>, ServerError> {
    let (location, repository, package) = body.package_scope()?;
    let bundle = require_credentials(body.credentials.clone())?;
    let backend = state.connector.connect(&bundle);

    let versions: Vec<_> = backend
        .list_versions(location, repository, package)
        .await
        .map_err(|e| scoped(e, location, repository).with_context("package", package))?
        .iter()
        .map(version_record)
        .collect();

    Ok(Json(VersionsResponse {
        count: versions.len(),
        versions,
    }))
}

pub async fn list_docker_images(
    State(state): State<AppState>,
    Json(body): Json<ListingRequest>,
) -> Result<Json<DockerImagesResponse>, ServerError> {
    let (location, repository) = body.scope()?;
    let bundle = require_credentials(body.credentials.clone())?;
    let backend = state.connector.connect(&bundle);

    let images: Vec<_> = backend
        .list_docker_images(location, repository)
        .await
        .map_err(|e| scoped(e, location, repository))?
        .iter()
        .map(docker_image_record)
        .collect();

    Ok(Json(DockerImagesResponse {
        count: images.len(),
        images,
    }))
}
