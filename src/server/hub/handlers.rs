use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::models::{PopularImage, SearchResponse, TagsResponse};
use crate::hub::popular_images;
use crate::server::error::ServerError;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ServerError> {
    let page = state
        .hub
        .search(&params.query, params.page, params.page_size)
        .await?;

    Ok(Json(SearchResponse {
        results: page.results,
        count: page.count,
        page: page.page,
        page_size: page.page_size,
    }))
}

pub async fn list_tags(
    State(state): State<AppState>,
    Path((namespace, repository)): Path<(String, String)>,
    Query(params): Query<PageParams>,
) -> Result<Json<TagsResponse>, ServerError> {
    let page = state
        .hub
        .list_tags(&namespace, &repository, params.page, params.page_size)
        .await?;

    Ok(Json(TagsResponse {
        tags: page.entries(),
        count: page.count,
        page: page.page,
    }))
}

pub async fn popular() -> Json<Vec<PopularImage>> {
    Json(popular_images())
}
