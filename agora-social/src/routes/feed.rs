use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use agora_shared::errors::AppResult;
use agora_shared::types::auth::AuthUser;
use agora_shared::types::{ApiResponse, Page};

use crate::services::feed_service;
use crate::services::post_service::PostView;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<u64>,
}

/// GET /feed
/// Posts from everyone the caller follows, newest first.
pub async fn get_feed(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<ApiResponse<Page<PostView>>>> {
    let page = feed_service::feed(
        state.store.as_ref(),
        user.id,
        &super::page(query.page),
        state.config.page_size,
    )?;
    Ok(Json(ApiResponse::ok(page)))
}
