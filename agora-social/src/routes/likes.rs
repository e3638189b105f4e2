use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use agora_shared::errors::AppResult;
use agora_shared::types::auth::AuthUser;
use agora_shared::types::ApiResponse;

use crate::models::Like;
use crate::services::like_service::{self, LikeView};
use crate::AppState;

// --- POST /posts/:id/like ---

pub async fn like_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<ApiResponse<Like>>)> {
    let like = like_service::like(state.store.as_ref(), user.id, post_id)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(like))))
}

// --- POST /posts/:id/unlike ---

#[derive(Debug, Serialize)]
pub struct LikeRemovedResponse {
    pub removed: bool,
}

pub async fn unlike_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<LikeRemovedResponse>>> {
    like_service::unlike(state.store.as_ref(), user.id, post_id)?;
    Ok(Json(ApiResponse::ok(LikeRemovedResponse { removed: true })))
}

// --- GET /posts/:id/likes ---

pub async fn list_likes(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<LikeView>>>> {
    let likes = like_service::likers(state.store.as_ref(), post_id)?;
    Ok(Json(ApiResponse::ok(likes)))
}
