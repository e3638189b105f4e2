use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use agora_shared::errors::AppResult;
use agora_shared::types::auth::AuthUser;
use agora_shared::types::ApiResponse;

use crate::models::Follow;
use crate::services::follow_service;
use crate::AppState;

// --- POST /follow/:id ---

pub async fn follow_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<ApiResponse<Follow>>)> {
    let follow = follow_service::follow(state.store.as_ref(), user.id, target_id)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(follow))))
}

// --- POST /unfollow/:id ---

#[derive(Debug, Serialize)]
pub struct FollowRemovedResponse {
    pub removed: bool,
}

pub async fn unfollow_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FollowRemovedResponse>>> {
    follow_service::unfollow(state.store.as_ref(), user.id, target_id)?;
    Ok(Json(ApiResponse::ok(FollowRemovedResponse { removed: true })))
}
