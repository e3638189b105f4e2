use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use agora_shared::errors::AppResult;
use agora_shared::types::auth::AuthUser;
use agora_shared::types::{ApiResponse, Page};

use crate::services::comment_service::{self, CommentView};
use crate::store::{CommentFilter, CommentOrdering};
use crate::AppState;

use super::DeletedResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub post: Uuid,
    #[validate(length(min = 1, message = "comment cannot be empty"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, message = "comment cannot be empty"))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentListQuery {
    pub page: Option<u64>,
    pub post: Option<Uuid>,
    pub author: Option<Uuid>,
    pub ordering: Option<String>,
}

impl CommentListQuery {
    fn filter(&self) -> AppResult<CommentFilter> {
        let ordering = match &self.ordering {
            Some(raw) => raw.parse::<CommentOrdering>()?,
            None => CommentOrdering::default(),
        };
        Ok(CommentFilter {
            post_id: self.post,
            author_id: self.author,
            ordering,
        })
    }
}

// --- GET /comments ---

pub async fn list_comments(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CommentListQuery>,
) -> AppResult<Json<ApiResponse<Page<CommentView>>>> {
    let page = comment_service::list(
        state.store.as_ref(),
        &query.filter()?,
        &super::page(query.page),
        state.config.page_size,
    )?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- GET /comments/mine ---

pub async fn my_comments(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CommentListQuery>,
) -> AppResult<Json<ApiResponse<Page<CommentView>>>> {
    let filter = CommentFilter {
        author_id: Some(user.id),
        ..query.filter()?
    };
    let page = comment_service::list(
        state.store.as_ref(),
        &filter,
        &super::page(query.page),
        state.config.page_size,
    )?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- POST /comments ---

pub async fn create_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CommentView>>)> {
    super::validate(&req)?;
    let comment = comment_service::create(state.store.as_ref(), user.id, req.post, req.content)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment))))
}

// --- GET /comments/:id ---

pub async fn get_comment(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CommentView>>> {
    let comment = comment_service::get(state.store.as_ref(), comment_id)?;
    Ok(Json(ApiResponse::ok(comment)))
}

// --- PATCH /comments/:id ---

pub async fn update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<Json<ApiResponse<CommentView>>> {
    super::validate(&req)?;
    let comment = comment_service::update(state.store.as_ref(), user.id, comment_id, req.content)?;
    Ok(Json(ApiResponse::ok(comment)))
}

// --- DELETE /comments/:id ---

pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeletedResponse>>> {
    comment_service::delete(state.store.as_ref(), user.id, comment_id)?;
    Ok(Json(ApiResponse::ok(DeletedResponse { deleted: true })))
}
