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
use crate::services::post_service::{self, PostChanges, PostDetail, PostView};
use crate::store::{PostFilter, PostOrdering};
use crate::AppState;

use super::DeletedResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 5, max = 200, message = "title must be between 5 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 10, message = "content must be at least 10 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 5, max = 200, message = "title must be between 5 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 10, message = "content must be at least 10 characters"))]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub author: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl PostListQuery {
    fn filter(&self) -> AppResult<PostFilter> {
        let ordering = match &self.ordering {
            Some(raw) => raw.parse::<PostOrdering>()?,
            None => PostOrdering::default(),
        };
        Ok(PostFilter {
            author_ids: self.author.map(|id| vec![id]),
            exclude_author: None,
            title_contains: self.title.clone().filter(|t| !t.is_empty()),
            content_contains: self.content.clone().filter(|c| !c.is_empty()),
            search: self.search.clone().filter(|s| !s.is_empty()),
            ordering,
        })
    }
}

// --- GET /posts ---

pub async fn list_posts(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> AppResult<Json<ApiResponse<Page<PostView>>>> {
    let filter = query.filter()?;
    let page = post_service::list(
        state.store.as_ref(),
        user.id,
        &filter,
        &super::page(query.page),
        state.config.page_size,
    )?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- GET /posts/mine ---

pub async fn my_posts(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> AppResult<Json<ApiResponse<Page<PostView>>>> {
    let filter = PostFilter {
        author_ids: Some(vec![user.id]),
        ..query.filter()?
    };
    let page = post_service::list(
        state.store.as_ref(),
        user.id,
        &filter,
        &super::page(query.page),
        state.config.page_size,
    )?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- POST /posts ---

pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PostView>>)> {
    super::validate(&req)?;
    let post = post_service::create(state.store.as_ref(), user.id, req.title, req.content)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(post))))
}

// --- GET /posts/:id ---

pub async fn get_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PostDetail>>> {
    let post = post_service::detail(state.store.as_ref(), user.id, post_id)?;
    Ok(Json(ApiResponse::ok(post)))
}

// --- PATCH /posts/:id ---

pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(req): Json<UpdatePostRequest>,
) -> AppResult<Json<ApiResponse<PostView>>> {
    super::validate(&req)?;
    let post = post_service::update(
        state.store.as_ref(),
        user.id,
        post_id,
        PostChanges {
            title: req.title,
            content: req.content,
        },
    )?;
    Ok(Json(ApiResponse::ok(post)))
}

// --- DELETE /posts/:id ---

pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeletedResponse>>> {
    post_service::delete(state.store.as_ref(), user.id, post_id)?;
    Ok(Json(ApiResponse::ok(DeletedResponse { deleted: true })))
}

// --- GET /posts/:id/comments ---

pub async fn post_comments(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<CommentView>>>> {
    let comments = comment_service::for_post(state.store.as_ref(), post_id)?;
    Ok(Json(ApiResponse::ok(comments)))
}
