use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_shared::errors::AppResult;
use agora_shared::types::auth::AuthUser;
use agora_shared::types::{ApiResponse, Page};

use crate::services::notification_service::{self, NotificationView};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub page: Option<u64>,
    #[serde(default)]
    pub unread: bool,
}

/// GET /notifications
/// The caller's notifications, newest first. `?unread=true` hides read ones.
pub async fn list_notifications(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<ApiResponse<Page<NotificationView>>>> {
    let page = notification_service::list(
        state.store.as_ref(),
        auth_user.id,
        query.unread,
        &super::page(query.page),
        state.config.page_size,
    )?;
    Ok(Json(ApiResponse::ok(page)))
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// GET /notifications/unread-count
pub async fn unread_count(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let count = notification_service::unread_count(state.store.as_ref(), auth_user.id)?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { count })))
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

/// POST /notifications/mark-all-read
pub async fn mark_all_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<MarkAllReadResponse>>> {
    let updated = notification_service::mark_all_read(state.store.as_ref(), auth_user.id)?;
    Ok(Json(ApiResponse::ok(MarkAllReadResponse { updated })))
}

/// POST /notifications/:id/read
/// Fails with 403 when the notification belongs to someone else.
pub async fn mark_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<NotificationView>>> {
    let notification = notification_service::mark_read(state.store.as_ref(), auth_user.id, notification_id)?;
    Ok(Json(ApiResponse::ok(notification)))
}
