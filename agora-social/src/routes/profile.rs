use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use agora_shared::errors::AppResult;
use agora_shared::types::auth::AuthUser;
use agora_shared::types::ApiResponse;

use crate::models::UpdateUser;
use crate::services::follow_service::{self, FollowList};
use crate::services::user_service::{self, ProfileView, PublicProfile};
use crate::AppState;

use super::DeletedResponse;

// --- GET /profile ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let profile = user_service::profile(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PATCH /profile ---

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 100, message = "location must be at most 100 characters"))]
    pub location: Option<String>,
    #[validate(
        url(message = "website must be a valid URL"),
        length(max = 200, message = "website must be at most 200 characters")
    )]
    pub website: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(url(message = "profile picture must be a valid URL"))]
    pub profile_picture_url: Option<String>,
}

impl From<UpdateProfileRequest> for UpdateUser {
    fn from(req: UpdateProfileRequest) -> Self {
        UpdateUser {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            location: req.location,
            website: req.website,
            date_of_birth: req.date_of_birth,
            profile_picture_url: req.profile_picture_url,
            ..Default::default()
        }
    }
}

pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    super::validate(&req)?;
    let profile = user_service::update_profile(state.store.as_ref(), user.id, req.into())?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- DELETE /profile ---

pub async fn delete_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<DeletedResponse>>> {
    user_service::delete_account(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(DeletedResponse { deleted: true })))
}

// --- POST /profile/password ---

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct PasswordChangedResponse {
    pub changed: bool,
}

pub async fn change_password(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<PasswordChangedResponse>>> {
    user_service::change_password(
        state.store.as_ref(),
        user.id,
        &req.old_password,
        &req.new_password,
        &req.confirm_password,
    )?;
    Ok(Json(ApiResponse::ok_with_message(
        PasswordChangedResponse { changed: true },
        "password updated",
    )))
}

// --- GET /users/:username ---

pub async fn get_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let profile = user_service::public_profile(state.store.as_ref(), user.id, &username)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- GET /users/:username/followers, /users/:username/following ---

#[derive(Debug, Deserialize)]
pub struct FollowListQuery {
    #[serde(default)]
    pub list: bool,
}

pub async fn list_followers(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<FollowListQuery>,
) -> AppResult<Json<ApiResponse<FollowList>>> {
    let followers = follow_service::followers_of(state.store.as_ref(), &username, query.list)?;
    Ok(Json(ApiResponse::ok(followers)))
}

pub async fn list_following(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<FollowListQuery>,
) -> AppResult<Json<ApiResponse<FollowList>>> {
    let following = follow_service::following_of(state.store.as_ref(), &username, query.list)?;
    Ok(Json(ApiResponse::ok(following)))
}
