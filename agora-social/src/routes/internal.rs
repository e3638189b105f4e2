use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use agora_shared::errors::AppResult;
use agora_shared::types::auth::AccessToken;
use agora_shared::types::ApiResponse;

use crate::services::user_service::{self, ProfileView, Registration};
use crate::services::token_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ProvisionUserRequest {
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct ProvisionedUser {
    pub user: ProfileView,
    pub token: AccessToken,
}

/// POST /internal/users — create an account and mint its first access token (service-to-service, no auth)
pub async fn provision_user(
    State(state): State<AppState>,
    Json(req): Json<ProvisionUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProvisionedUser>>)> {
    super::validate(&req)?;

    let store = state.store.as_ref();
    let user = user_service::provision(
        store,
        Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )?;

    let token = token_service::create_access_token(
        user.id,
        &user.username,
        &state.jwt_secret,
        state.config.jwt_access_ttl,
    )?;
    let user = user_service::profile(store, user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ProvisionedUser { user, token })),
    ))
}
