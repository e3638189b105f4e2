use std::collections::HashMap;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use agora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewUser, UpdateUser, User};
use crate::store::SocialStore;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must contain at least one number"));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must contain at least one letter"));
    }
    Ok(())
}

/// Usernames are 1-150 characters of letters, digits and `@.+-_`.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.chars().count();
    if len == 0 || len > 150 {
        return Err(AppError::new(ErrorCode::InvalidUsername, "username must be between 1 and 150 characters"));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(AppError::new(
            ErrorCode::InvalidUsername,
            "username may only contain letters, numbers and @/./+/-/_",
        ));
    }
    Ok(())
}

// --- views ---

/// Compact author/actor representation embedded in other resources.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            profile_picture_url: user.profile_picture_url.clone(),
        }
    }
}

/// The caller's own profile, including private fields.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Another user's profile as seen by any authenticated caller.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub profile_picture_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub is_following: bool,
    pub created_at: DateTime<Utc>,
}

// --- lookups ---

pub fn require_user(store: &dyn SocialStore, id: Uuid) -> AppResult<User> {
    store
        .find_user(id)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

pub fn require_username(store: &dyn SocialStore, username: &str) -> AppResult<User> {
    store
        .find_user_by_username(username)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

/// Summaries keyed by id. Ids with no matching user are absent from the map.
pub fn summaries(store: &dyn SocialStore, ids: &[Uuid]) -> AppResult<HashMap<Uuid, UserSummary>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(store
        .users_by_ids(ids)?
        .iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect())
}

/// Summaries in the order of `ids`.
pub fn ordered_summaries(store: &dyn SocialStore, ids: &[Uuid]) -> AppResult<Vec<UserSummary>> {
    let mut by_id = summaries(store, ids)?;
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

// --- operations ---

#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub fn provision(store: &dyn SocialStore, registration: Registration) -> AppResult<User> {
    validate_username(&registration.username)?;
    validate_password(&registration.password)?;

    let email = registration.email.trim().to_lowercase();

    if store.find_user_by_username(&registration.username)?.is_some() {
        return Err(AppError::new(ErrorCode::UsernameTaken, "a user with that username already exists"));
    }
    if store.find_user_by_email(&email)?.is_some() {
        return Err(AppError::new(ErrorCode::EmailTaken, "a user with that email already exists"));
    }

    let new_user = NewUser {
        id: Uuid::now_v7(),
        username: registration.username,
        email,
        password_hash: hash_password(&registration.password)?,
        first_name: registration.first_name,
        last_name: registration.last_name,
    };

    let user = store.insert_user(new_user)?;
    tracing::info!(user_id = %user.id, username = %user.username, "user provisioned");

    Ok(user)
}

pub fn profile(store: &dyn SocialStore, user_id: Uuid) -> AppResult<ProfileView> {
    let user = require_user(store, user_id)?;
    profile_view(store, user)
}

fn profile_view(store: &dyn SocialStore, user: User) -> AppResult<ProfileView> {
    let followers_count = store.count_followers(user.id)?;
    let following_count = store.count_following(user.id)?;

    Ok(ProfileView {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        bio: user.bio,
        location: user.location,
        website: user.website,
        date_of_birth: user.date_of_birth,
        profile_picture_url: user.profile_picture_url,
        followers_count,
        following_count,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })
}

pub fn public_profile(store: &dyn SocialStore, viewer_id: Uuid, username: &str) -> AppResult<PublicProfile> {
    let user = require_username(store, username)?;
    let followers_count = store.count_followers(user.id)?;
    let following_count = store.count_following(user.id)?;
    let is_following = store.find_follow(viewer_id, user.id)?.is_some();

    Ok(PublicProfile {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        bio: user.bio,
        location: user.location,
        website: user.website,
        profile_picture_url: user.profile_picture_url,
        followers_count,
        following_count,
        is_following,
        created_at: user.created_at,
    })
}

/// Applies a partial profile update. Password changes go through
/// [`change_password`] instead.
pub fn update_profile(store: &dyn SocialStore, user_id: Uuid, mut changes: UpdateUser) -> AppResult<ProfileView> {
    changes.password_hash = None;

    if let Some(email) = changes.email.take() {
        let email = email.trim().to_lowercase();
        if let Some(existing) = store.find_user_by_email(&email)? {
            if existing.id != user_id {
                return Err(AppError::new(ErrorCode::EmailTaken, "a user with that email already exists"));
            }
        }
        changes.email = Some(email);
    }

    changes.updated_at = Some(Utc::now());
    let user = store.update_user(user_id, changes)?;
    profile_view(store, user)
}

pub fn change_password(
    store: &dyn SocialStore,
    user_id: Uuid,
    old_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> AppResult<()> {
    let user = require_user(store, user_id)?;

    if !verify_password(old_password, &user.password_hash)? {
        return Err(AppError::new(ErrorCode::WrongPassword, "old password is incorrect"));
    }
    if new_password != confirm_password {
        return Err(AppError::new(ErrorCode::PasswordMismatch, "new passwords do not match"));
    }
    validate_password(new_password)?;

    store.update_user(
        user_id,
        UpdateUser {
            password_hash: Some(hash_password(new_password)?),
            updated_at: Some(Utc::now()),
            ..Default::default()
        },
    )?;

    tracing::info!(user_id = %user_id, "password changed");
    Ok(())
}

pub fn delete_account(store: &dyn SocialStore, user_id: Uuid) -> AppResult<()> {
    if !store.delete_user(user_id)? {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }
    tracing::info!(user_id = %user_id, "account deleted");
    Ok(())
}
