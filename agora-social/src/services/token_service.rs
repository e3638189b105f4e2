use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use agora_shared::errors::AppError;
use agora_shared::middleware::JwtSecret;
use agora_shared::types::auth::{AccessToken, Claims};

pub fn create_access_token(
    user_id: Uuid,
    username: &str,
    secret: &JwtSecret,
    ttl_secs: i64,
) -> Result<AccessToken, AppError> {
    let claims = Claims::new(user_id, username, ttl_secs);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))?;

    Ok(AccessToken::bearer(token, ttl_secs))
}
