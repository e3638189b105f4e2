pub mod comments;
pub mod feed;
pub mod follows;
pub mod health;
pub mod internal;
pub mod likes;
pub mod notifications;
pub mod posts;
pub mod profile;

use serde::Serialize;
use validator::Validate;

use agora_shared::errors::{AppError, AppResult, ErrorCode};
use agora_shared::types::PageParams;

pub(crate) fn validate<T: Validate>(req: &T) -> AppResult<()> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))
}

pub(crate) fn page(page: Option<u64>) -> PageParams {
    page.map(PageParams::new).unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}
