use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use agora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Like, NewLike, Target, Verb};
use crate::services::notification_service;
use crate::services::post_service;
use crate::services::user_service::{self, UserSummary};
use crate::store::SocialStore;

#[derive(Debug, Serialize)]
pub struct LikeView {
    pub user: UserSummary,
    pub created_at: DateTime<Utc>,
}

pub fn like(store: &dyn SocialStore, user_id: Uuid, post_id: Uuid) -> AppResult<Like> {
    let post = post_service::require_post(store, post_id)?;

    let like = store.insert_like(
        NewLike {
            id: Uuid::now_v7(),
            post_id,
            user_id,
        },
        notification_service::notice(post.author_id, user_id, Verb::LikedPost, Target::Post(post_id)),
    )?;

    tracing::debug!(post_id = %post_id, user_id = %user_id, "post liked");
    Ok(like)
}

pub fn unlike(store: &dyn SocialStore, user_id: Uuid, post_id: Uuid) -> AppResult<()> {
    post_service::require_post(store, post_id)?;

    if !store.delete_like(post_id, user_id)? {
        return Err(AppError::new(ErrorCode::LikeNotFound, "you have not liked this post"));
    }
    Ok(())
}

/// Users who liked a post, most recent like first.
pub fn likers(store: &dyn SocialStore, post_id: Uuid) -> AppResult<Vec<LikeView>> {
    post_service::require_post(store, post_id)?;

    let likes = store.list_likes(post_id)?;
    let user_ids: Vec<Uuid> = likes.iter().map(|l| l.user_id).collect();
    let users = user_service::summaries(store, &user_ids)?;

    Ok(likes
        .into_iter()
        .filter_map(|l| {
            Some(LikeView {
                user: users.get(&l.user_id)?.clone(),
                created_at: l.created_at,
            })
        })
        .collect())
}
