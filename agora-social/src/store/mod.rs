//! Persistence for the social graph.
//!
//! Handlers and services only talk to [`SocialStore`]; `PgStore` backs it with
//! diesel/PostgreSQL and `MemoryStore` keeps everything in process for local
//! runs and tests. Both stores enforce the same uniqueness rules: a duplicate
//! follow edge or like fails with `FollowAlreadyExists` / `LikeAlreadyExists`
//! instead of inserting a second row.

use std::collections::HashMap;
use std::str::FromStr;

use uuid::Uuid;

use agora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{
    Comment, Follow, Like, NewComment, NewFollow, NewLike, NewNotification, NewPost, NewUser,
    Notification, Post, UpdateComment, UpdatePost, UpdateUser, User,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Sort order for post listings. Every ordering breaks ties by id, newest id first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
    RecentlyUpdated,
    LeastRecentlyUpdated,
    TitleAsc,
    TitleDesc,
}

impl FromStr for PostOrdering {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-created_at" => Ok(Self::NewestFirst),
            "created_at" => Ok(Self::OldestFirst),
            "-updated_at" => Ok(Self::RecentlyUpdated),
            "updated_at" => Ok(Self::LeastRecentlyUpdated),
            "title" => Ok(Self::TitleAsc),
            "-title" => Ok(Self::TitleDesc),
            other => Err(AppError::new(
                ErrorCode::ValidationError,
                format!("unsupported ordering: {other}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Restrict to these authors. `Some(vec![])` matches nothing.
    pub author_ids: Option<Vec<Uuid>>,
    pub exclude_author: Option<Uuid>,
    pub title_contains: Option<String>,
    pub content_contains: Option<String>,
    /// Matches either title or content.
    pub search: Option<String>,
    pub ordering: PostOrdering,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentOrdering {
    #[default]
    OldestFirst,
    NewestFirst,
}

impl FromStr for CommentOrdering {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::OldestFirst),
            "-created_at" => Ok(Self::NewestFirst),
            other => Err(AppError::new(
                ErrorCode::ValidationError,
                format!("unsupported ordering: {other}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    pub post_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub ordering: CommentOrdering,
}

/// Per-post aggregates relative to one viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostStats {
    pub comment_count: i64,
    pub likes_count: i64,
    pub is_liked: bool,
}

pub trait SocialStore: Send + Sync {
    fn ping(&self) -> AppResult<()>;

    // --- users ---

    /// Fails with `UsernameTaken` / `EmailTaken` on a uniqueness conflict.
    fn insert_user(&self, new_user: NewUser) -> AppResult<User>;
    fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Unordered; callers that care about order sort by their own key.
    fn users_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>>;
    fn update_user(&self, id: Uuid, changes: UpdateUser) -> AppResult<User>;
    /// Removes the user and everything they own. Returns false if absent.
    fn delete_user(&self, id: Uuid) -> AppResult<bool>;

    // --- follow graph ---

    /// Fails with `FollowAlreadyExists` if the edge is already present.
    /// The edge and its notification are written together or not at all.
    fn insert_follow(&self, new_follow: NewFollow, notice: Option<NewNotification>) -> AppResult<Follow>;
    fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<bool>;
    fn find_follow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<Option<Follow>>;
    /// Users `follower_id` follows, in edge creation order.
    fn followee_ids(&self, follower_id: Uuid) -> AppResult<Vec<Uuid>>;
    /// Users following `followee_id`, in edge creation order.
    fn follower_ids(&self, followee_id: Uuid) -> AppResult<Vec<Uuid>>;
    fn count_following(&self, follower_id: Uuid) -> AppResult<i64>;
    fn count_followers(&self, followee_id: Uuid) -> AppResult<i64>;

    // --- posts ---

    fn insert_post(&self, new_post: NewPost) -> AppResult<Post>;
    fn find_post(&self, id: Uuid) -> AppResult<Option<Post>>;
    fn update_post(&self, id: Uuid, changes: UpdatePost) -> AppResult<Post>;
    /// Cascades to the post's comments and likes.
    fn delete_post(&self, id: Uuid) -> AppResult<bool>;
    /// Returns one window of matching posts plus the total match count.
    fn list_posts(&self, filter: &PostFilter, limit: i64, offset: i64) -> AppResult<(Vec<Post>, i64)>;
    fn post_stats(&self, post_ids: &[Uuid], viewer_id: Uuid) -> AppResult<HashMap<Uuid, PostStats>>;

    // --- comments ---

    /// Writes the comment and its notification atomically.
    fn insert_comment(&self, new_comment: NewComment, notice: Option<NewNotification>) -> AppResult<Comment>;
    fn find_comment(&self, id: Uuid) -> AppResult<Option<Comment>>;
    fn update_comment(&self, id: Uuid, changes: UpdateComment) -> AppResult<Comment>;
    fn delete_comment(&self, id: Uuid) -> AppResult<bool>;
    fn list_comments(&self, filter: &CommentFilter, limit: i64, offset: i64) -> AppResult<(Vec<Comment>, i64)>;

    // --- likes ---

    /// Fails with `LikeAlreadyExists` if the user already liked the post.
    /// Writes the like and its notification atomically.
    fn insert_like(&self, new_like: NewLike, notice: Option<NewNotification>) -> AppResult<Like>;
    fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> AppResult<bool>;
    /// Newest first.
    fn list_likes(&self, post_id: Uuid) -> AppResult<Vec<Like>>;

    // --- notifications ---

    fn insert_notification(&self, new_notification: NewNotification) -> AppResult<Notification>;
    fn find_notification(&self, id: Uuid) -> AppResult<Option<Notification>>;
    /// Newest first, scoped to one recipient.
    fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Notification>, i64)>;
    fn count_unread(&self, recipient_id: Uuid) -> AppResult<i64>;
    fn mark_notification_read(&self, id: Uuid) -> AppResult<Notification>;
    /// Returns how many notifications flipped from unread to read.
    fn mark_all_read(&self, recipient_id: Uuid) -> AppResult<usize>;
}
