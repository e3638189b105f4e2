use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use agora_shared::errors::{AppError, AppResult, ErrorCode};

use super::{CommentFilter, CommentOrdering, PostFilter, PostOrdering, PostStats, SocialStore};
use crate::models::{
    Comment, Follow, Like, NewComment, NewFollow, NewLike, NewNotification, NewPost, NewUser,
    Notification, Post, UpdateComment, UpdatePost, UpdateUser, User,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    follows: Vec<Follow>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    notifications: Vec<Notification>,
}

/// Process-local `SocialStore`. All tables sit behind one lock, so every
/// operation (including uniqueness checks and cascades) is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }
}

fn window<T: Clone>(items: Vec<&T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

/// Builds a notification row under the caller's lock, enforcing the same
/// foreign keys and no-self-notify check as the Postgres schema.
fn notification_row(tables: &Tables, new: NewNotification) -> AppResult<Notification> {
    if new.recipient_id == new.actor_id {
        return Err(AppError::internal("notification recipient and actor must differ"));
    }
    for id in [new.recipient_id, new.actor_id] {
        if !tables.users.iter().any(|u| u.id == id) {
            return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
        }
    }
    if tables.notifications.iter().any(|n| n.id == new.id) {
        return Err(AppError::internal("duplicate notification id"));
    }

    Ok(Notification {
        id: new.id,
        recipient_id: new.recipient_id,
        actor_id: new.actor_id,
        verb: new.verb,
        target_type: new.target_type,
        target_id: new.target_id,
        is_read: false,
        created_at: Utc::now(),
    })
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn post_matches(post: &Post, filter: &PostFilter) -> bool {
    if let Some(ids) = &filter.author_ids {
        if !ids.contains(&post.author_id) {
            return false;
        }
    }
    if filter.exclude_author == Some(post.author_id) {
        return false;
    }
    if let Some(term) = &filter.title_contains {
        if !contains_ci(&post.title, term) {
            return false;
        }
    }
    if let Some(term) = &filter.content_contains {
        if !contains_ci(&post.content, term) {
            return false;
        }
    }
    if let Some(term) = &filter.search {
        if !contains_ci(&post.title, term) && !contains_ci(&post.content, term) {
            return false;
        }
    }
    true
}

fn compare_posts(a: &Post, b: &Post, ordering: PostOrdering) -> Ordering {
    let primary = match ordering {
        PostOrdering::NewestFirst => b.created_at.cmp(&a.created_at),
        PostOrdering::OldestFirst => a.created_at.cmp(&b.created_at),
        PostOrdering::RecentlyUpdated => b.updated_at.cmp(&a.updated_at),
        PostOrdering::LeastRecentlyUpdated => a.updated_at.cmp(&b.updated_at),
        PostOrdering::TitleAsc => a.title.cmp(&b.title),
        PostOrdering::TitleDesc => b.title.cmp(&a.title),
    };
    primary.then_with(|| b.id.cmp(&a.id))
}

impl SocialStore for MemoryStore {
    fn ping(&self) -> AppResult<()> {
        self.read().map(|_| ())
    }

    // --- users ---

    fn insert_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut tables = self.write()?;

        if tables.users.iter().any(|u| u.username == new_user.username) {
            return Err(AppError::new(ErrorCode::UsernameTaken, "a user with that username already exists"));
        }
        if tables.users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::new(ErrorCode::EmailTaken, "a user with that email already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: new_user.id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            bio: String::new(),
            location: String::new(),
            website: String::new(),
            date_of_birth: None,
            profile_picture_url: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.username == username).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.email == email).cloned())
    }

    fn users_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        Ok(self
            .read()?
            .users
            .iter()
            .filter(|u| wanted.contains(&u.id))
            .cloned()
            .collect())
    }

    fn update_user(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        let mut tables = self.write()?;

        if let Some(email) = &changes.email {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(AppError::new(ErrorCode::EmailTaken, "a user with that email already exists"));
            }
        }

        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        if let Some(v) = changes.email { user.email = v; }
        if let Some(v) = changes.first_name { user.first_name = v; }
        if let Some(v) = changes.last_name { user.last_name = v; }
        if let Some(v) = changes.bio { user.bio = v; }
        if let Some(v) = changes.location { user.location = v; }
        if let Some(v) = changes.website { user.website = v; }
        if let Some(v) = changes.date_of_birth { user.date_of_birth = Some(v); }
        if let Some(v) = changes.profile_picture_url { user.profile_picture_url = Some(v); }
        if let Some(v) = changes.password_hash { user.password_hash = v; }
        if let Some(v) = changes.updated_at { user.updated_at = v; }

        Ok(user.clone())
    }

    fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.write()?;

        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }

        let owned_posts: HashSet<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();

        tables.follows.retain(|f| f.follower_id != id && f.followee_id != id);
        tables.posts.retain(|p| p.author_id != id);
        tables
            .comments
            .retain(|c| c.author_id != id && !owned_posts.contains(&c.post_id));
        tables
            .likes
            .retain(|l| l.user_id != id && !owned_posts.contains(&l.post_id));
        tables
            .notifications
            .retain(|n| n.recipient_id != id && n.actor_id != id);

        Ok(true)
    }

    // --- follow graph ---

    fn insert_follow(&self, new_follow: NewFollow, notice: Option<NewNotification>) -> AppResult<Follow> {
        let mut tables = self.write()?;

        if new_follow.follower_id == new_follow.followee_id {
            return Err(AppError::new(ErrorCode::CannotFollowSelf, "cannot follow yourself"));
        }
        if tables.follows.iter().any(|f| {
            f.follower_id == new_follow.follower_id && f.followee_id == new_follow.followee_id
        }) {
            return Err(AppError::new(ErrorCode::FollowAlreadyExists, "already following this user"));
        }
        let notification = notice.map(|n| notification_row(&tables, n)).transpose()?;

        let follow = Follow {
            id: new_follow.id,
            follower_id: new_follow.follower_id,
            followee_id: new_follow.followee_id,
            created_at: Utc::now(),
        };
        tables.follows.push(follow.clone());
        tables.notifications.extend(notification);
        Ok(follow)
    }

    fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<bool> {
        let mut tables = self.write()?;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.followee_id == followee_id));
        Ok(tables.follows.len() < before)
    }

    fn find_follow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<Option<Follow>> {
        Ok(self
            .read()?
            .follows
            .iter()
            .find(|f| f.follower_id == follower_id && f.followee_id == followee_id)
            .cloned())
    }

    fn followee_ids(&self, follower_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .read()?
            .follows
            .iter()
            .filter(|f| f.follower_id == follower_id)
            .map(|f| f.followee_id)
            .collect())
    }

    fn follower_ids(&self, followee_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .read()?
            .follows
            .iter()
            .filter(|f| f.followee_id == followee_id)
            .map(|f| f.follower_id)
            .collect())
    }

    fn count_following(&self, follower_id: Uuid) -> AppResult<i64> {
        Ok(self
            .read()?
            .follows
            .iter()
            .filter(|f| f.follower_id == follower_id)
            .count() as i64)
    }

    fn count_followers(&self, followee_id: Uuid) -> AppResult<i64> {
        Ok(self
            .read()?
            .follows
            .iter()
            .filter(|f| f.followee_id == followee_id)
            .count() as i64)
    }

    // --- posts ---

    fn insert_post(&self, new_post: NewPost) -> AppResult<Post> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let post = Post {
            id: new_post.id,
            title: new_post.title,
            content: new_post.content,
            author_id: new_post.author_id,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    fn find_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        Ok(self.read()?.posts.iter().find(|p| p.id == id).cloned())
    }

    fn update_post(&self, id: Uuid, changes: UpdatePost) -> AppResult<Post> {
        let mut tables = self.write()?;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::new(ErrorCode::PostNotFound, "post not found"))?;

        if let Some(v) = changes.title { post.title = v; }
        if let Some(v) = changes.content { post.content = v; }
        if let Some(v) = changes.updated_at { post.updated_at = v; }

        Ok(post.clone())
    }

    fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.write()?;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Ok(false);
        }
        tables.comments.retain(|c| c.post_id != id);
        tables.likes.retain(|l| l.post_id != id);
        Ok(true)
    }

    fn list_posts(&self, filter: &PostFilter, limit: i64, offset: i64) -> AppResult<(Vec<Post>, i64)> {
        let tables = self.read()?;
        let mut matched: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|p| post_matches(p, filter))
            .collect();
        matched.sort_by(|a, b| compare_posts(a, b, filter.ordering));

        let total = matched.len() as i64;
        Ok((window(matched, limit, offset), total))
    }

    fn post_stats(&self, post_ids: &[Uuid], viewer_id: Uuid) -> AppResult<HashMap<Uuid, PostStats>> {
        let tables = self.read()?;
        let mut stats: HashMap<Uuid, PostStats> =
            post_ids.iter().map(|id| (*id, PostStats::default())).collect();

        for like in &tables.likes {
            if let Some(entry) = stats.get_mut(&like.post_id) {
                entry.likes_count += 1;
                if like.user_id == viewer_id {
                    entry.is_liked = true;
                }
            }
        }
        for comment in &tables.comments {
            if let Some(entry) = stats.get_mut(&comment.post_id) {
                entry.comment_count += 1;
            }
        }

        Ok(stats)
    }

    // --- comments ---

    fn insert_comment(&self, new_comment: NewComment, notice: Option<NewNotification>) -> AppResult<Comment> {
        let mut tables = self.write()?;
        if !tables.posts.iter().any(|p| p.id == new_comment.post_id) {
            return Err(AppError::new(ErrorCode::PostNotFound, "post not found"));
        }
        let notification = notice.map(|n| notification_row(&tables, n)).transpose()?;

        let now = Utc::now();
        let comment = Comment {
            id: new_comment.id,
            post_id: new_comment.post_id,
            author_id: new_comment.author_id,
            content: new_comment.content,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        tables.notifications.extend(notification);
        Ok(comment)
    }

    fn find_comment(&self, id: Uuid) -> AppResult<Option<Comment>> {
        Ok(self.read()?.comments.iter().find(|c| c.id == id).cloned())
    }

    fn update_comment(&self, id: Uuid, changes: UpdateComment) -> AppResult<Comment> {
        let mut tables = self.write()?;
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::new(ErrorCode::CommentNotFound, "comment not found"))?;

        if let Some(v) = changes.content { comment.content = v; }
        if let Some(v) = changes.updated_at { comment.updated_at = v; }

        Ok(comment.clone())
    }

    fn delete_comment(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.write()?;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() < before)
    }

    fn list_comments(&self, filter: &CommentFilter, limit: i64, offset: i64) -> AppResult<(Vec<Comment>, i64)> {
        let tables = self.read()?;
        let mut matched: Vec<&Comment> = tables
            .comments
            .iter()
            .filter(|c| filter.post_id.map_or(true, |id| c.post_id == id))
            .filter(|c| filter.author_id.map_or(true, |id| c.author_id == id))
            .collect();
        matched.sort_by(|a, b| match filter.ordering {
            CommentOrdering::OldestFirst => a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)),
            CommentOrdering::NewestFirst => b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)),
        });

        let total = matched.len() as i64;
        Ok((window(matched, limit, offset), total))
    }

    // --- likes ---

    fn insert_like(&self, new_like: NewLike, notice: Option<NewNotification>) -> AppResult<Like> {
        let mut tables = self.write()?;
        if !tables.posts.iter().any(|p| p.id == new_like.post_id) {
            return Err(AppError::new(ErrorCode::PostNotFound, "post not found"));
        }
        if tables
            .likes
            .iter()
            .any(|l| l.post_id == new_like.post_id && l.user_id == new_like.user_id)
        {
            return Err(AppError::new(ErrorCode::LikeAlreadyExists, "you have already liked this post"));
        }
        let notification = notice.map(|n| notification_row(&tables, n)).transpose()?;

        let like = Like {
            id: new_like.id,
            post_id: new_like.post_id,
            user_id: new_like.user_id,
            created_at: Utc::now(),
        };
        tables.likes.push(like.clone());
        tables.notifications.extend(notification);
        Ok(like)
    }

    fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut tables = self.write()?;
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(tables.likes.len() < before)
    }

    fn list_likes(&self, post_id: Uuid) -> AppResult<Vec<Like>> {
        let tables = self.read()?;
        let mut likes: Vec<Like> = tables
            .likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .cloned()
            .collect();
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(likes)
    }

    // --- notifications ---

    fn insert_notification(&self, new_notification: NewNotification) -> AppResult<Notification> {
        let mut tables = self.write()?;
        let notification = notification_row(&tables, new_notification)?;
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    fn find_notification(&self, id: Uuid) -> AppResult<Option<Notification>> {
        Ok(self.read()?.notifications.iter().find(|n| n.id == id).cloned())
    }

    fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Notification>, i64)> {
        let tables = self.read()?;
        let mut matched: Vec<&Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .filter(|n| !unread_only || !n.is_read)
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let total = matched.len() as i64;
        Ok((window(matched, limit, offset), total))
    }

    fn count_unread(&self, recipient_id: Uuid) -> AppResult<i64> {
        Ok(self
            .read()?
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
            .count() as i64)
    }

    fn mark_notification_read(&self, id: Uuid) -> AppResult<Notification> {
        let mut tables = self.write()?;
        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::new(ErrorCode::NotificationNotFound, "notification not found"))?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    fn mark_all_read(&self, recipient_id: Uuid) -> AppResult<usize> {
        let mut tables = self.write()?;
        let mut updated = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
        {
            n.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
