use std::collections::HashMap;

use diesel::dsl::count_star;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use agora_shared::clients::db::DbPool;
use agora_shared::errors::{AppError, AppResult, ErrorCode};

use super::{CommentFilter, CommentOrdering, PostFilter, PostOrdering, PostStats, SocialStore};
use crate::models::{
    Comment, Follow, Like, NewComment, NewFollow, NewLike, NewNotification, NewPost, NewUser,
    Notification, Post, UpdateComment, UpdatePost, UpdateUser, User,
};
use crate::schema::{comments, follows, likes, notifications, posts, users};

type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

/// `SocialStore` over a pooled PostgreSQL connection. Cascades and the
/// uniqueness rules live in the schema (see `migrations/`).
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<PgPooled> {
        self.pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection");
            AppError::internal("database connection error")
        })
    }
}

/// Case-insensitive substring pattern with LIKE metacharacters escaped.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Writes the notification that accompanies a follow, like or comment, on
/// the caller's connection so it shares that row's transaction.
fn insert_notice(conn: &mut PgConnection, notice: Option<NewNotification>) -> QueryResult<()> {
    if let Some(notice) = notice {
        diesel::insert_into(notifications::table)
            .values(&notice)
            .execute(conn)?;
    }
    Ok(())
}

fn is_unique_violation(err: &DieselError) -> bool {
    matches!(err, DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
}

fn map_user_conflict(err: DieselError) -> AppError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            if info.constraint_name() == Some("users_email_key") {
                AppError::new(ErrorCode::EmailTaken, "a user with that email already exists")
            } else {
                AppError::new(ErrorCode::UsernameTaken, "a user with that username already exists")
            }
        }
        DieselError::NotFound => AppError::new(ErrorCode::UserNotFound, "user not found"),
        other => AppError::Database(other),
    }
}

fn filtered_posts(filter: &PostFilter) -> posts::BoxedQuery<'static, Pg> {
    let mut query = posts::table.into_boxed();

    if let Some(ids) = &filter.author_ids {
        query = query.filter(posts::author_id.eq_any(ids.clone()));
    }
    if let Some(excluded) = filter.exclude_author {
        query = query.filter(posts::author_id.ne(excluded));
    }
    if let Some(term) = &filter.title_contains {
        query = query.filter(posts::title.ilike(contains_pattern(term)));
    }
    if let Some(term) = &filter.content_contains {
        query = query.filter(posts::content.ilike(contains_pattern(term)));
    }
    if let Some(term) = &filter.search {
        let pattern = contains_pattern(term);
        query = query.filter(
            posts::title
                .ilike(pattern.clone())
                .or(posts::content.ilike(pattern)),
        );
    }

    query
}

fn ordered_posts(
    query: posts::BoxedQuery<'static, Pg>,
    ordering: PostOrdering,
) -> posts::BoxedQuery<'static, Pg> {
    match ordering {
        PostOrdering::NewestFirst => query.order((posts::created_at.desc(), posts::id.desc())),
        PostOrdering::OldestFirst => query.order((posts::created_at.asc(), posts::id.desc())),
        PostOrdering::RecentlyUpdated => query.order((posts::updated_at.desc(), posts::id.desc())),
        PostOrdering::LeastRecentlyUpdated => query.order((posts::updated_at.asc(), posts::id.desc())),
        PostOrdering::TitleAsc => query.order((posts::title.asc(), posts::id.desc())),
        PostOrdering::TitleDesc => query.order((posts::title.desc(), posts::id.desc())),
    }
}

fn filtered_comments(filter: &CommentFilter) -> comments::BoxedQuery<'static, Pg> {
    let mut query = comments::table.into_boxed();

    if let Some(post_id) = filter.post_id {
        query = query.filter(comments::post_id.eq(post_id));
    }
    if let Some(author_id) = filter.author_id {
        query = query.filter(comments::author_id.eq(author_id));
    }

    query
}

impl SocialStore for PgStore {
    fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    // --- users ---

    fn insert_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut conn = self.conn()?;
        diesel::insert_into(users::table)
            .values(&new_user)
            .get_result::<User>(&mut conn)
            .map_err(map_user_conflict)
    }

    fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let mut conn = self.conn()?;
        Ok(users::table.find(id).first::<User>(&mut conn).optional()?)
    }

    fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let mut conn = self.conn()?;
        Ok(users::table
            .filter(users::username.eq(username))
            .first::<User>(&mut conn)
            .optional()?)
    }

    fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let mut conn = self.conn()?;
        Ok(users::table
            .filter(users::email.eq(email))
            .first::<User>(&mut conn)
            .optional()?)
    }

    fn users_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;
        Ok(users::table
            .filter(users::id.eq_any(ids))
            .load::<User>(&mut conn)?)
    }

    fn update_user(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        let mut conn = self.conn()?;
        diesel::update(users::table.find(id))
            .set(&changes)
            .get_result::<User>(&mut conn)
            .map_err(map_user_conflict)
    }

    fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(users::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    // --- follow graph ---

    fn insert_follow(&self, new_follow: NewFollow, notice: Option<NewNotification>) -> AppResult<Follow> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let follow = diesel::insert_into(follows::table)
                .values(&new_follow)
                .get_result::<Follow>(conn)
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::new(ErrorCode::FollowAlreadyExists, "already following this user")
                    } else if matches!(e, DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _)) {
                        AppError::new(ErrorCode::CannotFollowSelf, "cannot follow yourself")
                    } else {
                        AppError::Database(e)
                    }
                })?;
            insert_notice(conn, notice)?;
            Ok(follow)
        })
    }

    fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(follower_id))
                .filter(follows::followee_id.eq(followee_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn find_follow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<Option<Follow>> {
        let mut conn = self.conn()?;
        Ok(follows::table
            .filter(follows::follower_id.eq(follower_id))
            .filter(follows::followee_id.eq(followee_id))
            .first::<Follow>(&mut conn)
            .optional()?)
    }

    fn followee_ids(&self, follower_id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut conn = self.conn()?;
        Ok(follows::table
            .filter(follows::follower_id.eq(follower_id))
            .order((follows::created_at.asc(), follows::id.asc()))
            .select(follows::followee_id)
            .load::<Uuid>(&mut conn)?)
    }

    fn follower_ids(&self, followee_id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut conn = self.conn()?;
        Ok(follows::table
            .filter(follows::followee_id.eq(followee_id))
            .order((follows::created_at.asc(), follows::id.asc()))
            .select(follows::follower_id)
            .load::<Uuid>(&mut conn)?)
    }

    fn count_following(&self, follower_id: Uuid) -> AppResult<i64> {
        let mut conn = self.conn()?;
        Ok(follows::table
            .filter(follows::follower_id.eq(follower_id))
            .count()
            .get_result::<i64>(&mut conn)?)
    }

    fn count_followers(&self, followee_id: Uuid) -> AppResult<i64> {
        let mut conn = self.conn()?;
        Ok(follows::table
            .filter(follows::followee_id.eq(followee_id))
            .count()
            .get_result::<i64>(&mut conn)?)
    }

    // --- posts ---

    fn insert_post(&self, new_post: NewPost) -> AppResult<Post> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(posts::table)
            .values(&new_post)
            .get_result::<Post>(&mut conn)?)
    }

    fn find_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        let mut conn = self.conn()?;
        Ok(posts::table.find(id).first::<Post>(&mut conn).optional()?)
    }

    fn update_post(&self, id: Uuid, changes: UpdatePost) -> AppResult<Post> {
        let mut conn = self.conn()?;
        diesel::update(posts::table.find(id))
            .set(&changes)
            .get_result::<Post>(&mut conn)
            .map_err(|e| match e {
                DieselError::NotFound => AppError::new(ErrorCode::PostNotFound, "post not found"),
                other => AppError::Database(other),
            })
    }

    fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(posts::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn list_posts(&self, filter: &PostFilter, limit: i64, offset: i64) -> AppResult<(Vec<Post>, i64)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_posts(filter)
            .count()
            .get_result(&mut conn)?;

        let items = ordered_posts(filtered_posts(filter), filter.ordering)
            .limit(limit)
            .offset(offset)
            .load::<Post>(&mut conn)?;

        Ok((items, total))
    }

    fn post_stats(&self, post_ids: &[Uuid], viewer_id: Uuid) -> AppResult<HashMap<Uuid, PostStats>> {
        let mut stats: HashMap<Uuid, PostStats> =
            post_ids.iter().map(|id| (*id, PostStats::default())).collect();
        if post_ids.is_empty() {
            return Ok(stats);
        }

        let mut conn = self.conn()?;

        let like_counts: Vec<(Uuid, i64)> = likes::table
            .filter(likes::post_id.eq_any(post_ids))
            .group_by(likes::post_id)
            .select((likes::post_id, count_star()))
            .load(&mut conn)?;

        let comment_counts: Vec<(Uuid, i64)> = comments::table
            .filter(comments::post_id.eq_any(post_ids))
            .group_by(comments::post_id)
            .select((comments::post_id, count_star()))
            .load(&mut conn)?;

        let liked: Vec<Uuid> = likes::table
            .filter(likes::post_id.eq_any(post_ids))
            .filter(likes::user_id.eq(viewer_id))
            .select(likes::post_id)
            .load(&mut conn)?;

        for (post_id, count) in like_counts {
            stats.entry(post_id).or_default().likes_count = count;
        }
        for (post_id, count) in comment_counts {
            stats.entry(post_id).or_default().comment_count = count;
        }
        for post_id in liked {
            stats.entry(post_id).or_default().is_liked = true;
        }

        Ok(stats)
    }

    // --- comments ---

    fn insert_comment(&self, new_comment: NewComment, notice: Option<NewNotification>) -> AppResult<Comment> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let comment = diesel::insert_into(comments::table)
                .values(&new_comment)
                .get_result::<Comment>(conn)?;
            insert_notice(conn, notice)?;
            Ok(comment)
        })
    }

    fn find_comment(&self, id: Uuid) -> AppResult<Option<Comment>> {
        let mut conn = self.conn()?;
        Ok(comments::table.find(id).first::<Comment>(&mut conn).optional()?)
    }

    fn update_comment(&self, id: Uuid, changes: UpdateComment) -> AppResult<Comment> {
        let mut conn = self.conn()?;
        diesel::update(comments::table.find(id))
            .set(&changes)
            .get_result::<Comment>(&mut conn)
            .map_err(|e| match e {
                DieselError::NotFound => AppError::new(ErrorCode::CommentNotFound, "comment not found"),
                other => AppError::Database(other),
            })
    }

    fn delete_comment(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(comments::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn list_comments(&self, filter: &CommentFilter, limit: i64, offset: i64) -> AppResult<(Vec<Comment>, i64)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_comments(filter)
            .count()
            .get_result(&mut conn)?;

        let query = filtered_comments(filter);
        let query = match filter.ordering {
            CommentOrdering::OldestFirst => query.order((comments::created_at.asc(), comments::id.asc())),
            CommentOrdering::NewestFirst => query.order((comments::created_at.desc(), comments::id.desc())),
        };
        let items = query
            .limit(limit)
            .offset(offset)
            .load::<Comment>(&mut conn)?;

        Ok((items, total))
    }

    // --- likes ---

    fn insert_like(&self, new_like: NewLike, notice: Option<NewNotification>) -> AppResult<Like> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let like = diesel::insert_into(likes::table)
                .values(&new_like)
                .get_result::<Like>(conn)
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::new(ErrorCode::LikeAlreadyExists, "you have already liked this post")
                    } else {
                        AppError::Database(e)
                    }
                })?;
            insert_notice(conn, notice)?;
            Ok(like)
        })
    }

    fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            likes::table
                .filter(likes::post_id.eq(post_id))
                .filter(likes::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn list_likes(&self, post_id: Uuid) -> AppResult<Vec<Like>> {
        let mut conn = self.conn()?;
        Ok(likes::table
            .filter(likes::post_id.eq(post_id))
            .order((likes::created_at.desc(), likes::id.desc()))
            .load::<Like>(&mut conn)?)
    }

    // --- notifications ---

    fn insert_notification(&self, new_notification: NewNotification) -> AppResult<Notification> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(notifications::table)
            .values(&new_notification)
            .get_result::<Notification>(&mut conn)?)
    }

    fn find_notification(&self, id: Uuid) -> AppResult<Option<Notification>> {
        let mut conn = self.conn()?;
        Ok(notifications::table
            .find(id)
            .first::<Notification>(&mut conn)
            .optional()?)
    }

    fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Notification>, i64)> {
        let mut conn = self.conn()?;

        let scoped = || -> notifications::BoxedQuery<'static, Pg> {
            let mut query = notifications::table
                .filter(notifications::recipient_id.eq(recipient_id))
                .into_boxed();
            if unread_only {
                query = query.filter(notifications::is_read.eq(false));
            }
            query
        };

        let total: i64 = scoped().count().get_result(&mut conn)?;

        let items = scoped()
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .limit(limit)
            .offset(offset)
            .load::<Notification>(&mut conn)?;

        Ok((items, total))
    }

    fn count_unread(&self, recipient_id: Uuid) -> AppResult<i64> {
        let mut conn = self.conn()?;
        Ok(notifications::table
            .filter(notifications::recipient_id.eq(recipient_id))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)?)
    }

    fn mark_notification_read(&self, id: Uuid) -> AppResult<Notification> {
        let mut conn = self.conn()?;
        diesel::update(notifications::table.find(id))
            .set(notifications::is_read.eq(true))
            .get_result::<Notification>(&mut conn)
            .map_err(|e| match e {
                DieselError::NotFound => {
                    AppError::new(ErrorCode::NotificationNotFound, "notification not found")
                }
                other => AppError::Database(other),
            })
    }

    fn mark_all_read(&self, recipient_id: Uuid) -> AppResult<usize> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::recipient_id.eq(recipient_id))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)?;
        Ok(updated)
    }
}
