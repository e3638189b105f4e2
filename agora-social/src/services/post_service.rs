use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use agora_shared::errors::{AppError, AppResult, ErrorCode};
use agora_shared::types::{Page, PageParams};

use crate::models::{NewPost, Post, UpdatePost};
use crate::services::comment_service::{self, CommentView};
use crate::services::user_service::{self, UserSummary};
use crate::store::{PostFilter, SocialStore};

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: UserSummary,
    pub comment_count: i64,
    pub likes_count: i64,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub fn require_post(store: &dyn SocialStore, id: Uuid) -> AppResult<Post> {
    store
        .find_post(id)?
        .ok_or_else(|| AppError::new(ErrorCode::PostNotFound, "post not found"))
}

/// Decorates posts with their author and per-viewer stats. Posts whose author
/// disappeared mid-request are dropped.
pub fn views(store: &dyn SocialStore, viewer_id: Uuid, posts: Vec<Post>) -> AppResult<Vec<PostView>> {
    let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
    let stats = store.post_stats(&ids, viewer_id)?;
    let authors = user_service::summaries(store, &author_ids)?;

    Ok(posts
        .into_iter()
        .filter_map(|post| {
            let author = authors.get(&post.author_id)?.clone();
            let stats = stats.get(&post.id).copied().unwrap_or_default();
            Some(PostView {
                id: post.id,
                title: post.title,
                content: post.content,
                author,
                comment_count: stats.comment_count,
                likes_count: stats.likes_count,
                is_liked: stats.is_liked,
                created_at: post.created_at,
                updated_at: post.updated_at,
            })
        })
        .collect())
}

fn view(store: &dyn SocialStore, viewer_id: Uuid, post: Post) -> AppResult<PostView> {
    views(store, viewer_id, vec![post])?
        .pop()
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "post author not found"))
}

pub fn list(
    store: &dyn SocialStore,
    viewer_id: Uuid,
    filter: &PostFilter,
    params: &PageParams,
    page_size: u64,
) -> AppResult<Page<PostView>> {
    let (posts, total) = store.list_posts(filter, page_size as i64, params.offset(page_size))?;
    Ok(Page::new(views(store, viewer_id, posts)?, total as u64, params, page_size))
}

pub fn create(store: &dyn SocialStore, author_id: Uuid, title: String, content: String) -> AppResult<PostView> {
    let post = store.insert_post(NewPost {
        id: Uuid::now_v7(),
        title,
        content,
        author_id,
    })?;

    tracing::info!(post_id = %post.id, author_id = %author_id, "post created");
    view(store, author_id, post)
}

pub fn detail(store: &dyn SocialStore, viewer_id: Uuid, post_id: Uuid) -> AppResult<PostDetail> {
    let post = require_post(store, post_id)?;
    let comments = comment_service::for_post(store, post_id)?;
    Ok(PostDetail {
        post: view(store, viewer_id, post)?,
        comments,
    })
}

fn require_own_post(store: &dyn SocialStore, actor_id: Uuid, post_id: Uuid) -> AppResult<Post> {
    let post = require_post(store, post_id)?;
    if post.author_id != actor_id {
        return Err(AppError::new(ErrorCode::NotAuthor, "only the author can modify this post"));
    }
    Ok(post)
}

pub fn update(store: &dyn SocialStore, actor_id: Uuid, post_id: Uuid, changes: PostChanges) -> AppResult<PostView> {
    require_own_post(store, actor_id, post_id)?;

    let post = store.update_post(
        post_id,
        UpdatePost {
            title: changes.title,
            content: changes.content,
            updated_at: Some(Utc::now()),
        },
    )?;
    view(store, actor_id, post)
}

pub fn delete(store: &dyn SocialStore, actor_id: Uuid, post_id: Uuid) -> AppResult<()> {
    require_own_post(store, actor_id, post_id)?;
    store.delete_post(post_id)?;
    tracing::info!(post_id = %post_id, "post deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{comment_service, like_service, test_support};
    use crate::store::{MemoryStore, PostOrdering};
    use pretty_assertions::assert_eq;

    #[test]
    fn only_the_author_may_modify() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let grace = test_support::user(&store, "grace");
        let post = create(&store, ada.id, "First post".into(), "Hello there, world".into()).unwrap();

        let err = update(&store, grace.id, post.id, PostChanges { title: Some("Hijacked".into()), content: None })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotAuthor);
        let err = delete(&store, grace.id, post.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotAuthor);

        let updated = update(&store, ada.id, post.id, PostChanges { title: Some("Edited post".into()), content: None })
            .unwrap();
        assert_eq!(updated.title, "Edited post");
        assert_eq!(updated.content, "Hello there, world");
        assert!(updated.updated_at >= post.updated_at);

        delete(&store, ada.id, post.id).unwrap();
        let err = detail(&store, ada.id, post.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PostNotFound);
    }

    #[test]
    fn detail_carries_stats_and_comments() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let grace = test_support::user(&store, "grace");
        let post = test_support::post(&store, &ada, "Stats post");

        comment_service::create(&store, grace.id, post.id, "first!".into()).unwrap();
        comment_service::create(&store, ada.id, post.id, "thanks".into()).unwrap();
        like_service::like(&store, grace.id, post.id).unwrap();

        let seen_by_grace = detail(&store, grace.id, post.id).unwrap();
        assert_eq!(seen_by_grace.post.comment_count, 2);
        assert_eq!(seen_by_grace.post.likes_count, 1);
        assert!(seen_by_grace.post.is_liked);
        let contents: Vec<_> = seen_by_grace.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first!", "thanks"]);

        assert!(!detail(&store, ada.id, post.id).unwrap().post.is_liked);
    }

    #[test]
    fn list_paginates_with_fixed_page_size() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        for i in 0..3 {
            test_support::post(&store, &ada, &format!("Post number {i}"));
        }

        let filter = PostFilter { ordering: PostOrdering::OldestFirst, ..Default::default() };
        let page = list(&store, ada.id, &filter, &PageParams::new(2), 2).unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.previous, Some(1));
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].title, "Post number 2");

        let beyond = list(&store, ada.id, &filter, &PageParams::new(9), 2).unwrap();
        assert!(beyond.results.is_empty());
        assert_eq!(beyond.count, 3);
    }
}
