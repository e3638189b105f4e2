use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use agora_shared::errors::{AppError, AppResult, ErrorCode};
use agora_shared::types::{Page, PageParams};

use crate::models::{Comment, NewComment, Target, UpdateComment, Verb};
use crate::services::notification_service;
use crate::services::post_service;
use crate::services::user_service::{self, UserSummary};
use crate::store::{CommentFilter, SocialStore};

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: UserSummary,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn views(store: &dyn SocialStore, comments: Vec<Comment>) -> AppResult<Vec<CommentView>> {
    let author_ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
    let authors = user_service::summaries(store, &author_ids)?;

    Ok(comments
        .into_iter()
        .filter_map(|c| {
            Some(CommentView {
                author: authors.get(&c.author_id)?.clone(),
                id: c.id,
                post_id: c.post_id,
                content: c.content,
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
        })
        .collect())
}

fn view(store: &dyn SocialStore, comment: Comment) -> AppResult<CommentView> {
    views(store, vec![comment])?
        .pop()
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "comment author not found"))
}

pub fn require_comment(store: &dyn SocialStore, id: Uuid) -> AppResult<Comment> {
    store
        .find_comment(id)?
        .ok_or_else(|| AppError::new(ErrorCode::CommentNotFound, "comment not found"))
}

pub fn create(store: &dyn SocialStore, author_id: Uuid, post_id: Uuid, content: String) -> AppResult<CommentView> {
    let post = post_service::require_post(store, post_id)?;

    let comment_id = Uuid::now_v7();
    let comment = store.insert_comment(
        NewComment {
            id: comment_id,
            post_id,
            author_id,
            content,
        },
        notification_service::notice(post.author_id, author_id, Verb::CommentedOnPost, Target::Comment(comment_id)),
    )?;

    tracing::info!(comment_id = %comment.id, post_id = %post_id, "comment created");
    view(store, comment)
}

pub fn get(store: &dyn SocialStore, comment_id: Uuid) -> AppResult<CommentView> {
    view(store, require_comment(store, comment_id)?)
}

/// Every comment on a post, oldest first.
pub fn for_post(store: &dyn SocialStore, post_id: Uuid) -> AppResult<Vec<CommentView>> {
    post_service::require_post(store, post_id)?;
    let filter = CommentFilter {
        post_id: Some(post_id),
        ..Default::default()
    };
    let (comments, _) = store.list_comments(&filter, i64::MAX, 0)?;
    views(store, comments)
}

pub fn list(
    store: &dyn SocialStore,
    filter: &CommentFilter,
    params: &PageParams,
    page_size: u64,
) -> AppResult<Page<CommentView>> {
    let (comments, total) = store.list_comments(filter, page_size as i64, params.offset(page_size))?;
    Ok(Page::new(views(store, comments)?, total as u64, params, page_size))
}

fn require_own_comment(store: &dyn SocialStore, actor_id: Uuid, comment_id: Uuid) -> AppResult<Comment> {
    let comment = require_comment(store, comment_id)?;
    if comment.author_id != actor_id {
        return Err(AppError::new(ErrorCode::NotAuthor, "only the author can modify this comment"));
    }
    Ok(comment)
}

pub fn update(store: &dyn SocialStore, actor_id: Uuid, comment_id: Uuid, content: String) -> AppResult<CommentView> {
    require_own_comment(store, actor_id, comment_id)?;
    let comment = store.update_comment(
        comment_id,
        UpdateComment {
            content: Some(content),
            updated_at: Some(Utc::now()),
        },
    )?;
    view(store, comment)
}

pub fn delete(store: &dyn SocialStore, actor_id: Uuid, comment_id: Uuid) -> AppResult<()> {
    require_own_comment(store, actor_id, comment_id)?;
    store.delete_comment(comment_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn commenting_notifies_post_author_only_when_someone_else() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let grace = test_support::user(&store, "grace");
        let post = test_support::post(&store, &ada, "Discuss this");

        let comment = create(&store, grace.id, post.id, "Interesting".into()).unwrap();
        create(&store, ada.id, post.id, "Thanks".into()).unwrap();

        let (items, total) = store.list_notifications(ada.id, false, 10, 0).unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].verb, "commented on your post");
        assert_eq!(items[0].target(), Some(Target::Comment(comment.id)));
    }

    #[test]
    fn comment_on_missing_post_fails() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let err = create(&store, ada.id, Uuid::now_v7(), "hello".into()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PostNotFound);
    }

    #[test]
    fn only_author_edits_or_deletes() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let grace = test_support::user(&store, "grace");
        let post = test_support::post(&store, &ada, "Discuss this");
        let comment = create(&store, grace.id, post.id, "Interesting".into()).unwrap();

        assert_eq!(update(&store, ada.id, comment.id, "edit".into()).unwrap_err().code(), ErrorCode::NotAuthor);
        assert_eq!(delete(&store, ada.id, comment.id).unwrap_err().code(), ErrorCode::NotAuthor);

        assert_eq!(update(&store, grace.id, comment.id, "Edited".into()).unwrap().content, "Edited");
        delete(&store, grace.id, comment.id).unwrap();
        assert_eq!(get(&store, comment.id).unwrap_err().code(), ErrorCode::CommentNotFound);
    }

    #[test]
    fn list_filters_by_author() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let grace = test_support::user(&store, "grace");
        let post = test_support::post(&store, &ada, "Discuss this");
        create(&store, grace.id, post.id, "one".into()).unwrap();
        create(&store, ada.id, post.id, "two".into()).unwrap();

        let filter = CommentFilter { author_id: Some(grace.id), ..Default::default() };
        let page = list(&store, &filter, &PageParams::default(), 10).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].author.username, "grace");
    }
}
