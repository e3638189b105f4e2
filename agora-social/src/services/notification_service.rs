use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use agora_shared::errors::{AppError, AppResult, ErrorCode};
use agora_shared::types::{Page, PageParams};

use crate::models::{NewNotification, Notification, Target, Verb};
use crate::services::user_service::{self, UserSummary};
use crate::store::SocialStore;

#[derive(Debug, Serialize)]
pub struct NotificationView {
    pub id: Uuid,
    pub actor: Option<UserSummary>,
    pub verb: String,
    pub target_type: String,
    pub target_id: Uuid,
    pub target_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// The notification row for `actor_id` doing `verb` to something of
/// `recipient_id`'s, or `None` when both are the same user.
pub fn notice(recipient_id: Uuid, actor_id: Uuid, verb: Verb, target: Target) -> Option<NewNotification> {
    (recipient_id != actor_id).then(|| NewNotification {
        id: Uuid::now_v7(),
        recipient_id,
        actor_id,
        verb: verb.as_str().to_string(),
        target_type: target.type_name().to_string(),
        target_id: target.id(),
    })
}

/// Records a standalone notification. Follows, likes and comments hand
/// their `notice` to the store instead so both rows commit together.
pub fn notify(
    store: &dyn SocialStore,
    recipient_id: Uuid,
    actor_id: Uuid,
    verb: Verb,
    target: Target,
) -> AppResult<Option<Notification>> {
    let Some(new_notification) = notice(recipient_id, actor_id, verb, target) else {
        return Ok(None);
    };

    let notification = store.insert_notification(new_notification)?;

    tracing::debug!(
        notification_id = %notification.id,
        recipient_id = %recipient_id,
        verb = verb.as_str(),
        "notification created"
    );

    Ok(Some(notification))
}

fn views(store: &dyn SocialStore, notifications: Vec<Notification>) -> AppResult<Vec<NotificationView>> {
    let mut user_ids: Vec<Uuid> = notifications.iter().map(|n| n.actor_id).collect();
    user_ids.extend(notifications.iter().filter_map(|n| match n.target() {
        Some(Target::User(id)) => Some(id),
        _ => None,
    }));
    user_ids.sort();
    user_ids.dedup();
    let users = user_service::summaries(store, &user_ids)?;

    Ok(notifications
        .into_iter()
        .map(|n| {
            let target_url = match n.target() {
                Some(Target::User(id)) => users.get(&id).map(|u| format!("/users/{}", u.username)),
                Some(Target::Post(id)) => Some(format!("/posts/{id}")),
                Some(Target::Comment(id)) => Some(format!("/comments/{id}")),
                None => None,
            };
            NotificationView {
                id: n.id,
                actor: users.get(&n.actor_id).cloned(),
                verb: n.verb,
                target_type: n.target_type,
                target_id: n.target_id,
                target_url,
                is_read: n.is_read,
                created_at: n.created_at,
            }
        })
        .collect())
}

pub fn list(
    store: &dyn SocialStore,
    owner_id: Uuid,
    unread_only: bool,
    params: &PageParams,
    page_size: u64,
) -> AppResult<Page<NotificationView>> {
    let (items, total) = store.list_notifications(
        owner_id,
        unread_only,
        page_size as i64,
        params.offset(page_size),
    )?;
    Ok(Page::new(views(store, items)?, total as u64, params, page_size))
}

pub fn unread_count(store: &dyn SocialStore, owner_id: Uuid) -> AppResult<i64> {
    store.count_unread(owner_id)
}

pub fn mark_read(store: &dyn SocialStore, owner_id: Uuid, notification_id: Uuid) -> AppResult<NotificationView> {
    let notification = store
        .find_notification(notification_id)?
        .ok_or_else(|| AppError::new(ErrorCode::NotificationNotFound, "notification not found"))?;

    if notification.recipient_id != owner_id {
        return Err(AppError::forbidden("this notification belongs to another user"));
    }

    let notification = if notification.is_read {
        notification
    } else {
        store.mark_notification_read(notification_id)?
    };

    let mut views = views(store, vec![notification])?;
    views
        .pop()
        .ok_or_else(|| AppError::internal("notification view missing"))
}

pub fn mark_all_read(store: &dyn SocialStore, owner_id: Uuid) -> AppResult<usize> {
    let updated = store.mark_all_read(owner_id)?;
    tracing::debug!(user_id = %owner_id, updated, "notifications marked read");
    Ok(updated)
}
