use serde::Serialize;
use uuid::Uuid;

use agora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Follow, NewFollow, Target, Verb};
use crate::services::notification_service;
use crate::services::user_service::{self, UserSummary};
use crate::store::SocialStore;

/// Follower or following side of one user's graph.
#[derive(Debug, Serialize)]
pub struct FollowList {
    pub username: String,
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserSummary>>,
}

pub fn follow(store: &dyn SocialStore, actor_id: Uuid, target_id: Uuid) -> AppResult<Follow> {
    if actor_id == target_id {
        return Err(AppError::new(ErrorCode::CannotFollowSelf, "cannot follow yourself"));
    }
    user_service::require_user(store, target_id)?;

    // A concurrent duplicate loses on the unique edge constraint.
    let follow = store.insert_follow(
        NewFollow {
            id: Uuid::now_v7(),
            follower_id: actor_id,
            followee_id: target_id,
        },
        notification_service::notice(target_id, actor_id, Verb::Followed, Target::User(actor_id)),
    )?;

    tracing::info!(follower_id = %actor_id, followee_id = %target_id, "follow created");
    Ok(follow)
}

pub fn unfollow(store: &dyn SocialStore, actor_id: Uuid, target_id: Uuid) -> AppResult<()> {
    user_service::require_user(store, target_id)?;

    if !store.delete_follow(actor_id, target_id)? {
        return Err(AppError::new(ErrorCode::FollowNotFound, "you are not following this user"));
    }

    tracing::info!(follower_id = %actor_id, followee_id = %target_id, "follow removed");
    Ok(())
}

pub fn followers_of(store: &dyn SocialStore, username: &str, with_list: bool) -> AppResult<FollowList> {
    let user = user_service::require_username(store, username)?;
    let count = store.count_followers(user.id)?;
    let users = if with_list {
        Some(user_service::ordered_summaries(store, &store.follower_ids(user.id)?)?)
    } else {
        None
    };

    Ok(FollowList { username: user.username, count, users })
}

pub fn following_of(store: &dyn SocialStore, username: &str, with_list: bool) -> AppResult<FollowList> {
    let user = user_service::require_username(store, username)?;
    let count = store.count_following(user.id)?;
    let users = if with_list {
        Some(user_service::ordered_summaries(store, &store.followee_ids(user.id)?)?)
    } else {
        None
    };

    Ok(FollowList { username: user.username, count, users })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn follow_then_unfollow_restores_graph() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let grace = test_support::user(&store, "grace");

        follow(&store, ada.id, grace.id).unwrap();
        assert_eq!(followers_of(&store, "grace", false).unwrap().count, 1);

        unfollow(&store, ada.id, grace.id).unwrap();
        assert_eq!(followers_of(&store, "grace", false).unwrap().count, 0);
        assert_eq!(following_of(&store, "ada", false).unwrap().count, 0);
    }

    #[test]
    fn duplicate_and_missing_edges_fail() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let grace = test_support::user(&store, "grace");

        follow(&store, ada.id, grace.id).unwrap();
        let err = follow(&store, ada.id, grace.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FollowAlreadyExists);

        let err = unfollow(&store, grace.id, ada.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FollowNotFound);

        let err = follow(&store, ada.id, Uuid::now_v7()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }

    #[test]
    fn cannot_follow_self() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");

        let err = follow(&store, ada.id, ada.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CannotFollowSelf);
        assert_eq!(store.count_following(ada.id).unwrap(), 0);
    }

    #[test]
    fn follow_notifies_followee_with_actor_target() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let grace = test_support::user(&store, "grace");

        follow(&store, ada.id, grace.id).unwrap();

        let (items, total) = store.list_notifications(grace.id, false, 10, 0).unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].verb, "started following you");
        assert_eq!(items[0].target(), Some(Target::User(ada.id)));
    }

    #[test]
    fn lists_are_in_follow_order() {
        let store = MemoryStore::new();
        let ada = test_support::user(&store, "ada");
        let grace = test_support::user(&store, "grace");
        let linus = test_support::user(&store, "linus");

        follow(&store, ada.id, linus.id).unwrap();
        follow(&store, ada.id, grace.id).unwrap();

        let following = following_of(&store, "ada", true).unwrap();
        let names: Vec<_> = following.users.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["linus", "grace"]);

        assert!(followers_of(&store, "grace", false).unwrap().users.is_none());
    }
}
