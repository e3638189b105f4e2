pub mod comment_service;
pub mod feed_service;
pub mod follow_service;
pub mod like_service;
pub mod notification_service;
pub mod post_service;
pub mod token_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support {
    use uuid::Uuid;

    use crate::models::{NewFollow, NewPost, NewUser, Post, User};
    use crate::store::{MemoryStore, SocialStore};

    /// Inserts a user directly, skipping password hashing.
    pub fn user(store: &MemoryStore, username: &str) -> User {
        store
            .insert_user(NewUser {
                id: Uuid::now_v7(),
                username: username.into(),
                email: format!("{username}@example.com"),
                password_hash: "unused".into(),
                first_name: String::new(),
                last_name: String::new(),
            })
            .expect("insert user")
    }

    pub fn post(store: &MemoryStore, author: &User, title: &str) -> Post {
        store
            .insert_post(NewPost {
                id: Uuid::now_v7(),
                title: title.into(),
                content: "long enough content".into(),
                author_id: author.id,
            })
            .expect("insert post")
    }

    pub fn follow(store: &MemoryStore, follower: &User, followee: &User) {
        store
            .insert_follow(
                NewFollow {
                    id: Uuid::now_v7(),
                    follower_id: follower.id,
                    followee_id: followee.id,
                },
                None,
            )
            .expect("insert follow");
    }
}
