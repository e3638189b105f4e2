use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{comments, follows, likes, notifications, posts, users};

// --- User ---

#[derive(Debug, Queryable, Identifiable, Clone, PartialEq)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture_url: Option<String>,
    pub password_hash: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Follow ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = follows)]
pub struct Follow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followee_id: Uuid,
}

// --- Post ---

#[derive(Debug, Queryable, Identifiable, Clone, PartialEq)]
#[diesel(table_name = posts)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = posts)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Comment ---

#[derive(Debug, Queryable, Identifiable, Clone, PartialEq)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = comments)]
pub struct UpdateComment {
    pub content: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Like ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = likes)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
}

// --- Notification ---

#[derive(Debug, Queryable, Identifiable, Clone, PartialEq)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub actor_id: Uuid,
    pub verb: String,
    pub target_type: String,
    pub target_id: Uuid,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub actor_id: Uuid,
    pub verb: String,
    pub target_type: String,
    pub target_id: Uuid,
}

/// What happened to the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Followed,
    LikedPost,
    CommentedOnPost,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Followed => "started following you",
            Verb::LikedPost => "liked your post",
            Verb::CommentedOnPost => "commented on your post",
        }
    }
}

/// Polymorphic reference to the entity a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    User(Uuid),
    Post(Uuid),
    Comment(Uuid),
}

impl Target {
    pub fn type_name(&self) -> &'static str {
        match self {
            Target::User(_) => "user",
            Target::Post(_) => "post",
            Target::Comment(_) => "comment",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Target::User(id) | Target::Post(id) | Target::Comment(id) => *id,
        }
    }

    pub fn parse(type_name: &str, id: Uuid) -> Option<Self> {
        match type_name {
            "user" => Some(Target::User(id)),
            "post" => Some(Target::Post(id)),
            "comment" => Some(Target::Comment(id)),
            _ => None,
        }
    }
}

impl Notification {
    pub fn target(&self) -> Option<Target> {
        Target::parse(&self.target_type, self.target_id)
    }
}
