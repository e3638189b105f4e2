mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn post_validation_rejects_short_fields() {
    let app = TestApp::new();
    let ada = app.register("ada").await;

    let (status, body) = app
        .post("/posts", &ada, Some(json!({ "title": "Hey", "content": "This is long enough" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");

    let (status, _) = app
        .post("/posts", &ada, Some(json!({ "title": "A fine title", "content": "short" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_author_can_change_a_post() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let post_id = app.create_post(&ada, "Original title").await;
    let uri = format!("/posts/{post_id}");

    let (status, body) = app
        .request(Method::PATCH, &uri, Some(&grace.token), Some(json!({ "title": "Taken over" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "E3005");

    let (status, _) = app.request(Method::DELETE, &uri, Some(&grace.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(Method::PATCH, &uri, Some(&ada.token), Some(json!({ "title": "Revised title" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Revised title");
    assert_eq!(body["data"]["content"], "This is the body of the post.");

    let (status, _) = app.request(Method::DELETE, &uri, Some(&ada.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&uri, &ada).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "E3001");
}

#[tokio::test]
async fn post_detail_includes_comments_and_like_state() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let post_id = app.create_post(&ada, "Discussion post").await;

    let (status, _) = app
        .post("/comments", &grace, Some(json!({ "post": post_id, "content": "First comment" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    app.post("/comments", &ada, Some(json!({ "post": post_id, "content": "Reply" })))
        .await;
    app.post(&format!("/posts/{post_id}/like"), &grace, None).await;

    let (_, body) = app.get(&format!("/posts/{post_id}"), &grace).await;
    let post = &body["data"];
    assert_eq!(post["comment_count"], 2);
    assert_eq!(post["likes_count"], 1);
    assert_eq!(post["is_liked"], true);
    assert_eq!(post["comments"][0]["content"], "First comment");
    assert_eq!(post["comments"][1]["content"], "Reply");

    let (_, body) = app.get(&format!("/posts/{post_id}"), &ada).await;
    assert_eq!(body["data"]["is_liked"], false);
}

#[tokio::test]
async fn liking_twice_fails_and_unlike_requires_a_like() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let post_id = app.create_post(&ada, "Likeable post").await;
    let like_uri = format!("/posts/{post_id}/like");

    let (status, _) = app.post(&like_uri, &grace, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.post(&like_uri, &grace, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E3003");

    let (_, body) = app.get(&format!("/posts/{post_id}/likes"), &ada).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["user"]["username"], "grace");

    let unlike_uri = format!("/posts/{post_id}/unlike");
    let (status, _) = app.post(&unlike_uri, &grace, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.post(&unlike_uri, &grace, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "E3004");
}

#[tokio::test]
async fn post_listing_filters_and_mine() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    app.create_post(&ada, "Rust ownership").await;
    app.create_post(&grace, "Learning rust").await;
    app.create_post(&grace, "Gardening notes").await;

    let (_, body) = app.get("/posts?title=RUST", &ada).await;
    assert_eq!(body["data"]["count"], 2);

    let (_, body) = app.get("/posts?ordering=title", &ada).await;
    assert_eq!(body["data"]["results"][0]["title"], "Gardening notes");

    let (status, body) = app.get("/posts?ordering=likes", &ada).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");

    let (_, body) = app.get("/posts/mine", &grace).await;
    assert_eq!(body["data"]["count"], 2);
}

#[tokio::test]
async fn comment_changes_are_author_only() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let post_id = app.create_post(&ada, "Commentable").await;

    let (_, body) = app
        .post("/comments", &grace, Some(json!({ "post": post_id, "content": "Nice" })))
        .await;
    let comment_uri = format!("/comments/{}", body["data"]["id"].as_str().expect("comment id"));

    let (status, _) = app
        .request(Method::PATCH, &comment_uri, Some(&ada.token), Some(json!({ "content": "Edited" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(Method::PATCH, &comment_uri, Some(&grace.token), Some(json!({ "content": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/comments/mine", &grace).await;
    assert_eq!(body["data"]["count"], 1);

    let (status, _) = app.request(Method::DELETE, &comment_uri, Some(&grace.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&comment_uri, &grace).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
