mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn self_interactions_create_no_notifications() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let post_id = app.create_post(&ada, "Talking to myself").await;

    app.post(&format!("/posts/{post_id}/like"), &ada, None).await;
    app.post("/comments", &ada, Some(json!({ "post": post_id, "content": "me again" })))
        .await;

    let (_, body) = app.get("/notifications", &ada).await;
    assert_eq!(body["data"]["count"], 0);
    let (_, body) = app.get("/notifications/unread-count", &ada).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn follow_like_and_comment_notify_the_owner() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let post_id = app.create_post(&ada, "Notify me").await;

    app.post(&format!("/follow/{}", ada.id), &grace, None).await;
    app.post(&format!("/posts/{post_id}/like"), &grace, None).await;
    app.post("/comments", &grace, Some(json!({ "post": post_id, "content": "Great" })))
        .await;

    let (status, body) = app.get("/notifications", &ada).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);

    let results = body["data"]["results"].as_array().expect("results");
    let verbs: Vec<&str> = results.iter().map(|n| n["verb"].as_str().expect("verb")).collect();
    assert_eq!(verbs, vec!["commented on your post", "liked your post", "started following you"]);
    assert_eq!(results[1]["target_url"], format!("/posts/{post_id}"));
    assert_eq!(results[2]["target_url"], "/users/grace");
    assert_eq!(results[2]["actor"]["username"], "grace");

    let (_, body) = app.get("/notifications", &grace).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn marking_read_is_owner_only_and_idempotent() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    app.post(&format!("/follow/{}", ada.id), &grace, None).await;
    app.post(&format!("/follow/{}", grace.id), &ada, None).await;

    let (_, body) = app.get("/notifications", &ada).await;
    let id = body["data"]["results"][0]["id"].as_str().expect("id").to_string();
    let read_uri = format!("/notifications/{id}/read");

    let (status, body) = app.post(&read_uri, &grace, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "E0005");

    for _ in 0..2 {
        let (status, body) = app.post(&read_uri, &ada, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_read"], true);
    }

    let (_, body) = app.get("/notifications?unread=true", &ada).await;
    assert_eq!(body["data"]["count"], 0);

    let (status, _) = app
        .post("/notifications/0190a0a0-0000-7000-8000-000000000000/read", &ada, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mark_all_read_reports_flipped_rows() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let linus = app.register("linus").await;
    app.post(&format!("/follow/{}", ada.id), &grace, None).await;
    app.post(&format!("/follow/{}", ada.id), &linus, None).await;

    let (_, body) = app.get("/notifications/unread-count", &ada).await;
    assert_eq!(body["data"]["count"], 2);

    let (_, body) = app.post("/notifications/mark-all-read", &ada, None).await;
    assert_eq!(body["data"]["updated"], 2);
    let (_, body) = app.post("/notifications/mark-all-read", &ada, None).await;
    assert_eq!(body["data"]["updated"], 0);
}
