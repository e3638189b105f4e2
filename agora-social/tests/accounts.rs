mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{TestApp, PASSWORD};

#[tokio::test]
async fn health_reports_store() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "agora-social");
    assert_eq!(body["checks"][0]["name"], "store");
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/feed", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, body) = app.request(Method::GET, "/profile", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "E1002");

    let (status, _) = app
        .request(Method::POST, "/posts", None, Some(json!({ "title": "Sneaky", "content": "no auth here" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn provisioning_rejects_duplicates_and_weak_passwords() {
    let app = TestApp::new();
    app.register("ada").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/internal/users",
            None,
            Some(json!({ "username": "ada", "email": "new@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E2002");

    let (status, body) = app
        .request(
            Method::POST,
            "/internal/users",
            None,
            Some(json!({ "username": "grace", "email": "grace@example.com", "password": "weak" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E1004");

    let (status, body) = app
        .request(
            Method::POST,
            "/internal/users",
            None,
            Some(json!({ "username": "grace", "email": "not-an-email", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");
}

#[tokio::test]
async fn profile_can_be_read_and_updated() {
    let app = TestApp::new();
    let ada = app.register("ada").await;

    let (status, body) = app.get("/profile", &ada).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ada");
    assert_eq!(body["data"]["email"], "ada@example.com");

    let (status, body) = app
        .request(
            Method::PATCH,
            "/profile",
            Some(&ada.token),
            Some(json!({ "bio": "Analytical engines", "website": "https://example.com/ada" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "Analytical engines");

    let (status, _) = app
        .request(Method::PATCH, "/profile", Some(&ada.token), Some(json!({ "bio": "x".repeat(501) })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(Method::PATCH, "/profile", Some(&ada.token), Some(json!({ "website": "not a url" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long_url = format!("https://example.com/{}", "a".repeat(200));
    let (status, body) = app
        .request(Method::PATCH, "/profile", Some(&ada.token), Some(json!({ "website": long_url })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");
}

#[tokio::test]
async fn password_change_requires_old_password() {
    let app = TestApp::new();
    let ada = app.register("ada").await;

    let (status, body) = app
        .post(
            "/profile/password",
            &ada,
            Some(json!({ "old_password": "wrong", "new_password": "fresh1234", "confirm_password": "fresh1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E1003");

    let (status, _) = app
        .post(
            "/profile/password",
            &ada,
            Some(json!({ "old_password": PASSWORD, "new_password": "fresh1234", "confirm_password": "fresh1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_an_account_removes_its_content() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let post_id = app.create_post(&ada, "Soon to vanish").await;
    app.post(&format!("/follow/{}", ada.id), &grace, None).await;

    let (status, _) = app.request(Method::DELETE, "/profile", Some(&ada.token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/posts/{post_id}"), &grace).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app.get("/users/grace/following", &grace).await;
    assert_eq!(body["data"]["count"], 0);
}
