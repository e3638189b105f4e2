#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use agora_social::config::{AppConfig, StorageKind};
use agora_social::store::MemoryStore;
use agora_social::{build_router, AppState};

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    router: Router,
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_page_size(10)
    }

    pub fn with_page_size(page_size: u64) -> Self {
        let config = AppConfig {
            storage: StorageKind::Memory,
            jwt_secret: "integration-test-secret".into(),
            page_size,
            ..Default::default()
        };
        let state = AppState::new(Arc::new(MemoryStore::new()), config);
        Self {
            router: build_router(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize body"))
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(&user.token), body).await
    }

    pub async fn register(&self, username: &str) -> TestUser {
        let (status, body) = self
            .request(
                Method::POST,
                "/internal/users",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");

        TestUser {
            id: body["data"]["user"]["id"].as_str().expect("user id").to_string(),
            username: username.to_string(),
            token: body["data"]["token"]["access_token"]
                .as_str()
                .expect("access token")
                .to_string(),
        }
    }

    pub async fn create_post(&self, author: &TestUser, title: &str) -> String {
        let (status, body) = self
            .post(
                "/posts",
                author,
                Some(json!({ "title": title, "content": "This is the body of the post." })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create post: {body}");
        body["data"]["id"].as_str().expect("post id").to_string()
    }
}
