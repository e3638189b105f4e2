use std::sync::Arc;

use axum::extract::FromRef;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use agora_shared::middleware::{metrics_middleware, JwtSecret};

pub mod config;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

use crate::config::AppConfig;
use crate::store::SocialStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SocialStore>,
    pub config: Arc<AppConfig>,
    pub jwt_secret: JwtSecret,
}

impl AppState {
    pub fn new(store: Arc<dyn SocialStore>, config: AppConfig) -> Self {
        let jwt_secret = JwtSecret::new(&config.jwt_secret);
        Self {
            store,
            config: Arc::new(config),
            jwt_secret,
        }
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/users", post(routes::internal::provision_user))
        .route(
            "/profile",
            get(routes::profile::get_profile)
                .patch(routes::profile::update_profile)
                .delete(routes::profile::delete_profile),
        )
        .route("/profile/password", post(routes::profile::change_password))
        .route("/users/:username", get(routes::profile::get_user))
        .route("/users/:username/followers", get(routes::profile::list_followers))
        .route("/users/:username/following", get(routes::profile::list_following))
        .route("/follow/:id", post(routes::follows::follow_user))
        .route("/unfollow/:id", post(routes::follows::unfollow_user))
        .route("/feed", get(routes::feed::get_feed))
        .route("/posts", get(routes::posts::list_posts).post(routes::posts::create_post))
        .route("/posts/mine", get(routes::posts::my_posts))
        .route(
            "/posts/:id",
            get(routes::posts::get_post)
                .patch(routes::posts::update_post)
                .delete(routes::posts::delete_post),
        )
        .route("/posts/:id/comments", get(routes::posts::post_comments))
        .route("/posts/:id/like", post(routes::likes::like_post))
        .route("/posts/:id/unlike", post(routes::likes::unlike_post))
        .route("/posts/:id/likes", get(routes::likes::list_likes))
        .route(
            "/comments",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route("/comments/mine", get(routes::comments::my_comments))
        .route(
            "/comments/:id",
            get(routes::comments::get_comment)
                .patch(routes::comments::update_comment)
                .delete(routes::comments::delete_comment),
        )
        .route("/notifications", get(routes::notifications::list_notifications))
        .route("/notifications/unread-count", get(routes::notifications::unread_count))
        .route("/notifications/mark-all-read", post(routes::notifications::mark_all_read))
        .route("/notifications/:id/read", post(routes::notifications::mark_read))
        .layer(from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
