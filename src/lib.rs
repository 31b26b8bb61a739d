pub mod config;
pub mod modules;
pub mod services;

use axum::http::StatusCode;
use axum::response::Html;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::{Config, DbPool};
use modules::comments::comment_routes;
use modules::events::event_routes;
use modules::moderation::moderation_routes;
use modules::users::user_routes;
use services::html;
use services::jwt::JwtService;
use services::mailer::Mailer;
use services::push::PushNotifier;
use services::rate_limit::{create_rate_limiter, RateLimitLayer};
use services::security::security_headers;

pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub jwt_service: JwtService,
    pub mailer: Mailer,
    pub push: PushNotifier,
}

pub async fn create_app(db: DbPool, config: Config) -> Router {
    let jwt_service = JwtService::new(config.jwt_secret.clone());
    let mailer = Mailer::new(&config);
    let push = PushNotifier::new(config.fcm_server_key.clone());

    let state = Arc::new(AppState {
        db,
        config,
        jwt_service,
        mailer,
        push,
    });

    // Rate limit: burst of 50, then 20 per second
    let rate_limiter = create_rate_limiter(20, 50);

    let api = Router::new()
        .merge(user_routes())
        .merge(event_routes())
        .merge(comment_routes())
        .merge(moderation_routes());

    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/success", get(reset_password_success_page))
        .route("/error", get(reset_password_error_page))
        .nest("/api", api)
        .layer(middleware::from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1MB max body, events carry base64 images
        .layer(RateLimitLayer::new(rate_limiter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthcheck() -> StatusCode {
    StatusCode::OK
}

async fn reset_password_success_page() -> Html<String> {
    Html(html::reset_password_success())
}

async fn reset_password_error_page() -> Html<String> {
    Html(html::reset_password_error())
}
