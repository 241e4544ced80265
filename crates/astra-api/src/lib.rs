pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::{
        predicate::{DefaultPredicate, NotForContentType, Predicate},
        CompressionLayer,
    },
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    handlers::ask,
    middleware::{auth::require_admin, logging},
    openapi::ApiDoc,
    routes::{auth, feedback, health, posts},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    // Gated by the admin cookie
    let admin_routes = Router::new()
        .route("/admin/posts", post(posts::create_post))
        .route("/admin/posts/:id", put(posts::update_post).delete(posts::delete_post))
        .route_layer(from_fn(require_admin));

    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Assistant
        .route("/ask", post(ask::ask))
        // Posts
        .route("/posts", get(posts::list_posts))
        .route("/posts/:id", get(posts::get_post))
        // Feedback
        .route("/feedback", post(feedback::submit_feedback))
        // Admin session
        .route("/admin/login", post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .merge(admin_routes);

    // Chunked text bodies must reach the client as produced
    let compression = CompressionLayer::new()
        .compress_when(DefaultPredicate::new().and(NotForContentType::new("text/plain")));

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(from_fn(logging::log_request))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.server.request_timeout_secs,
        )))
        .layer(compression)
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            let origins: Vec<HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect();
            cors = cors.allow_origin(origins);
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}
