use utoipa::OpenApi;

use crate::{
    handlers::ask,
    routes::{auth, feedback, health, posts},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        ask::ask,
        posts::list_posts,
        posts::get_post,
        posts::create_post,
        posts::update_post,
        posts::delete_post,
        auth::login,
        auth::logout,
        feedback::submit_feedback,
    ),
    components(schemas(
        health::HealthResponse,
        ask::AskRequest,
        posts::PostResponse,
        posts::PostPayload,
        auth::LoginRequest,
        auth::SessionResponse,
        feedback::FeedbackRequest,
        feedback::FeedbackResponse,
    )),
    tags(
        (name = "assistant", description = "Streaming blog assistant"),
        (name = "posts", description = "Published posts"),
        (name = "admin", description = "Session and post management"),
        (name = "feedback", description = "Visitor feedback"),
        (name = "health", description = "Service health")
    ),
    info(title = "Astra Blog API")
)]
pub struct ApiDoc;
