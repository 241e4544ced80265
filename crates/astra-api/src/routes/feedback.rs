use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use astra_persist::Feedback;
use crate::{error::{ApiError, ApiResult}, state::AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(feedback: Feedback) -> Self {
        Self {
            id: feedback.id,
            email: feedback.email,
            message: feedback.message,
            created_at: feedback.created_at,
        }
    }
}

/// Leave feedback for the site owner
#[utoipa::path(
    post,
    path = "/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackResponse),
        (status = 400, description = "Missing email or message")
    ),
    tag = "feedback"
)]
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackRequest>,
) -> ApiResult<(StatusCode, Json<FeedbackResponse>)> {
    let email = req.email.trim();
    let message = req.message.trim();

    if email.is_empty() || message.is_empty() {
        return Err(ApiError::BadRequest("email and message are required".to_string()));
    }

    let feedback = state.persist.feedback().submit_feedback(email, message).await?;

    Ok((StatusCode::CREATED, Json(feedback.into())))
}
