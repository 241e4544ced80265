use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE, TRANSFER_ENCODING},
    response::{IntoResponse, Response},
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::time::Instant;
use utoipa::ToSchema;

use astra_assistant::FragmentStream;
use crate::{error::{ApiError, ApiResult}, state::AppState};

pub const TIMEOUT_MESSAGE: &str = "Error: response timed out";

#[derive(Debug, Deserialize, ToSchema)]
pub struct AskRequest {
    /// The visitor's question
    pub query: String,
}

/// Pull the query out of a raw `/ask` body.
///
/// Bytes that are not JSON at all are a server-side failure; JSON without a
/// non-empty string `query` is a client error.
pub fn parse_query(body: &[u8]) -> ApiResult<String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    match value.get("query") {
        Some(Value::String(query)) if !query.is_empty() => Ok(query.clone()),
        _ => Err(ApiError::InvalidQuery),
    }
}

/// Forward fragments as body chunks, one per poll.
///
/// The next fragment is only requested once hyper asks for the next chunk,
/// so a slow reader slows the upstream read. A source error or an elapsed
/// deadline becomes one trailing `Error: ...` chunk.
pub fn relay(
    fragments: FragmentStream,
    deadline: Option<Instant>,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    async_stream::stream! {
        let mut fragments = fragments;
        let mut chunks = 0usize;

        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, fragments.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::warn!(chunks, "Answer stream timed out");
                        yield Ok(Bytes::from_static(TIMEOUT_MESSAGE.as_bytes()));
                        break;
                    }
                },
                None => fragments.next().await,
            };

            match next {
                Some(Ok(fragment)) => {
                    if fragment.is_empty() {
                        continue;
                    }
                    chunks += 1;
                    yield Ok(Bytes::from(fragment));
                }
                Some(Err(e)) => {
                    tracing::warn!(chunks, error = %e, "Answer stream failed after headers were sent");
                    yield Ok(Bytes::from(format!("Error: {}", e)));
                    break;
                }
                None => {
                    tracing::debug!(chunks, "Answer stream complete");
                    break;
                }
            }
        }
    }
}

/// Ask the blog assistant a question
///
/// The answer is streamed as plain text chunks in the order they are produced.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Streaming answer", content_type = "text/plain"),
        (status = 400, description = "Missing or empty query"),
        (status = 500, description = "Body is not JSON")
    ),
    tag = "assistant"
)]
pub async fn ask(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Response> {
    let query = parse_query(&body)?;

    tracing::info!(query_len = query.len(), "Answering query");

    let deadline = state.config.ask.timeout().map(|timeout| Instant::now() + timeout);
    let fragments = state.assistant.answer(query);

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (TRANSFER_ENCODING, "chunked"),
            (CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(relay(fragments, deadline)),
    )
        .into_response())
}
