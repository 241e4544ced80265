use anyhow::Result;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::pin::Pin;

use crate::buffer_utils::CircularLineBuffer;
use crate::gemini::GenerateContentChunk;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A fragment of generated text, sized by the upstream service
    Text {
        content: String,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

impl StreamEvent {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done { .. })
    }
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Decode one SSE line into events.
///
/// Lines that are not `data:` lines (comments, `event:` fields, blank
/// separators) produce nothing.
pub fn parse_data_line(line: &str) -> Result<Vec<StreamEvent>> {
    let Some(data) = line
        .strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))
    else {
        return Ok(Vec::new());
    };

    let chunk: GenerateContentChunk = serde_json::from_str(data)
        .map_err(|e| anyhow::anyhow!("Failed to parse Gemini chunk: {}", e))?;

    if let Some(error) = &chunk.error {
        anyhow::bail!("Gemini API error: {}", error.message);
    }
    if let Some(reason) = chunk.block_reason() {
        anyhow::bail!("Prompt blocked by Gemini: {}", reason);
    }
    if let Some(reason) = chunk.finish_reason() {
        if !is_normal_finish(reason) {
            anyhow::bail!("Candidate stopped by Gemini: {}", reason);
        }
    }

    let mut events = Vec::new();
    if let Some(text) = chunk.text() {
        if !text.is_empty() {
            events.push(StreamEvent::Text { content: text });
        }
    }
    if let Some(reason) = chunk.finish_reason() {
        events.push(StreamEvent::Done {
            finish_reason: Some(reason.to_string()),
        });
    }

    Ok(events)
}

/// `SAFETY`, `RECITATION` and friends cut the answer short and count as failures
fn is_normal_finish(reason: &str) -> bool {
    matches!(reason, "STOP" | "MAX_TOKENS")
}

/// Turn the raw body of a `streamGenerateContent?alt=sse` response into
/// [`StreamEvent`]s.
///
/// Bytes are pulled from `body` only when the returned stream is polled, so
/// a slow consumer slows the upstream read. The stream ends after the first
/// `Done` or the first error.
pub fn parse_gemini_sse_stream<S, B, E>(body: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(body);
        let mut buffer = CircularLineBuffer::with_capacity(8192);

        while let Some(chunk_result) = byte_chunks.next().await {
            let bytes = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    return;
                }
            };
            buffer.extend(bytes.as_ref());

            while let Some(line_result) = buffer.next_line() {
                let events = match line_result.and_then(|line| parse_data_line(&line)) {
                    Ok(events) => events,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                for event in events {
                    let done = event.is_done();
                    yield Ok(event);
                    if done {
                        return;
                    }
                }
            }
        }

        if let Some(line_result) = buffer.take_remainder() {
            match line_result.and_then(|line| parse_data_line(&line)) {
                Ok(events) => {
                    for event in events {
                        let done = event.is_done();
                        yield Ok(event);
                        if done {
                            return;
                        }
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        yield Ok(StreamEvent::Done { finish_reason: None });
    })
}
