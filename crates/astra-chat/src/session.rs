use anyhow::{Context, Result};
use futures::StreamExt;
use serde_json::json;

use crate::decoder::Utf8StreamDecoder;
use crate::transcript::Transcript;

/// How one question ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Completed,
    Failed,
}

/// A chat against one `/ask` endpoint.
///
/// `ask` takes `&mut self`, so a session can have only one question in
/// flight at a time.
pub struct ChatSession {
    http_client: reqwest::Client,
    ask_url: String,
    transcript: Transcript,
}

impl ChatSession {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.into();
        Ok(Self {
            http_client,
            ask_url: format!("{}/ask", base_url.trim_end_matches('/')),
            transcript: Transcript::new(),
        })
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Ask one question and stream the answer into the transcript.
    ///
    /// `on_fragment` sees each decoded piece of text as it arrives. Any
    /// failure (connection, non-2xx status, broken body) is logged and
    /// recorded as a single failure message.
    pub async fn ask<F>(&mut self, query: &str, mut on_fragment: F) -> Exchange
    where
        F: FnMut(&str),
    {
        self.transcript.push_user(query);

        match self.stream_answer(query, &mut on_fragment).await {
            Ok(()) => Exchange::Completed,
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                self.transcript.push_failure();
                Exchange::Failed
            }
        }
    }

    async fn stream_answer(&mut self, query: &str, on_fragment: &mut impl FnMut(&str)) -> Result<()> {
        let response = self
            .http_client
            .post(&self.ask_url)
            .json(&json!({ "query": query }))
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch response ({})", response.status());
        }

        self.transcript.begin_reply();

        let mut body = response.bytes_stream();
        let mut decoder = Utf8StreamDecoder::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.context("Response body interrupted")?;
            let text = decoder.decode(&chunk);
            if !text.is_empty() {
                self.transcript.append_fragment(&text);
                on_fragment(&text);
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            self.transcript.append_fragment(&tail);
            on_fragment(&tail);
        }

        Ok(())
    }
}
