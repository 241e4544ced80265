use std::pin::Pin;
use std::sync::Arc;

use astra_llm::{EventStream, GenerateRequest, GenerationClient, GenerationOptions, StreamEvent};
use astra_persist::PostRepository;
use futures::{Stream, StreamExt};

use crate::error::Result;
use crate::prompt::PromptComposer;
use crate::query::Query;
use crate::retrieval::RetrievalFormatter;

pub const INVALID_QUERY_REPLY: &str = "Please provide a valid query.";
pub const APOLOGY_REPLY: &str =
    "Sorry, an error occurred while processing your request. Please try again later.";

/// Lazily produced answer text. Items are pulled one at a time; nothing runs
/// until the first poll.
pub type FragmentStream = Pin<Box<dyn Stream<Item = anyhow::Result<String>> + Send>>;

/// Anything that can answer a chat question as a stream of text fragments
pub trait Answerer: Send + Sync {
    fn answer(&self, query: String) -> FragmentStream;
}

/// Retrieval-grounded answerer backed by a generation service.
///
/// Failures never escape as errors: an invalid query produces a single
/// guidance fragment, and any failure while retrieving or generating is
/// logged and replaced by a single apology fragment.
#[derive(Clone)]
pub struct Assistant {
    posts: Arc<dyn PostRepository>,
    client: Arc<dyn GenerationClient>,
    formatter: RetrievalFormatter,
    composer: PromptComposer,
    model: String,
    options: GenerationOptions,
}

impl Assistant {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        client: Arc<dyn GenerationClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            posts,
            client,
            formatter: RetrievalFormatter::default(),
            composer: PromptComposer::default(),
            model: model.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_formatter(mut self, formatter: RetrievalFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Retrieve, compose and open the upstream stream
    async fn open(&self, query: &Query) -> Result<EventStream> {
        let corpus = self.formatter.retrieve(self.posts.as_ref(), query).await?;

        tracing::info!(
            posts = corpus.blocks().len(),
            query_len = query.as_str().len(),
            "Composing grounded prompt"
        );

        let prompt = self.composer.compose(query, &corpus);
        let request = GenerateRequest::new(self.model.clone(), prompt)
            .with_options(self.options.clone());

        Ok(self.client.generate_stream(request).await?)
    }
}

impl Answerer for Assistant {
    fn answer(&self, query: String) -> FragmentStream {
        let this = self.clone();

        Box::pin(async_stream::stream! {
            let Some(query) = Query::parse(&query) else {
                yield Ok(INVALID_QUERY_REPLY.to_string());
                return;
            };

            let mut events = match this.open(&query).await {
                Ok(events) => events,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start answer stream");
                    yield Ok(APOLOGY_REPLY.to_string());
                    return;
                }
            };

            while let Some(event) = events.next().await {
                match event {
                    Ok(StreamEvent::Text { content }) => {
                        if !content.is_empty() {
                            yield Ok(content);
                        }
                    }
                    Ok(StreamEvent::Done { finish_reason }) => {
                        tracing::debug!(?finish_reason, "Answer stream finished");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Error in answer stream");
                        yield Ok(APOLOGY_REPLY.to_string());
                        return;
                    }
                }
            }
        })
    }
}
