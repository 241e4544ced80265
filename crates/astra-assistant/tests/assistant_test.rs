use std::sync::{Arc, Mutex};

use astra_assistant::{
    Answerer, Assistant, RetrievalFormatter, RetrievalLimits, APOLOGY_REPLY, INVALID_QUERY_REPLY,
};
use astra_llm::{EventStream, GenerateRequest, GenerationClient, StreamEvent};
use astra_persist::{
    InMemoryStore, NewPost, PersistError, Post, PostRepository, PostUpdate,
};
use async_trait::async_trait;
use futures::{stream, StreamExt};

/// Replays a fixed script of events and remembers the prompts it was given
struct ScriptedClient {
    script: Vec<Result<StreamEvent, String>>,
    fail_open: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(script: Vec<Result<StreamEvent, String>>) -> Arc<Self> {
        Arc::new(Self {
            script,
            fail_open: false,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing_open() -> Arc<Self> {
        Arc::new(Self {
            script: Vec::new(),
            fail_open: true,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate_stream(&self, request: GenerateRequest) -> anyhow::Result<EventStream> {
        self.prompts.lock().unwrap().push(request.prompt);
        if self.fail_open {
            anyhow::bail!("Gemini API error (403): API key not valid");
        }
        let events: Vec<anyhow::Result<StreamEvent>> = self
            .script
            .iter()
            .cloned()
            .map(|e| e.map_err(|msg| anyhow::anyhow!(msg)))
            .collect();
        Ok(Box::pin(stream::iter(events)))
    }
}

struct UnreachableRepo;

#[async_trait]
impl PostRepository for UnreachableRepo {
    async fn list_posts(&self) -> astra_persist::Result<Vec<Post>> {
        Err(PersistError::Connection("connection refused".to_string()))
    }
    async fn list_recent(&self, _: Option<usize>) -> astra_persist::Result<Vec<Post>> {
        Err(PersistError::Connection("connection refused".to_string()))
    }
    async fn get_post(&self, _: &str) -> astra_persist::Result<Option<Post>> {
        Ok(None)
    }
    async fn create_post(&self, _: NewPost, _: &str) -> astra_persist::Result<Post> {
        Err(PersistError::Internal("read only".to_string()))
    }
    async fn update_post(&self, id: &str, _: PostUpdate) -> astra_persist::Result<Post> {
        Err(PersistError::PostNotFound(id.to_string()))
    }
    async fn delete_post(&self, id: &str) -> astra_persist::Result<()> {
        Err(PersistError::PostNotFound(id.to_string()))
    }
}

async fn store_with_posts() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .create_post(NewPost::new("Edge AI", "Models running on phones"), "Ali")
        .await
        .unwrap();
    store
        .create_post(
            NewPost::new("WebGPU", "Graphics in the browser").with_reference("https://gpuweb.dev"),
            "Ali",
        )
        .await
        .unwrap();
    store
}

async fn collect(assistant: &Assistant, query: &str) -> Vec<String> {
    assistant
        .answer(query.to_string())
        .map(|f| f.expect("assistant never yields errors"))
        .collect()
        .await
}

#[tokio::test]
async fn test_fragments_pass_through_in_order() {
    let client = ScriptedClient::new(vec![
        Ok(StreamEvent::text("Edge AI ")),
        Ok(StreamEvent::text("")),
        Ok(StreamEvent::text("is here.")),
        Ok(StreamEvent::Done {
            finish_reason: Some("STOP".to_string()),
        }),
        Ok(StreamEvent::text("after done")),
    ]);
    let assistant = Assistant::new(store_with_posts().await, client.clone(), "gemini-1.5-flash");

    let fragments = collect(&assistant, "What is edge AI?").await;

    assert_eq!(fragments, vec!["Edge AI ", "is here."]);
}

#[tokio::test]
async fn test_prompt_is_grounded_in_every_post() {
    let client = ScriptedClient::new(vec![Ok(StreamEvent::Done { finish_reason: None })]);
    let assistant = Assistant::new(store_with_posts().await, client.clone(), "gemini-1.5-flash");

    collect(&assistant, "Tell me about browsers").await;

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Title:Edge AI"));
    assert!(prompts[0].contains("Reference:https://gpuweb.dev"));
    assert!(prompts[0].contains("\"Tell me about browsers\""));
}

#[tokio::test]
async fn test_empty_repository_still_answers() {
    let client = ScriptedClient::new(vec![Ok(StreamEvent::text("No posts yet."))]);
    let assistant = Assistant::new(Arc::new(InMemoryStore::new()), client.clone(), "m");

    let fragments = collect(&assistant, "anything?").await;

    assert_eq!(fragments, vec!["No posts yet."]);
    assert!(client.prompts()[0].contains("No relevant posts found!"));
}

#[tokio::test]
async fn test_invalid_query_yields_guidance_only() {
    let client = ScriptedClient::new(vec![Ok(StreamEvent::text("should not be called"))]);
    let assistant = Assistant::new(store_with_posts().await, client.clone(), "m");

    assert_eq!(collect(&assistant, "").await, vec![INVALID_QUERY_REPLY]);
    assert_eq!(collect(&assistant, "   ").await, vec![INVALID_QUERY_REPLY]);
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn test_mid_stream_failure_becomes_apology() {
    let client = ScriptedClient::new(vec![
        Ok(StreamEvent::text("Hello, ")),
        Ok(StreamEvent::text("world")),
        Err("quota exceeded".to_string()),
        Ok(StreamEvent::text("never")),
    ]);
    let assistant = Assistant::new(store_with_posts().await, client, "m");

    let fragments = collect(&assistant, "hi").await;

    assert_eq!(fragments, vec!["Hello, ", "world", APOLOGY_REPLY]);
}

#[tokio::test]
async fn test_open_failure_becomes_apology() {
    let assistant = Assistant::new(store_with_posts().await, ScriptedClient::failing_open(), "m");

    assert_eq!(collect(&assistant, "hi").await, vec![APOLOGY_REPLY]);
}

#[tokio::test]
async fn test_retrieval_failure_aborts_before_generation() {
    let client = ScriptedClient::new(vec![Ok(StreamEvent::text("unused"))]);
    let assistant = Assistant::new(Arc::new(UnreachableRepo), client.clone(), "m");

    assert_eq!(collect(&assistant, "hi").await, vec![APOLOGY_REPLY]);
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn test_limits_bound_the_prompt() {
    let client = ScriptedClient::new(vec![Ok(StreamEvent::Done { finish_reason: None })]);
    let assistant = Assistant::new(store_with_posts().await, client.clone(), "m").with_formatter(
        RetrievalFormatter::new(RetrievalLimits {
            max_items: Some(1),
            max_chars: None,
        }),
    );

    collect(&assistant, "webgpu graphics").await;

    let prompt = &client.prompts()[0];
    assert!(prompt.contains("Title:WebGPU"));
    assert!(!prompt.contains("Title:Edge AI"));
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let client = ScriptedClient::new(vec![Ok(StreamEvent::text("x"))]);
    let assistant = Assistant::new(store_with_posts().await, client.clone(), "m");

    let stream = assistant.answer("hi".to_string());
    assert!(client.prompts().is_empty());
    drop(stream);
    assert!(client.prompts().is_empty());
}
