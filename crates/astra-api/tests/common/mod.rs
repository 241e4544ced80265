#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use astra_api::{build_router, config::Config, state::AppState};
use astra_assistant::{Answerer, FragmentStream};
use astra_persist::PersistClient;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@astra.test";
pub const ADMIN_PASSWORD: &str = "hunter2";
pub const ADMIN_COOKIE: &str = "admin_token=authenticated";

const TEST_CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [cors]
    enabled = false
    origins = []

    [llm]
    model = "gemini-1.5-flash"

    [site]
    author = "Test Author"

    [logging]
    level = "debug"
    format = "pretty"
"#;

pub fn test_config() -> Config {
    let mut config: Config = toml::from_str(TEST_CONFIG).unwrap();
    config.gemini_api_key = "test-key".to_string();
    config.admin_email = ADMIN_EMAIL.to_string();
    config.admin_password = ADMIN_PASSWORD.to_string();
    config
}

/// Replays fixed fragments, optionally pausing before each one
pub struct ScriptedAnswerer {
    pub fragments: Vec<Result<String, String>>,
    pub delay: Option<Duration>,
    /// Never finish after the scripted fragments
    pub hang: bool,
}

impl ScriptedAnswerer {
    pub fn new(fragments: Vec<Result<&str, &str>>) -> Self {
        Self {
            fragments: fragments
                .into_iter()
                .map(|f| f.map(str::to_string).map_err(str::to_string))
                .collect(),
            delay: None,
            hang: false,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }
}

impl Answerer for ScriptedAnswerer {
    fn answer(&self, _query: String) -> FragmentStream {
        let fragments = self.fragments.clone();
        let delay = self.delay;
        let hang = self.hang;

        Box::pin(async_stream::stream! {
            for fragment in fragments {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield fragment.map_err(|msg| anyhow::anyhow!(msg));
            }
            if hang {
                futures::future::pending::<()>().await;
            }
        })
    }
}

/// Streams the query back one character at a time, with a pause between characters
pub struct EchoAnswerer;

impl Answerer for EchoAnswerer {
    fn answer(&self, query: String) -> FragmentStream {
        Box::pin(async_stream::stream! {
            for c in query.chars() {
                tokio::time::sleep(Duration::from_millis(5)).await;
                yield Ok(c.to_string());
            }
        })
    }
}

/// Sets its flag when dropped
pub struct DropFlag(pub Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Yields "tick" forever; `dropped` flips once the stream is released
#[derive(Default)]
pub struct EndlessAnswerer {
    pub dropped: Arc<AtomicBool>,
}

impl Answerer for EndlessAnswerer {
    fn answer(&self, _query: String) -> FragmentStream {
        let guard = DropFlag(self.dropped.clone());

        Box::pin(async_stream::stream! {
            let _guard = guard;
            loop {
                tokio::time::sleep(Duration::from_millis(5)).await;
                yield Ok("tick".to_string());
            }
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub persist: PersistClient,
}

pub fn app_with(config: Config, answerer: impl Answerer + 'static) -> TestApp {
    let persist = PersistClient::in_memory();
    let state = Arc::new(AppState::new(config, persist.clone(), Arc::new(answerer)));

    TestApp {
        router: build_router(state),
        persist,
    }
}

pub fn app(answerer: impl Answerer + 'static) -> TestApp {
    app_with(test_config(), answerer)
}

pub fn idle_app() -> TestApp {
    app(ScriptedAnswerer::new(vec![]))
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("cookie", ADMIN_COOKIE)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn ask_request(body: &str) -> Request<Body> {
    json_request("POST", "/ask", body)
}
