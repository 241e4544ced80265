use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use astra_api::{build_router, config::Config, state::AppState};
use astra_assistant::{Assistant, PromptComposer, RetrievalFormatter};
use astra_llm::{ClientFactory, GeminiConfig, GenerationOptions};
use astra_persist::PersistClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration (fails when a required secret is missing)
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Astra Blog API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Initialize generation client
    tracing::info!(model = %config.llm.model, "Initializing Gemini client");
    let mut gemini = GeminiConfig::new(config.gemini_api_key.clone()).with_model(config.llm.model.clone());
    if let Some(base_url) = &config.llm.base_url {
        gemini = gemini.with_base_url(base_url.clone());
    }
    let client = ClientFactory::create_client(&gemini)?;

    // Initialize persistence client
    tracing::info!(backend = ?config.storage.backend, "Opening post storage");
    let persist = PersistClient::builder()
        .backend(config.storage.backend)
        .mongodb_uri(config.mongodb_uri.clone())
        .database(config.storage.database.clone())
        .build()
        .await?;

    let mut options = GenerationOptions::new();
    if let Some(temperature) = config.llm.temperature {
        options = options.temperature(temperature);
    }
    if let Some(tokens) = config.llm.max_output_tokens {
        options = options.max_output_tokens(tokens);
    }

    let assistant = Assistant::new(persist.posts(), client, config.llm.model.clone())
        .with_formatter(RetrievalFormatter::new(config.retrieval))
        .with_composer(PromptComposer::new(config.site.persona.clone()))
        .with_options(options);

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), persist, Arc::new(assistant)));

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        }
        _ => {
            registry.with(tracing_subscriber::fmt::layer().pretty()).init();
        }
    }
}
