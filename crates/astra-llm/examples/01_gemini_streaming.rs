use anyhow::Result;
use futures::StreamExt;
use astra_llm::{
    ClientFactory, GeminiConfig, GenerateRequest, GenerationClient, GenerationOptions,
    StreamEvent, DEFAULT_GEMINI_MODEL,
};

#[tokio::main]
async fn main() -> Result<()> {
    let api_key = std::env::var("GEMINI_API_KEY")?;
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

    println!("Gemini Streaming Example");
    println!("========================\n");
    println!("Model: {}\n", model);

    let config = GeminiConfig::new(api_key).with_model(model.clone());
    let client = ClientFactory::create_client(&config)?;

    let request = GenerateRequest::new(
        model,
        "Write a short poem about static site generators in exactly 4 lines.",
    )
    .with_options(GenerationOptions::new().temperature(0.7));

    println!("Streaming response:\n");
    println!("---");

    let mut stream = client.generate_stream(request).await?;

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Text { content } => {
                print!("{}", content);
                std::io::Write::flush(&mut std::io::stdout())?;
            }
            StreamEvent::Done { finish_reason } => {
                println!("\n---\n");
                if let Some(reason) = finish_reason {
                    println!("Finish reason: {}", reason);
                }
            }
        }
    }

    println!("\nStream complete!");

    Ok(())
}
