use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use tracing_subscriber::EnvFilter;

use astra_chat::{ChatSession, Exchange};

/// Chat with the Astra Blog assistant from a terminal
#[derive(Debug, Parser)]
#[command(name = "astra-chat", version)]
struct Args {
    /// Base URL of the Astra Blog API
    #[arg(long, env = "ASTRA_CHAT_URL", default_value = "http://localhost:8000")]
    url: String,

    /// Ask a single question and exit
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut session = ChatSession::new(&args.url)?;

    if let Some(query) = args.query {
        let exchange = ask(&mut session, &query).await?;
        if exchange == Exchange::Failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!("Astra Blog assistant ({}). Ctrl-D to quit.\n", args.url);

    let mut editor = DefaultEditor::new().context("Failed to create line editor")?;

    loop {
        match editor.readline("you> ") {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(query);
                ask(&mut session, query).await?;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }

    Ok(())
}

/// The prompt is not shown again until the answer has finished
async fn ask(session: &mut ChatSession, query: &str) -> Result<Exchange> {
    print!("astra> ");
    std::io::stdout().flush()?;

    let exchange = session
        .ask(query, |fragment| {
            print!("{}", fragment);
            let _ = std::io::stdout().flush();
        })
        .await;

    if exchange == Exchange::Failed {
        if let Some(message) = session.transcript().last() {
            print!("\n{}", message.text);
        }
    }
    println!("\n");

    Ok(exchange)
}
