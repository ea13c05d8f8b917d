//! Todo Pubsub terminal application
//!
//! Runs the todo page as a line-oriented REPL: the screen is drawn on
//! stdout, logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # In-memory, prompts before deleting
//! cargo run --bin todo-pubsub
//!
//! # Persist to ./data, no simulated latency
//! TODO_STORAGE_DIR=./data TODO_READ_LATENCY_MS=0 TODO_WRITE_LATENCY_MS=0 \
//!     cargo run --bin todo-pubsub
//! ```

use anyhow::Context;
use std::sync::Arc;
use todo_pubsub_app::{App, AppConfig, Command, CommandError, DEFAULT_LOG_FILTER, Flow, HELP};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::Mutex;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

async fn print(output: &Mutex<Stdout>, text: &str) -> std::io::Result<()> {
    let mut output = output.lock().await;
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();

    // Initialize tracing; stdout belongs to the screen
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        storage_dir = ?config.storage_dir,
        storage_key = %config.storage_key,
        confirm_delete = ?config.confirm_delete,
        "Configuration loaded"
    );

    let api = todo_pubsub_app::open_api(&config).context("failed to open todo storage")?;

    let input = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let output = Arc::new(Mutex::new(tokio::io::stdout()));
    let confirm = todo_pubsub_app::confirm_for(
        config.confirm_delete,
        Arc::clone(&input),
        Arc::clone(&output),
    );

    let app = App::bootstrap(api, confirm).await;
    print(&output, &app.render()).await?;
    print(&output, "Type `help` for commands.\n").await?;

    loop {
        print(&output, "todo> ").await?;

        // Released before the command runs; a delete prompt reads from it too
        let line = input.lock().await.next_line().await?;
        let Some(line) = line else {
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(error) => {
                print(&output, &format!("{error}\n")).await?;
                continue;
            }
        };

        match app.execute(command).await {
            Ok(Flow::Render) => print(&output, &app.render()).await?,
            Ok(Flow::Help) => print(&output, &format!("{HELP}\n")).await?,
            Ok(Flow::Quit) => break,
            Err(error) => print(&output, &format!("{error}\n")).await?,
        }
    }

    app.dispose();
    tracing::info!("Goodbye");
    Ok(())
}
