//! Book Library - terminal front end for the catalog API

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use book_library::{
    config::{AppConfig, LoggingConfig},
    views::{shell::HELP, Shell},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let _log_guard = init_tracing(&config.logging);

    tracing::info!(
        "Starting Book Library v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.api.base_url
    );

    let state = AppState::new(config)?;
    let start_path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());

    let mut stdout = tokio::io::stdout();
    let mut shell = Shell::start((*state.services).clone(), &start_path).await?;
    stdout.write_all(shell.render().as_bytes()).await?;
    stdout.write_all(HELP.as_bytes()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match shell.handle(&line).await {
            Ok(reply) => {
                stdout.write_all(reply.text.as_bytes()).await?;
                if reply.quit {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Command failed: {}", e);
                stdout.write_all(format!("Error: {}\n", e).as_bytes()).await?;
            }
        }
    }

    tracing::info!("Book Library stopped");
    Ok(())
}

/// Logs go to rolling files when a directory is configured so they do not
/// interleave with the pages printed on stdout.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("book_library={}", logging.level).into());

    let (writer, guard) = match &logging.directory {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "book-library.log"));
            (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr),
            None,
        ),
    };

    let fmt_layer = if logging.format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    guard
}
