use std::{io::Write, sync::Arc};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelwatch::{
    cli::{render, Command, Shell},
    db::{open_storage, WatchlistStore},
    services::{CatalogProvider, DetailEnricher, OmdbProvider, QueryController},
    AppError, Config,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so they stay out of the way of the prompt
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let provider: Arc<dyn CatalogProvider> = Arc::new(
        OmdbProvider::new(
            config.omdb_api_key.clone(),
            config.omdb_api_url.clone(),
            config.http_timeout(),
        )
        .context("Failed to create catalog client")?,
    );
    info!(provider = provider.name(), url = %config.omdb_api_url, "Catalog client ready");

    let storage = open_storage(&config)
        .await
        .context("Failed to open watchlist storage")?;
    let watchlist = WatchlistStore::open(storage).await;

    let enricher = Arc::new(DetailEnricher::new(Arc::clone(&provider)));
    let (controller, mut events) =
        QueryController::new(provider, Some(enricher), config.debounce());

    let mut shell = Shell::new(controller, watchlist, std::io::stdout());
    render::render_help(&mut std::io::stdout())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };

                match shell.handle(command).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e @ AppError::InvalidInput(_)) => println!("{e}"),
                    Err(e) => {
                        error!(error = %e, "Command failed");
                        println!("Something went wrong: {e}");
                    }
                }
            }
            Some(event) = events.recv() => {
                if let Err(e) = shell.on_event(event).await {
                    error!(error = %e, "Failed to handle search event");
                }
            }
        }
    }

    info!("Goodbye");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}
