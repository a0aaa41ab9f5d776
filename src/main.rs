use clap::Parser;
use tracing_subscriber::EnvFilter;

use vocabking_api::cli::Args;
use vocabking_api::config::AppConfig;
use vocabking_api::storage::{Postgres, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so flags can fall back to JWT_SIGNING_KEY, ALLOWED_ORIGINS, etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.debug);

    let config = AppConfig::from_args(&args)?;
    tracing::info!(
        "Starting VocabKing API {} in {:?} mode",
        config.api.version,
        config.environment
    );

    let mut storage = match &config.server.database_url {
        Some(url) => {
            let mut postgres = Postgres::new(url.clone());
            postgres.open().await?;
            Some(postgres)
        }
        None => None,
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let app = vocabking_api::app(config)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(storage) = storage.as_mut() {
        storage.close().await?;
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
