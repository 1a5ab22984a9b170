use anyhow::{Context, Result};
use clap::Parser;
use std::net::IpAddr;
use std::sync::Arc;
use studentapi::{
    api, config, logging, students::StudentStore, summarization::OllamaSummaryClient,
};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "student-api",
    version,
    about = "In-memory student registry with generated summaries"
)]
struct Cli {
    /// Address to bind (overrides SERVER_HOST).
    #[arg(long)]
    host: Option<IpAddr>,
    /// Port to bind (overrides SERVER_PORT).
    #[arg(long)]
    port: Option<u16>,
    /// Base URL of the Ollama-compatible service (overrides OLLAMA_URL).
    #[arg(long)]
    ollama_url: Option<String>,
    /// Model used for summaries (overrides SUMMARY_MODEL).
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_tracing();
    let config = config::init_config(|config| {
        if let Some(host) = cli.host {
            config.server_host = host;
        }
        if let Some(port) = cli.port {
            config.server_port = port;
        }
        if let Some(url) = cli.ollama_url {
            config.ollama_url = url;
        }
        if let Some(model) = cli.model {
            config.summary_model = model;
        }
    })
    .context("failed to load configuration")?;

    let summarizer = OllamaSummaryClient::from_config(config)
        .context("failed to build summary client")?;
    let app = api::create_router(Arc::new(StudentStore::new()), Arc::new(summarizer));

    let listener = TcpListener::bind((config.server_host, config.server_port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.server_host, config.server_port
            )
        })?;
    tracing::info!(
        ollama_url = %config.ollama_url,
        model = %config.summary_model,
        "Listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
