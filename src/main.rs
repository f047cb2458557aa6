//! med-assist: medical question answering over a quantized Llama 3 checkpoint.
//!
//! Startup loads the model and tokenizer once (startup-fatal on failure),
//! then serves the predict operation over HTTP for the life of the process.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

use med_assist::config::{Cli, Config};
use med_assist::inference::backend::QuantizedLlama;
use med_assist::inference::responder::Responder;
use med_assist::model::loader;
use med_assist::server::api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "med_assist=debug,tower_http=debug"
    } else {
        "med_assist=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("med-assist v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::load(&cli.config)?;
    let config = Arc::new(config);

    info!(
        weights = %config.model.weights_repo,
        weights_file = %config.model.weights_file,
        tokenizer = %config.model.tokenizer_repo,
        max_new_tokens = config.generation.max_new_tokens,
        "Configuration loaded"
    );

    // One-shot model load: fetch assets, open the device, read the weights.
    let device = loader::select_device(cli.cpu)?;
    let (model, tokenizer) = loader::init(&config.model, &device)?;

    let backend = QuantizedLlama::new(model, tokenizer, device);
    let responder = Responder::new(Box::new(backend), config.generation.clone());

    // Build application state.
    let state = Arc::new(AppState {
        responder: Mutex::new(responder),
        config: config.clone(),
        start_time: Instant::now(),
    });

    // Build the HTTP router.
    let app = build_router(state);

    // Start the server.
    let listen_addr = cli.listen.unwrap_or_else(|| config.server.listen.clone());
    info!(addr = %listen_addr, "Starting server");

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
