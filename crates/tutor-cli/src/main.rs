//! Excel Tutor CLI
//!
//! Main entry point for serving the tutor web client and chat API.

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tutor_server::{create_router, AppState, Config};

/// Excel Tutor - Guided Excel Lessons
///
/// Serves a single-learner tutoring web app: a built-in lesson syllabus,
/// a chat endpoint proxied to an LLM completion API, and the static web
/// client.
#[derive(Parser, Debug)]
#[command(name = "excel-tutor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Port for the HTTP server (overrides the PORT environment variable)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory of static web client assets
    #[arg(short, long, value_name = "DIR")]
    static_dir: Option<String>,

    /// Model name for the completion API
    #[arg(short, long)]
    model: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Load .env before reading configuration from the environment
    let _ = dotenvy::dotenv();

    // Initialize tracing subscriber with appropriate filter
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Excel Tutor starting");

    match run_server(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads configuration, builds the router, and serves until interrupted.
async fn run_server(args: Args) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;

    // Apply CLI argument overrides
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    // Re-validate after overrides
    config.validate()?;

    print_config(&config);

    if config.api_key.is_none() {
        tracing::warn!(
            "OPENAI_API_KEY is not set; chat requests will fail until it is configured"
        );
    }

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let state = AppState::new(config);
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port")
    })?;

    println!("Excel Tutor running on http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Excel Tutor stopped");
    Ok(())
}

/// Resolves when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    } else {
        tracing::info!("Received Ctrl+C, shutting down");
    }
}

/// Prints the effective configuration.
fn print_config(config: &Config) {
    println!("Configuration loaded:");
    println!("  Model: {}", config.model);
    println!("  Upstream base URL: {}", config.base_url);
    println!("  Port: {}", config.port);
    println!("  Static assets: {}", config.static_dir);
    println!(
        "  API key: {}",
        if config.api_key.is_some() {
            "configured"
        } else {
            "MISSING"
        }
    );
}
