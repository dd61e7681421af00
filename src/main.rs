//! MOEX - Multi-Objective Experience expert routing
//!
//! Serves the dispatch framework over HTTP, or runs a canned demo pass.
//!
//! # Usage
//!
//! ```bash
//! # Serve the HTTP API on the default address
//! cargo run --release
//!
//! # Serve on a custom address
//! cargo run --release -- --addr 127.0.0.1:9090
//!
//! # Run the demo prompts and exit
//! cargo run --release -- --demo
//! ```
//!
//! # Environment Variables
//!
//! - `MOEX_CONFIG`: Path to a TOML config file (default: ./moex.toml)
//! - `MOEX_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use moex::api::{create_app, ApiState};
use moex::config::MoexConfig;
use moex::framework::MoexFramework;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "moex")]
#[command(about = "MOEX - Multi-Objective Experience expert routing framework")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Run the built-in demo prompts against an in-process framework and exit
    #[arg(long)]
    demo: bool,
}

// ============================================================================
// Demo Mode
// ============================================================================

/// Prompt set exercised by `--demo`, one per expert plus a fallback case.
const DEMO_PROMPTS: [&str; 4] = [
    "Help me transcribe this code to DNA sequence: function calculate() { return 42; }",
    "I have an error in my JavaScript code that keeps crashing",
    "What terminal command should I use to list files?",
    "This is a generic question about programming",
];

/// Run the canned demo prompts and print each result plus the final status.
async fn run_demo(framework: &MoexFramework) -> Result<()> {
    for prompt in DEMO_PROMPTS {
        info!("📝 Testing: \"{}\"", prompt);
        match framework.process_request(prompt).await {
            Ok(result) => {
                info!(
                    expert = %result.expert,
                    confidence = result.confidence,
                    "✅ {}",
                    result.analysis
                );
            }
            Err(err) => error!("❌ Demo request failed: {}", err),
        }
    }

    info!("📊 Final system status:");
    let status = framework.get_system_status().await;
    println!(
        "{}",
        serde_json::to_string_pretty(&status).context("Failed to serialize system status")?
    );

    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = MoexConfig::load();
    let server_addr = args.addr.unwrap_or_else(|| config.server.bind_addr.clone());

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  MOEX - Multi-Objective Experience");
    info!("  Expert Routing Framework");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("");

    let framework = Arc::new(MoexFramework::new(config).await);
    framework.activate().await;

    if args.demo {
        run_demo(&framework).await?;
        framework.shutdown().await;
        return Ok(());
    }

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let app = create_app(ApiState::new(Arc::clone(&framework)));
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;

    info!("🌐 HTTP server listening on {}", server_addr);
    info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    framework.shutdown().await;
    info!("");
    info!("✓ MOEX shutdown complete");
    Ok(())
}
