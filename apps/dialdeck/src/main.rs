//! # Dialdeck
//!
//! The main binary for Dialdeck.
//!
//! This application provides:
//! - HTTP control surface for a screen driving the deck
//! - CLI commands to preview imports and roll the deck in a terminal
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  apps/dialdeck (THE BINARY)               │
//! │                                                           │
//! │  ┌───────────┐   ┌───────────┐   ┌─────────────────────┐  │
//! │  │   CLI     │   │ HTTP API  │   │  Import Pipeline    │  │
//! │  │  (clap)   │   │  (axum)   │   │  (file → parser)    │  │
//! │  └─────┬─────┘   └─────┬─────┘   └──────────┬──────────┘  │
//! │        └───────────────┼────────────────────┘             │
//! │                        ▼                                  │
//! │              ┌───────────────────┐                        │
//! │              │ Selection Engine  │ (tokio timers)         │
//! │              └─────────┬─────────┘                        │
//! │                        ▼                                  │
//! │              ┌───────────────────┐                        │
//! │              │   dialdeck-core   │                        │
//! │              │    (THE LOGIC)    │                        │
//! │              └───────────────────┘                        │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP surface
//! dialdeck serve --host 127.0.0.1 --port 8080
//!
//! # Preview an import
//! dialdeck preview -f contacts.csv
//!
//! # Roll the deck once
//! dialdeck roll -f contacts.csv
//! ```

use clap::Parser;
use dialdeck::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // DIALDECK_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("DIALDECK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "dialdeck=debug,dialdeck_core=debug,tower_http=debug"
    } else {
        "dialdeck=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Dialdeck startup banner.
fn print_banner() {
    println!(
        r#"
  ┌──────────────────────────────┐
  │  D I A L D E C K   v{:<9}│
  │  shuffle · call · repeat     │
  └──────────────────────────────┘
"#,
        env!("CARGO_PKG_VERSION")
    );
}
