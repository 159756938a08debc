//! # Dialdeck HTTP API Module
//!
//! Local HTTP control surface for a screen or script driving the deck.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /contacts` - All contacts, insertion order
//! - `PATCH /contacts/{id}` - Edit a contact
//! - `DELETE /contacts/{id}` - Delete a contact
//! - `PUT /contacts/{id}/avatar` - Set a contact photo
//! - `GET /history` - Recent calls
//! - `GET /current` - The card: contact, colour, phase
//! - `POST /actions/call` / `/actions/delete` / `/actions/next` - Terminal actions
//! - `POST /import` - Import CSV text
//!
//! ## Configuration (Environment Variables)
//!
//! - `DIALDECK_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `dialdeck::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    avatar_handler, call_handler, contacts_handler, current_handler, delete_action_handler,
    delete_contact_handler, edit_handler, health_handler, history_handler, import_handler,
    next_handler,
};
#[allow(unused_imports)]
pub use types::{
    ActionResponse, AvatarRequest, ContactsResponse, CurrentResponse, EditRequest,
    HealthResponse, HistoryEntry, HistoryResponse, ImportResponse, MutationResponse,
};

use crate::engine::SelectionEngine;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, patch, post, put},
};
use dialdeck_core::DialdeckError;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the engine, which holds the store.
#[derive(Clone)]
pub struct AppState {
    pub engine: SelectionEngine,
}

impl AppState {
    #[must_use]
    pub fn new(engine: SelectionEngine) -> Self {
        Self { engine }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `DIALDECK_CORS_ORIGINS`.
///
/// - "*": any origin
/// - unset or no valid entry: localhost only
/// - otherwise: the listed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("DIALDECK_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (DIALDECK_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in DIALDECK_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                with_methods(CorsLayer::new().allow_origin(allowed_origins))
            }
        }
        None => build_localhost_cors(),
    }
}

fn with_methods(layer: CorsLayer) -> CorsLayer {
    layer
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    with_methods(CorsLayer::new().allow_origin(origins))
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
        .layer(axum::extract::DefaultBodyLimit::max(
            crate::import::MAX_IMPORT_BYTES,
        ));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/contacts", get(handlers::contacts_handler))
        .route(
            "/contacts/{id}",
            patch(handlers::edit_handler).delete(handlers::delete_contact_handler),
        )
        .route("/contacts/{id}/avatar", put(handlers::avatar_handler))
        .route("/history", get(handlers::history_handler))
        .route("/current", get(handlers::current_handler))
        .route("/actions/call", post(handlers::call_handler))
        .route("/actions/delete", post(handlers::delete_action_handler))
        .route("/actions/next", post(handlers::next_handler))
        .route("/import", post(handlers::import_handler))
        .layer(middleware)
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, engine: SelectionEngine) -> Result<(), DialdeckError> {
    let router = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DialdeckError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Dialdeck HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DialdeckError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
