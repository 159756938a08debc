//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        ActionResponse, AvatarRequest, ContactsResponse, CurrentResponse, EditRequest,
        HealthResponse, HistoryEntry, HistoryResponse, ImportResponse, MutationResponse,
    },
};
use crate::engine::ActionOutcome;
use crate::import::import_into;
use crate::platform::{PresetImage, PresetPicker};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use dialdeck_core::ContactId;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CONTACT HANDLERS
// =============================================================================

/// List all contacts in insertion order.
pub async fn contacts_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.engine.store().read().await;
    let response = ContactsResponse {
        count: store.len(),
        contacts: store.contacts().to_vec(),
    };
    (StatusCode::OK, Json(response))
}

/// Apply a partial edit to one contact.
pub async fn edit_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<EditRequest>,
) -> impl IntoResponse {
    let patch = match request.to_patch() {
        Ok(p) => p,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(MutationResponse::error(format!("Invalid edit: {}", e))),
            );
        }
    };

    let id = ContactId(id);
    let found = state.engine.edit_contact(id, &patch).await;
    tracing::debug!(contact = id.0, found, "Contact edited");

    (StatusCode::OK, Json(MutationResponse::applied(found)))
}

/// Delete one contact by id.
pub async fn delete_contact_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let found = state.engine.remove_contact(ContactId(id)).await;

    (StatusCode::OK, Json(MutationResponse::applied(found)))
}

/// Set a contact photo from an image-picker result.
pub async fn avatar_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<AvatarRequest>,
) -> impl IntoResponse {
    let picker = PresetImage(request.uri);
    let changed = state.engine.choose_avatar(&picker, ContactId(id)).await;

    (StatusCode::OK, Json(MutationResponse::applied(changed)))
}

// =============================================================================
// HISTORY HANDLER
// =============================================================================

/// Recent calls, most recent first.
pub async fn history_handler(State(state): State<AppState>) -> impl IntoResponse {
    let now = Utc::now();
    let store = state.engine.store().read().await;
    let calls: Vec<HistoryEntry> = store
        .history()
        .iter()
        .cloned()
        .map(|item| HistoryEntry::new(item, now))
        .collect();

    (
        StatusCode::OK,
        Json(HistoryResponse {
            count: calls.len(),
            calls,
        }),
    )
}

// =============================================================================
// CARD & ACTION HANDLERS
// =============================================================================

/// What the card shows now.
pub async fn current_handler(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.engine.view().await;
    let response = CurrentResponse::new(
        view.pick.map(|p| p.contact),
        view.color,
        view.phase,
        Utc::now(),
    );
    (StatusCode::OK, Json(response))
}

fn action_response(outcome: &ActionOutcome) -> (StatusCode, Json<ActionResponse>) {
    let response = ActionResponse {
        accepted: outcome.accepted(),
        shuffling: matches!(outcome, ActionOutcome::Shuffling(_)),
    };
    let status = if response.accepted {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    (status, Json(response))
}

/// Call the contact on the card.
pub async fn call_handler(State(state): State<AppState>) -> impl IntoResponse {
    action_response(&state.engine.call().await)
}

/// Delete the contact on the card.
pub async fn delete_action_handler(State(state): State<AppState>) -> impl IntoResponse {
    action_response(&state.engine.delete().await)
}

/// Shuffle to another contact.
pub async fn next_handler(State(state): State<AppState>) -> impl IntoResponse {
    action_response(&state.engine.next().await)
}

// =============================================================================
// IMPORT HANDLER
// =============================================================================

/// Import CSV text sent as the request body.
///
/// An empty body counts as a cancelled selection.
pub async fn import_handler(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let picker = if body.trim().is_empty() {
        PresetPicker::cancelled()
    } else {
        PresetPicker::inline(body)
    };

    match import_into(&state.engine, &picker).await {
        Ok(Some(report)) => {
            let total = state.engine.store().read().await.len();
            (
                StatusCode::OK,
                Json(ImportResponse::merged(&report, total)),
            )
        }
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            Json(ImportResponse::error("No CSV content provided")),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ImportResponse::error(format!("Import failed: {}", e))),
        ),
    }
}
