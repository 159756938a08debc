//! Unit tests for API request/response types.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use dialdeck::api::{ActionResponse, EditRequest, MutationResponse};
use dialdeck_core::{Avatar, DialdeckError};

// =============================================================================
// EDIT REQUEST TESTS
// =============================================================================

#[test]
fn test_edit_request_to_patch_keeps_fields() {
    let request: EditRequest =
        serde_json::from_str(r#"{"name":"Jo","dob":"1990-02-01"}"#).unwrap();
    let patch = request.to_patch().unwrap();

    assert_eq!(patch.name.as_deref(), Some("Jo"));
    assert_eq!(patch.dob.as_deref(), Some("1990-02-01"));
    assert!(patch.phone.is_none());
    assert!(patch.avatar.is_none());
}

#[test]
fn test_edit_request_overlong_field_is_invalid_field() {
    let request = EditRequest {
        phone: Some("9".repeat(1025)),
        ..EditRequest::default()
    };
    match request.to_patch() {
        Err(DialdeckError::InvalidField(msg)) => assert!(msg.contains("phone")),
        other => panic!("expected InvalidField, got {:?}", other),
    }
}

#[test]
fn test_edit_request_overlong_avatar_is_invalid_field() {
    let request = EditRequest {
        avatar: Some(Avatar::ImageRef(format!("file:///{}", "a".repeat(1024)))),
        ..EditRequest::default()
    };
    assert!(matches!(
        request.to_patch(),
        Err(DialdeckError::InvalidField(_))
    ));
}

#[test]
fn test_edit_request_bad_date_is_invalid_date() {
    let request = EditRequest {
        dob: Some("13/45/2000".to_string()),
        ..EditRequest::default()
    };
    assert!(matches!(
        request.to_patch(),
        Err(DialdeckError::InvalidDate(_))
    ));
}

// =============================================================================
// RESPONSE TESTS
// =============================================================================

#[test]
fn test_mutation_response_serialization() {
    let json = serde_json::to_string(&MutationResponse::applied(false)).unwrap();
    assert!(json.contains("\"success\":true"));
    assert!(json.contains("\"found\":false"));
}

#[test]
fn test_action_response_roundtrip_fields() {
    let response: ActionResponse =
        serde_json::from_str(r#"{"accepted":false,"shuffling":false}"#).unwrap();
    assert!(!response.accepted);
}
