//! Unit tests for the JSON bridge: every action dispatched by `handle_message`.
//!
//! These go through the same decode → coordinator → encode path a host
//! integration uses, against a live coordinator task.

use std::sync::Arc;

use serde_json::json;

use clicktrail::managers::recording_coordinator::{CoordinatorHandle, RecordingCoordinator};
use clicktrail::rpc_handler::{handle_message, parse_notification};
use clicktrail::services::message_bus::NotificationChannel;
use clicktrail::services::screenshot_source::SyntheticSource;
use clicktrail::types::message::{OverlayNotification, ReviewNotification};
use clicktrail::types::settings::TransportSettings;

fn setup() -> CoordinatorHandle {
    let overlays = NotificationChannel::new("overlay", 8);
    let (handle, _task) = RecordingCoordinator::new(Arc::new(SyntheticSource::new(4, 4)), overlays)
        .spawn(&TransportSettings::default());
    handle
}

// ─── Unknown / malformed ───

#[tokio::test]
async fn test_unknown_action_returns_error() {
    let handle = setup();
    let err = handle_message(&handle, &json!({"action": "deleteEverything"}))
        .await
        .unwrap_err();
    assert_eq!(err, "unknown action: deleteEverything");
}

#[tokio::test]
async fn test_missing_action_returns_error() {
    let handle = setup();
    let err = handle_message(&handle, &json!({"clickX": 1})).await.unwrap_err();
    assert!(err.starts_with("invalid message"));
}

#[tokio::test]
async fn test_missing_coordinates_returns_error() {
    let handle = setup();
    let err = handle_message(&handle, &json!({"action": "captureScreenshot", "clickX": 1}))
        .await
        .unwrap_err();
    assert!(err.starts_with("invalid message"), "{err}");
}

// ─── Session ───

#[tokio::test]
async fn test_full_session_over_json() {
    let handle = setup();

    let started = handle_message(&handle, &json!({"action": "startRecording", "recordAudio": false}))
        .await
        .unwrap();
    assert_eq!(started, json!({"success": true}));

    let state = handle_message(&handle, &json!({"action": "getRecordingState"}))
        .await
        .unwrap();
    assert_eq!(state, json!({"isRecording": true}));

    let captured = handle_message(
        &handle,
        &json!({"action": "captureScreenshot", "clickX": 10, "clickY": 20}),
    )
    .await
    .unwrap();
    assert_eq!(captured["clickX"], json!(10.0));
    assert_eq!(captured["clickY"], json!(20.0));
    assert!(captured["image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    let stopped = handle_message(&handle, &json!({"action": "stopRecording"}))
        .await
        .unwrap();
    let captures = stopped["captures"].as_array().unwrap();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0]["clickY"], json!(20.0));
}

#[tokio::test]
async fn test_capture_while_idle_is_error_reply() {
    let handle = setup();
    let reply = handle_message(
        &handle,
        &json!({"action": "captureScreenshot", "clickX": 1, "clickY": 2}),
    )
    .await
    .unwrap();
    assert_eq!(reply, json!({"error": "Capture rejected: not recording"}));
}

#[tokio::test]
async fn test_stop_while_idle_is_empty() {
    let handle = setup();
    let reply = handle_message(&handle, &json!({"action": "stopRecording"}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"captures": []}));
}

// ─── Notifications ───

#[test]
fn test_parse_overlay_notifications() {
    let parsed: OverlayNotification =
        parse_notification(&json!({"action": "recordingStateChanged", "isRecording": true})).unwrap();
    assert_eq!(parsed, OverlayNotification::RecordingStateChanged { is_recording: true });

    let parsed: OverlayNotification =
        parse_notification(&json!({"action": "hideOverlayButtons"})).unwrap();
    assert_eq!(parsed, OverlayNotification::HideOverlayButtons);
}

#[test]
fn test_parse_review_notification() {
    let parsed: ReviewNotification =
        parse_notification(&json!({"action": "showEditInterface", "captures": []})).unwrap();
    assert_eq!(parsed, ReviewNotification::ShowEditInterface { captures: vec![] });
}

#[test]
fn test_parse_notification_rejects_requests() {
    let err = parse_notification::<OverlayNotification>(&json!({"action": "startRecording"}))
        .unwrap_err();
    assert!(err.starts_with("invalid message"));
}
