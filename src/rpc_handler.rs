//! JSON message bridge for the recording coordinator.
//!
//! Messages arrive from the host as JSON objects tagged by `action`, the
//! same shapes the extension contexts exchange. `handle_message` decodes
//! them into typed requests, forwards them to the coordinator and encodes
//! the typed reply.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::managers::recording_coordinator::CoordinatorHandle;
use crate::types::message::CoordinatorRequest;

const REQUEST_ACTIONS: [&str; 4] = [
    "startRecording",
    "stopRecording",
    "captureScreenshot",
    "getRecordingState",
];

/// Decodes an action-tagged message into `T`.
///
/// Returns `unknown action: <name>` for an action outside `known`, and
/// `invalid message: <detail>` for anything else that does not decode.
fn decode<T: DeserializeOwned>(message: &Value, known: &[&str]) -> Result<T, String> {
    let action = message
        .get("action")
        .and_then(|v| v.as_str())
        .ok_or("invalid message: missing action")?;
    if !known.contains(&action) {
        return Err(format!("unknown action: {}", action));
    }
    serde_json::from_value(message.clone()).map_err(|e| format!("invalid message: {}", e))
}

/// Decodes a one-way notification (`OverlayNotification`, `ReviewNotification`).
pub fn parse_notification<T: DeserializeOwned>(message: &Value) -> Result<T, String> {
    message
        .get("action")
        .and_then(|v| v.as_str())
        .ok_or("invalid message: missing action")?;
    serde_json::from_value(message.clone()).map_err(|e| format!("invalid message: {}", e))
}

/// Dispatch a JSON request to the coordinator.
///
/// Returns `Ok(Value)` with the reply, or `Err(String)` when the message is
/// malformed or the coordinator could not be reached. A failed capture is a
/// regular reply of the form `{"error": "..."}`.
pub async fn handle_message(coordinator: &CoordinatorHandle, message: &Value) -> Result<Value, String> {
    let request: CoordinatorRequest = decode(message, &REQUEST_ACTIONS)?;
    debug!(action = request.action(), "Bridged request");
    let reply = coordinator
        .dispatch(request)
        .await
        .map_err(|e| e.to_string())?;
    serde_json::to_value(reply).map_err(|e| e.to_string())
}
