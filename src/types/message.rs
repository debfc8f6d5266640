//! Message vocabulary exchanged between the coordinator, overlay and review UI.
//!
//! Calls that expect an answer (`CoordinatorRequest`) and one-way
//! notifications (`OverlayNotification`, `ReviewNotification`) are separate
//! types. All of them are tagged by `action` on the wire.

use serde::{Deserialize, Serialize};

use super::capture::Capture;

/// Commands sent to the recording coordinator. Every variant gets a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CoordinatorRequest {
    StartRecording {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        record_audio: Option<bool>,
    },
    StopRecording,
    CaptureScreenshot { click_x: f64, click_y: f64 },
    GetRecordingState,
}

impl CoordinatorRequest {
    /// Wire name of the action, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            CoordinatorRequest::StartRecording { .. } => "startRecording",
            CoordinatorRequest::StopRecording => "stopRecording",
            CoordinatorRequest::CaptureScreenshot { .. } => "captureScreenshot",
            CoordinatorRequest::GetRecordingState => "getRecordingState",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRecordingResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StartRecordingResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecordingResponse {
    pub captures: Vec<Capture>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStateResponse {
    pub is_recording: bool,
}

/// Failure reply for a capture request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureFailure {
    pub error: String,
}

/// Reply to any `CoordinatorRequest`, encoded with the shape of the matching
/// typed response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CoordinatorReply {
    Started(StartRecordingResponse),
    Stopped(StopRecordingResponse),
    Captured(Capture),
    CaptureFailed(CaptureFailure),
    State(RecordingStateResponse),
}

/// One-way messages delivered to every attached overlay agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OverlayNotification {
    /// Authoritative state push from the coordinator.
    RecordingStateChanged { is_recording: bool },
    ShowOverlayButtons,
    HideOverlayButtons,
    /// Run the overlay's start transition as if its start button was clicked.
    TriggerStart,
    /// Run the overlay's stop transition as if its stop button was clicked.
    TriggerStop,
}

/// One-way messages delivered to the review popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReviewNotification {
    ShowEditInterface { captures: Vec<Capture> },
}
