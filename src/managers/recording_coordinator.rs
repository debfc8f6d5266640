//! Recording Coordinator.
//!
//! Sole owner of the recording session: the recording flag and the buffer of
//! captures. Runs as a single tokio task that handles one command at a time,
//! so buffer mutation never needs a lock and overlapping capture requests
//! are answered in arrival order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::message_bus::{self, NotificationChannel};
use crate::services::screenshot_source::ScreenshotSource;
use crate::types::capture::Capture;
use crate::types::errors::{CaptureError, TransportError};
use crate::types::message::{
    CaptureFailure, CoordinatorReply, CoordinatorRequest, OverlayNotification,
    RecordingStateResponse, StartRecordingResponse, StopRecordingResponse,
};
use crate::types::settings::TransportSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
}

/// Trait defining recording session operations.
pub trait RecordingSessionTrait {
    /// Enters `Recording` with an empty buffer, discarding anything unsaved.
    fn start(&mut self);
    /// Returns the buffer and goes back to `Idle`. Empty when already idle.
    fn stop(&mut self) -> Vec<Capture>;
    /// Appends a capture. Rejected while idle.
    fn append(&mut self, capture: Capture) -> Result<(), CaptureError>;
    fn is_recording(&self) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Recording flag plus the ordered capture buffer.
#[derive(Debug)]
pub struct RecordingSession {
    id: Option<Uuid>,
    state: SessionState,
    captures: Vec<Capture>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            id: None,
            state: SessionState::Idle,
            captures: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Identifier of the active session, if any.
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSessionTrait for RecordingSession {
    fn start(&mut self) {
        self.id = Some(Uuid::new_v4());
        self.state = SessionState::Recording;
        self.captures.clear();
    }

    fn stop(&mut self) -> Vec<Capture> {
        if self.state == SessionState::Idle {
            return Vec::new();
        }
        self.id = None;
        self.state = SessionState::Idle;
        std::mem::take(&mut self.captures)
    }

    fn append(&mut self, capture: Capture) -> Result<(), CaptureError> {
        if self.state != SessionState::Recording {
            return Err(CaptureError::NotRecording);
        }
        self.captures.push(capture);
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    fn len(&self) -> usize {
        self.captures.len()
    }
}

/// Commands processed by the coordinator task. Each carries its reply slot.
#[derive(Debug)]
pub enum Command {
    Start {
        record_audio: Option<bool>,
        reply: oneshot::Sender<StartRecordingResponse>,
    },
    Stop {
        reply: oneshot::Sender<StopRecordingResponse>,
    },
    Capture {
        click_x: f64,
        click_y: f64,
        reply: oneshot::Sender<Result<Capture, CaptureError>>,
    },
    GetState {
        reply: oneshot::Sender<RecordingStateResponse>,
    },
}

/// Session owner living in the background context.
pub struct RecordingCoordinator {
    session: RecordingSession,
    source: Arc<dyn ScreenshotSource>,
    overlays: NotificationChannel<OverlayNotification>,
}

impl RecordingCoordinator {
    pub fn new(
        source: Arc<dyn ScreenshotSource>,
        overlays: NotificationChannel<OverlayNotification>,
    ) -> Self {
        Self {
            session: RecordingSession::new(),
            source,
            overlays,
        }
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    /// Starts a new session. Calling it mid-session restarts with an empty buffer.
    pub fn start_recording(&mut self, record_audio: Option<bool>) -> StartRecordingResponse {
        if record_audio == Some(true) {
            warn!("Audio recording requested but not supported, recording clicks only");
        }
        if self.session.is_recording() {
            warn!(
                discarded = self.session.len(),
                "Start while recording, previous captures discarded"
            );
        }
        self.session.start();
        info!(session = ?self.session.id(), "Recording started");
        self.overlays
            .notify(OverlayNotification::RecordingStateChanged { is_recording: true });
        StartRecordingResponse::ok()
    }

    /// Captures the visible area and appends it to the session buffer.
    ///
    /// Rejected with `NotRecording` while idle. A failing capture primitive
    /// leaves the buffer untouched and the error goes back to the caller.
    pub async fn capture_screenshot(
        &mut self,
        click_x: f64,
        click_y: f64,
    ) -> Result<Capture, CaptureError> {
        if !self.session.is_recording() {
            debug!(click_x, click_y, "Capture requested while idle, rejected");
            return Err(CaptureError::NotRecording);
        }

        let image = self.source.capture_visible_area().await.map_err(|e| {
            warn!(click_x, click_y, error = %e, "Screenshot capture failed");
            e
        })?;

        let capture = Capture::new(image, click_x, click_y);
        self.session.append(capture.clone())?;
        debug!(
            click_x,
            click_y,
            index = self.session.len() - 1,
            "Capture recorded"
        );
        Ok(capture)
    }

    /// Ends the session and hands over the buffer. Idle stop returns nothing.
    pub fn stop_recording(&mut self) -> StopRecordingResponse {
        if !self.session.is_recording() {
            debug!("Stop while idle, nothing to return");
            return StopRecordingResponse {
                captures: Vec::new(),
            };
        }
        let session_id = self.session.id();
        let captures = self.session.stop();
        info!(session = ?session_id, captures = captures.len(), "Recording stopped");
        self.overlays
            .notify(OverlayNotification::RecordingStateChanged { is_recording: false });
        StopRecordingResponse { captures }
    }

    pub fn recording_state(&self) -> RecordingStateResponse {
        RecordingStateResponse {
            is_recording: self.session.is_recording(),
        }
    }

    async fn handle(&mut self, command: Command) {
        // A dropped reply means the caller gave up (timeout); nothing to do.
        match command {
            Command::Start { record_audio, reply } => {
                let _ = reply.send(self.start_recording(record_audio));
            }
            Command::Stop { reply } => {
                let _ = reply.send(self.stop_recording());
            }
            Command::Capture {
                click_x,
                click_y,
                reply,
            } => {
                let result = self.capture_screenshot(click_x, click_y).await;
                let _ = reply.send(result);
            }
            Command::GetState { reply } => {
                let _ = reply.send(self.recording_state());
            }
        }
    }

    /// Processes commands until every handle has been dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        info!("Recording coordinator running");
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
        info!("Recording coordinator stopped");
    }

    /// Moves the coordinator onto its own task and returns a handle to it.
    pub fn spawn(self, transport: &TransportSettings) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(transport.channel_capacity.max(1));
        let task = tokio::spawn(self.run(rx));
        let handle = CoordinatorHandle {
            tx,
            timeout: Duration::from_millis(transport.request_timeout_ms),
        };
        (handle, task)
    }
}

/// Cloneable client used by the overlay and the review UI.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
    timeout: Duration,
}

impl CoordinatorHandle {
    pub async fn start_recording(
        &self,
        record_audio: Option<bool>,
    ) -> Result<StartRecordingResponse, TransportError> {
        message_bus::request(
            &self.tx,
            |reply| Command::Start { record_audio, reply },
            self.timeout,
        )
        .await
    }

    pub async fn stop_recording(&self) -> Result<StopRecordingResponse, TransportError> {
        message_bus::request(&self.tx, |reply| Command::Stop { reply }, self.timeout).await
    }

    pub async fn capture_screenshot(
        &self,
        click_x: f64,
        click_y: f64,
    ) -> Result<Capture, CaptureError> {
        message_bus::request(
            &self.tx,
            |reply| Command::Capture {
                click_x,
                click_y,
                reply,
            },
            self.timeout,
        )
        .await?
    }

    pub async fn get_recording_state(&self) -> Result<RecordingStateResponse, TransportError> {
        message_bus::request(&self.tx, |reply| Command::GetState { reply }, self.timeout).await
    }

    /// Routes a wire-level request to the matching typed call.
    ///
    /// Capture failures other than transport errors come back as
    /// `CoordinatorReply::CaptureFailed` so they can be encoded as `{error}`.
    pub async fn dispatch(
        &self,
        request: CoordinatorRequest,
    ) -> Result<CoordinatorReply, TransportError> {
        match request {
            CoordinatorRequest::StartRecording { record_audio } => self
                .start_recording(record_audio)
                .await
                .map(CoordinatorReply::Started),
            CoordinatorRequest::StopRecording => {
                self.stop_recording().await.map(CoordinatorReply::Stopped)
            }
            CoordinatorRequest::CaptureScreenshot { click_x, click_y } => {
                match self.capture_screenshot(click_x, click_y).await {
                    Ok(capture) => Ok(CoordinatorReply::Captured(capture)),
                    Err(CaptureError::Transport(e)) => Err(e),
                    Err(e) => Ok(CoordinatorReply::CaptureFailed(CaptureFailure {
                        error: e.to_string(),
                    })),
                }
            }
            CoordinatorRequest::GetRecordingState => self
                .get_recording_state()
                .await
                .map(CoordinatorReply::State),
        }
    }

    /// True once the coordinator task has shut down.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
