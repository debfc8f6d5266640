//! Page Overlay Agent.
//!
//! The control widget injected into the recorded page. It mirrors the
//! coordinator's recording flag for display purposes only, turns page clicks
//! into capture requests while recording, and hands the finished captures to
//! the review UI.

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::managers::recording_coordinator::CoordinatorHandle;
use crate::services::message_bus::NotificationChannel;
use crate::types::capture::Capture;
use crate::types::errors::OverlayError;
use crate::types::message::{OverlayNotification, ReviewNotification};

/// Where a click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The overlay's own start/stop widget.
    Controls,
    /// Anywhere else on the page.
    Page,
}

/// A click on the recorded page, in page-relative pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageClick {
    pub page_x: f64,
    pub page_y: f64,
    pub target: ClickTarget,
}

impl PageClick {
    pub fn on_page(page_x: f64, page_y: f64) -> Self {
        Self {
            page_x,
            page_y,
            target: ClickTarget::Page,
        }
    }

    pub fn on_controls(page_x: f64, page_y: f64) -> Self {
        Self {
            page_x,
            page_y,
            target: ClickTarget::Controls,
        }
    }
}

/// Which button the widget currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlButton {
    Start,
    Stop,
}

pub struct OverlayAgent {
    coordinator: CoordinatorHandle,
    review: NotificationChannel<ReviewNotification>,
    visible: bool,
    is_recording: bool,
    record_audio: bool,
}

impl OverlayAgent {
    pub fn new(
        coordinator: CoordinatorHandle,
        review: NotificationChannel<ReviewNotification>,
    ) -> Self {
        Self {
            coordinator,
            review,
            visible: false,
            is_recording: false,
            record_audio: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Locally believed recording state. The coordinator stays authoritative.
    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn displayed_button(&self) -> ControlButton {
        if self.is_recording {
            ControlButton::Stop
        } else {
            ControlButton::Start
        }
    }

    /// Preference forwarded with the next start command.
    pub fn set_record_audio(&mut self, record_audio: bool) {
        self.record_audio = record_audio;
    }

    /// Shows the widget and syncs the button with the coordinator.
    ///
    /// If the state query fails the widget still shows, keeping its last
    /// known state, and the error is returned.
    pub async fn show_controls(&mut self) -> Result<(), OverlayError> {
        self.visible = true;
        let state = self.coordinator.get_recording_state().await.map_err(|e| {
            warn!(error = %e, "Could not query recording state");
            e
        })?;
        self.apply_recording_state(state.is_recording);
        Ok(())
    }

    pub fn hide_controls(&mut self) {
        self.visible = false;
    }

    /// Adopts the coordinator's authoritative recording state.
    pub fn apply_recording_state(&mut self, is_recording: bool) {
        if self.is_recording != is_recording {
            debug!(is_recording, "Overlay state synced");
        }
        self.is_recording = is_recording;
    }

    /// Start transition, shared by the start button and `TriggerStart`.
    pub async fn start_recording(&mut self) -> Result<(), OverlayError> {
        let record_audio = self.record_audio.then_some(true);
        let response = self
            .coordinator
            .start_recording(record_audio)
            .await
            .map_err(|e| {
                warn!(error = %e, "Start command failed");
                e
            })?;
        if !response.success {
            let reason = response
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(%reason, "Coordinator rejected start");
            return Err(OverlayError::StartRejected(reason));
        }
        self.is_recording = true;
        info!("Overlay recording");
        Ok(())
    }

    /// Stop transition, shared by the stop button and `TriggerStop`.
    ///
    /// Forwards the returned captures to the review UI and hides the widget.
    /// Returns how many captures were handed over.
    pub async fn stop_recording(&mut self) -> Result<usize, OverlayError> {
        let response = self.coordinator.stop_recording().await.map_err(|e| {
            warn!(error = %e, "Stop command failed");
            e
        })?;
        self.is_recording = false;
        let count = response.captures.len();
        self.review.notify(ReviewNotification::ShowEditInterface {
            captures: response.captures,
        });
        self.hide_controls();
        info!(captures = count, "Overlay stopped, captures sent for review");
        Ok(count)
    }

    /// Turns a page click into a capture request.
    ///
    /// Returns `None` when the click is ignored: it hit the widget itself or
    /// the overlay does not believe a session is running.
    pub async fn handle_click(
        &mut self,
        click: PageClick,
    ) -> Option<Result<Capture, OverlayError>> {
        if click.target == ClickTarget::Controls || !self.is_recording {
            return None;
        }
        let result = self
            .coordinator
            .capture_screenshot(click.page_x, click.page_y)
            .await
            .map_err(|e| {
                warn!(x = click.page_x, y = click.page_y, error = %e, "Click not captured");
                OverlayError::from(e)
            });
        Some(result)
    }

    pub async fn handle_notification(
        &mut self,
        notification: OverlayNotification,
    ) -> Result<(), OverlayError> {
        match notification {
            OverlayNotification::RecordingStateChanged { is_recording } => {
                self.apply_recording_state(is_recording);
                Ok(())
            }
            OverlayNotification::ShowOverlayButtons => self.show_controls().await,
            OverlayNotification::HideOverlayButtons => {
                self.hide_controls();
                Ok(())
            }
            OverlayNotification::TriggerStart => self.start_recording().await,
            OverlayNotification::TriggerStop => self.stop_recording().await.map(|_| ()),
        }
    }

    /// Event loop: handles notifications and page clicks one at a time
    /// until both sources are closed.
    pub async fn run(
        mut self,
        mut notifications: broadcast::Receiver<OverlayNotification>,
        mut clicks: mpsc::Receiver<PageClick>,
    ) {
        let mut notifications_open = true;
        let mut clicks_open = true;
        while notifications_open || clicks_open {
            // Clicks first: a queued stop must not overtake clicks made before it.
            // Notifications wait only while clicks are already queued.
            tokio::select! {
                biased;
                click = clicks.recv(), if clicks_open => match click {
                    Some(click) => {
                        let _ = self.handle_click(click).await;
                    }
                    None => clicks_open = false,
                },
                received = notifications.recv(), if notifications_open => match received {
                    Ok(notification) => {
                        if let Err(e) = self.handle_notification(notification).await {
                            warn!(error = %e, "Overlay notification failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Overlay lagged behind notifications");
                    }
                    Err(broadcast::error::RecvError::Closed) => notifications_open = false,
                },
            }
        }
        debug!("Overlay event loop finished");
    }
}
