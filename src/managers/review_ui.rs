//! Review & Export UI.
//!
//! The popup: mirrors the start/stop controls, shows the finished captures
//! as editable page previews and turns the kept ones into a PDF.

use std::path::{Path, PathBuf};

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::managers::recording_coordinator::CoordinatorHandle;
use crate::services::message_bus::NotificationChannel;
use crate::services::pdf_exporter::{ExportedDocument, PdfExporter};
use crate::types::capture::Capture;
use crate::types::errors::{ReviewError, TransportError};
use crate::types::message::{OverlayNotification, ReviewNotification};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Start/stop controls.
    Recording,
    /// Page previews with delete toggles and annotation fields.
    Editing,
}

/// Editable view of one capture. Deleting only marks it.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePreview {
    pub capture: Capture,
    pub deleted: bool,
    pub annotation: String,
}

impl PagePreview {
    fn new(capture: Capture) -> Self {
        Self {
            capture,
            deleted: false,
            annotation: String::new(),
        }
    }
}

pub struct ReviewUi {
    coordinator: CoordinatorHandle,
    overlays: NotificationChannel<OverlayNotification>,
    exporter: PdfExporter,
    screen: Screen,
    previews: Vec<PagePreview>,
    record_audio: bool,
}

impl ReviewUi {
    pub fn new(
        coordinator: CoordinatorHandle,
        overlays: NotificationChannel<OverlayNotification>,
        exporter: PdfExporter,
    ) -> Self {
        Self {
            coordinator,
            overlays,
            exporter,
            screen: Screen::Recording,
            previews: Vec::new(),
            record_audio: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn previews(&self) -> &[PagePreview] {
        &self.previews
    }

    pub fn set_record_audio(&mut self, record_audio: bool) {
        self.record_audio = record_audio;
    }

    /// Starts a session from the popup and asks overlays to show their controls.
    pub async fn start_recording(&mut self) -> Result<(), ReviewError> {
        let response = self
            .coordinator
            .start_recording(self.record_audio.then_some(true))
            .await?;
        if !response.success {
            let reason = response
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(%reason, "Coordinator rejected start");
            return Err(ReviewError::StartRejected(reason));
        }
        self.previews.clear();
        self.screen = Screen::Recording;
        self.overlays.notify(OverlayNotification::ShowOverlayButtons);
        Ok(())
    }

    /// Stops the session and opens the edit screen with the returned captures.
    pub async fn stop_recording(&mut self) -> Result<usize, ReviewError> {
        let response = self.coordinator.stop_recording().await?;
        let count = response.captures.len();
        self.show_edit_interface(response.captures);
        self.overlays.notify(OverlayNotification::HideOverlayButtons);
        Ok(count)
    }

    /// Runs the overlay's own start transition. Returns how many overlays were reached.
    pub fn trigger_overlay_start(&self) -> usize {
        self.overlays.notify(OverlayNotification::TriggerStart)
    }

    /// Runs the overlay's own stop transition. Returns how many overlays were reached.
    pub fn trigger_overlay_stop(&self) -> usize {
        self.overlays.notify(OverlayNotification::TriggerStop)
    }

    /// Replaces the working set and switches to the edit screen.
    pub fn show_edit_interface(&mut self, captures: Vec<Capture>) {
        info!(captures = captures.len(), "Opening edit interface");
        self.previews = captures.into_iter().map(PagePreview::new).collect();
        self.screen = Screen::Editing;
    }

    pub fn handle_notification(&mut self, notification: ReviewNotification) {
        match notification {
            ReviewNotification::ShowEditInterface { captures } => {
                self.show_edit_interface(captures)
            }
        }
    }

    /// Waits for the next notification and applies it.
    pub async fn receive(
        &mut self,
        notifications: &mut broadcast::Receiver<ReviewNotification>,
    ) -> Result<(), TransportError> {
        loop {
            match notifications.recv().await {
                Ok(notification) => {
                    self.handle_notification(notification);
                    return Ok(());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Review UI lagged behind notifications");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(TransportError::Closed(
                        "review notification channel".to_string(),
                    ))
                }
            }
        }
    }

    /// Flips the deleted mark of a preview. Returns the new mark.
    pub fn toggle_deleted(&mut self, index: usize) -> Result<bool, ReviewError> {
        let preview = self
            .previews
            .get_mut(index)
            .ok_or(ReviewError::InvalidIndex(index))?;
        preview.deleted = !preview.deleted;
        Ok(preview.deleted)
    }

    pub fn set_annotation(&mut self, index: usize, text: &str) -> Result<(), ReviewError> {
        let preview = self
            .previews
            .get_mut(index)
            .ok_or(ReviewError::InvalidIndex(index))?;
        preview.annotation = text.to_string();
        Ok(())
    }

    /// Captures that survive export, in capture order, annotations applied.
    pub fn retained_captures(&self) -> Vec<Capture> {
        self.previews
            .iter()
            .filter(|p| !p.deleted)
            .map(|p| p.capture.clone().with_annotation(&p.annotation))
            .collect()
    }

    pub fn export(&self) -> Result<ExportedDocument, ReviewError> {
        let retained = self.retained_captures();
        info!(
            retained = retained.len(),
            deleted = self.previews.len() - retained.len(),
            "Exporting recording"
        );
        Ok(self.exporter.render(&retained)?)
    }

    /// Exports and writes the PDF into `dir`.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, ReviewError> {
        let document = self.export()?;
        Ok(document.write_to_dir(dir)?)
    }
}
