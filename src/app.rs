//! App Core for Clicktrail.
//!
//! Wires settings, the coordinator task and the notification channels, and
//! hands out overlay agents and review UIs connected to them.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::managers::overlay_agent::OverlayAgent;
use crate::managers::recording_coordinator::{CoordinatorHandle, RecordingCoordinator};
use crate::managers::review_ui::ReviewUi;
use crate::platform;
use crate::services::message_bus::NotificationChannel;
use crate::services::pdf_exporter::PdfExporter;
use crate::services::screenshot_source::{RetryingSource, ScreenshotSource};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::AppError;
use crate::types::message::{OverlayNotification, ReviewNotification};
use crate::types::settings::RecorderSettings;

/// Central application struct. Must be created inside a tokio runtime.
pub struct App {
    pub settings_engine: SettingsEngine,
    pub coordinator: CoordinatorHandle,
    pub overlays: NotificationChannel<OverlayNotification>,
    pub review: NotificationChannel<ReviewNotification>,
    coordinator_task: JoinHandle<()>,
}

impl App {
    /// Loads settings and starts the coordinator.
    ///
    /// `settings_path` overrides the platform config file. The screenshot
    /// source is wrapped with the configured retry policy.
    pub fn new(
        settings_path: Option<String>,
        source: Arc<dyn ScreenshotSource>,
    ) -> Result<Self, AppError> {
        let mut settings_engine = SettingsEngine::new(settings_path);
        settings_engine.load()?;
        Ok(Self::with_settings(settings_engine, source))
    }

    /// Starts the coordinator with an already-loaded settings engine.
    pub fn with_settings(settings_engine: SettingsEngine, source: Arc<dyn ScreenshotSource>) -> Self {
        let settings = settings_engine.get_settings().clone();
        let capacity = settings.transport.channel_capacity;
        let overlays = NotificationChannel::new("overlay", capacity);
        let review = NotificationChannel::new("review", capacity);

        let source: Arc<dyn ScreenshotSource> =
            Arc::new(RetryingSource::new(source, &settings.capture));
        let coordinator = RecordingCoordinator::new(source, overlays.clone());
        let (coordinator, coordinator_task) = coordinator.spawn(&settings.transport);
        info!(
            config = settings_engine.get_config_path(),
            timeout_ms = settings.transport.request_timeout_ms,
            "Clicktrail initialized"
        );

        Self {
            settings_engine,
            coordinator,
            overlays,
            review,
            coordinator_task,
        }
    }

    pub fn settings(&self) -> &RecorderSettings {
        self.settings_engine.get_settings()
    }

    /// Creates an overlay agent attached to this app's coordinator.
    pub fn overlay_agent(&self) -> OverlayAgent {
        let mut agent = OverlayAgent::new(self.coordinator.clone(), self.review.clone());
        agent.set_record_audio(self.settings().capture.record_audio);
        agent
    }

    /// Creates a review popup attached to this app's coordinator.
    pub fn review_ui(&self) -> ReviewUi {
        let mut ui = ReviewUi::new(
            self.coordinator.clone(),
            self.overlays.clone(),
            PdfExporter::new(self.settings().export.clone()),
        );
        ui.set_record_audio(self.settings().capture.record_audio);
        ui
    }

    /// Directory exported PDFs go to: the configured one, else the platform default.
    pub fn export_dir(&self) -> PathBuf {
        self.settings()
            .export
            .output_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(platform::get_export_dir)
    }

    /// Stops the coordinator task. Outstanding handles start failing with
    /// `TransportError::Closed`.
    pub async fn shutdown(self) {
        self.coordinator_task.abort();
        let _ = self.coordinator_task.await;
        info!("Clicktrail shut down");
    }
}
