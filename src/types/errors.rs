use thiserror::Error;

// === TransportError ===

/// Errors raised by the message channel between components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The receiving side of the channel has gone away.
    #[error("Message channel closed: {0}")]
    Closed(String),
    /// The request was delivered but the reply side was dropped.
    #[error("No response received: {0}")]
    NoResponse(String),
    /// No reply arrived within the configured request timeout.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
}

// === CaptureError ===

/// Errors related to taking a screenshot for a click.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    /// A capture was requested while no session is active.
    #[error("Capture rejected: not recording")]
    NotRecording,
    /// The platform throttled the capture primitive.
    #[error("Capture rate limited: {0}")]
    RateLimited(String),
    /// The platform refused to capture the visible area.
    #[error("Capture denied: {0}")]
    Denied(String),
    /// The image payload could not be parsed.
    #[error("Invalid capture image: {0}")]
    InvalidImage(String),
    /// The request never reached the coordinator or its reply was lost.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CaptureError {
    /// Whether retrying the capture primitive may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CaptureError::RateLimited(_))
    }
}

// === OverlayError ===

/// Errors surfaced by the in-page overlay agent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    /// The coordinator answered a start command with `success: false`.
    #[error("Start rejected: {0}")]
    StartRejected(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

// === ExportError ===

/// Errors related to assembling the PDF document.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A capture image could not be decoded.
    #[error("Cannot decode capture {index}: {reason}")]
    InvalidImage { index: usize, reason: String },
    /// The PDF writer failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),
    /// Writing the finished file failed.
    #[error("Export I/O error: {0}")]
    Io(String),
}

// === ReviewError ===

/// Errors related to the review and export popup.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// No page preview exists at the given index.
    #[error("Invalid preview index: {0}")]
    InvalidIndex(usize),
    /// The coordinator answered a start command with `success: false`.
    #[error("Start rejected: {0}")]
    StartRejected(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === AppError ===

/// Errors raised while wiring the application together.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}
