use serde::{Deserialize, Serialize};

/// Top-level recorder settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecorderSettings {
    pub capture: CaptureSettings,
    pub transport: TransportSettings,
    pub export: ExportSettings,
}

/// How clicks are turned into screenshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureSettings {
    /// Total tries of the capture primitive per click, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub initial_backoff_ms: u64,
    /// Audio recording preference. Accepted but not implemented.
    pub record_audio: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            record_audio: false,
        }
    }
}

/// Message channel tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportSettings {
    pub request_timeout_ms: u64,
    pub channel_capacity: usize,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5000,
            channel_capacity: 32,
        }
    }
}

/// PDF page layout. Lengths are millimetres unless noted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportSettings {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub image_width_mm: f32,
    pub marker_radius_mm: f32,
    pub marker_color: [u8; 3],
    pub annotation_font_size_pt: f32,
    /// Gap between the bottom edge of the image and the annotation baseline.
    pub annotation_offset_mm: f32,
    pub file_name: String,
    /// Overrides the platform export directory when set.
    pub output_dir: Option<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            image_width_mm: 190.0,
            marker_radius_mm: 2.0,
            marker_color: [255, 0, 0],
            annotation_font_size_pt: 12.0,
            annotation_offset_mm: 10.0,
            file_name: "recording.pdf".to_string(),
            output_dir: None,
        }
    }
}
