//! Screenshot capture primitive and the policies wrapped around it.

use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use tracing::{debug, warn};

use crate::types::capture::CaptureImage;
use crate::types::errors::CaptureError;
use crate::types::settings::CaptureSettings;

/// Captures the currently visible area of the recorded page.
#[async_trait]
pub trait ScreenshotSource: Send + Sync {
    async fn capture_visible_area(&self) -> Result<CaptureImage, CaptureError>;
}

#[async_trait]
impl<S: ScreenshotSource + ?Sized> ScreenshotSource for Arc<S> {
    async fn capture_visible_area(&self) -> Result<CaptureImage, CaptureError> {
        (**self).capture_visible_area().await
    }
}

/// Retries a rate-limited capture primitive with exponential backoff.
///
/// Only `CaptureError::RateLimited` is retried. Every other failure, and the
/// last rate-limit failure, is returned unchanged.
pub struct RetryingSource<S> {
    inner: S,
    max_attempts: u32,
    initial_backoff: Duration,
}

impl<S: ScreenshotSource> RetryingSource<S> {
    pub fn new(inner: S, settings: &CaptureSettings) -> Self {
        Self::with_policy(
            inner,
            settings.max_attempts,
            Duration::from_millis(settings.initial_backoff_ms),
        )
    }

    pub fn with_policy(inner: S, max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[async_trait]
impl<S: ScreenshotSource> ScreenshotSource for RetryingSource<S> {
    async fn capture_visible_area(&self) -> Result<CaptureImage, CaptureError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;
        loop {
            match self.inner.capture_visible_area().await {
                Ok(image) => return Ok(image),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Capture failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Generates PNG frames locally instead of grabbing the screen.
///
/// Each frame is a gradient whose red channel changes with the frame
/// number, so consecutive captures are distinguishable.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frames: AtomicU32,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            frames: AtomicU32::new(0),
        }
    }

    /// Number of frames produced so far.
    pub fn frames_captured(&self) -> u32 {
        self.frames.load(Ordering::SeqCst)
    }

    /// Renders one frame as PNG bytes.
    pub fn render_png(&self, frame: u32) -> Result<Vec<u8>, CaptureError> {
        let (w, h) = (self.width as u64, self.height as u64);
        let shade = (frame.wrapping_mul(47) % 256) as u8;
        let img = RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb([shade, (x as u64 * 255 / w) as u8, (y as u64 * 255 / h) as u8])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| CaptureError::InvalidImage(e.to_string()))?;
        Ok(bytes)
    }
}

#[async_trait]
impl ScreenshotSource for SyntheticSource {
    async fn capture_visible_area(&self) -> Result<CaptureImage, CaptureError> {
        let frame = self.frames.fetch_add(1, Ordering::SeqCst);
        let bytes = self.render_png(frame)?;
        debug!(frame, bytes = bytes.len(), "Synthetic frame rendered");
        Ok(CaptureImage::png(bytes))
    }
}
