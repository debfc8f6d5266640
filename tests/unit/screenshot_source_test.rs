//! Retry policy around the capture primitive, and the synthetic source.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clicktrail::services::screenshot_source::{RetryingSource, ScreenshotSource, SyntheticSource};
use clicktrail::types::capture::CaptureImage;
use clicktrail::types::errors::CaptureError;
use clicktrail::types::settings::CaptureSettings;

/// Fails with `error` for the first `failures` calls, then succeeds.
struct FlakySource {
    failures: u32,
    error: CaptureError,
    calls: AtomicU32,
}

impl FlakySource {
    fn new(failures: u32, error: CaptureError) -> Arc<Self> {
        Arc::new(Self {
            failures,
            error,
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScreenshotSource for FlakySource {
    async fn capture_visible_area(&self) -> Result<CaptureImage, CaptureError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(self.error.clone())
        } else {
            Ok(CaptureImage::png(vec![call as u8]))
        }
    }
}

fn rate_limited() -> CaptureError {
    CaptureError::RateLimited("MAX_CAPTURE_VISIBLE_TAB_CALLS_PER_SECOND".to_string())
}

#[tokio::test]
async fn test_rate_limited_capture_succeeds_after_retry() {
    let flaky = FlakySource::new(2, rate_limited());
    let source = RetryingSource::with_policy(flaky.clone(), 3, Duration::from_millis(1));

    let image = source.capture_visible_area().await.unwrap();

    assert_eq!(image.bytes, vec![2]);
    assert_eq!(flaky.calls(), 3);
}

#[tokio::test]
async fn test_retry_gives_up_after_max_attempts() {
    let flaky = FlakySource::new(10, rate_limited());
    let source = RetryingSource::with_policy(flaky.clone(), 3, Duration::from_millis(1));

    let err = source.capture_visible_area().await.unwrap_err();

    assert!(matches!(err, CaptureError::RateLimited(_)));
    assert_eq!(flaky.calls(), 3);
}

#[tokio::test]
async fn test_denied_capture_is_not_retried() {
    let flaky = FlakySource::new(1, CaptureError::Denied("no tab permission".to_string()));
    let source = RetryingSource::with_policy(flaky.clone(), 5, Duration::from_millis(1));

    let err = source.capture_visible_area().await.unwrap_err();

    assert!(matches!(err, CaptureError::Denied(_)));
    assert_eq!(flaky.calls(), 1);
}

#[tokio::test]
async fn test_zero_attempts_still_tries_once() {
    let flaky = FlakySource::new(0, rate_limited());
    let source = RetryingSource::with_policy(flaky.clone(), 0, Duration::from_millis(1));

    assert_eq!(source.max_attempts(), 1);
    source.capture_visible_area().await.unwrap();
    assert_eq!(flaky.calls(), 1);
}

#[test]
fn test_policy_from_settings() {
    let settings = CaptureSettings {
        max_attempts: 4,
        ..CaptureSettings::default()
    };
    let source = RetryingSource::new(SyntheticSource::new(2, 2), &settings);
    assert_eq!(source.max_attempts(), 4);
}

#[tokio::test]
async fn test_synthetic_frames_are_decodable_png() {
    let source = SyntheticSource::new(64, 32);

    let first = source.capture_visible_area().await.unwrap();
    let second = source.capture_visible_area().await.unwrap();

    assert_eq!(first.mime, "image/png");
    assert_ne!(first.bytes, second.bytes);
    assert_eq!(source.frames_captured(), 2);
    let decoded = image::load_from_memory(&first.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 32));
}
