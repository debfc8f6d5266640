//! Wire format of captures and messages.

use clicktrail::types::capture::{Capture, CaptureImage};
use clicktrail::types::errors::CaptureError;
use clicktrail::types::message::{
    CoordinatorRequest, OverlayNotification, RecordingStateResponse, ReviewNotification,
};
use rstest::rstest;
use serde_json::json;

#[test]
fn test_image_serializes_as_data_url() {
    let image = CaptureImage::png(b"hello".to_vec());
    assert_eq!(image.to_data_url(), "data:image/png;base64,aGVsbG8=");
    assert_eq!(serde_json::to_value(&image).unwrap(), json!("data:image/png;base64,aGVsbG8="));
}

#[test]
fn test_data_url_parses_mime_and_bytes() {
    let image = CaptureImage::from_data_url("data:image/jpeg;base64,aGVsbG8=").unwrap();
    assert_eq!(image.mime, "image/jpeg");
    assert_eq!(image.bytes, b"hello");
}

#[rstest]
#[case("image/png;base64,aGVsbG8=")]
#[case("data:image/png,aGVsbG8=")]
#[case("data:;base64,aGVsbG8=")]
#[case("data:image/png;base64,!!!")]
fn test_malformed_data_url_rejected(#[case] url: &str) {
    let err = CaptureImage::from_data_url(url).unwrap_err();
    assert!(matches!(err, CaptureError::InvalidImage(_)), "{url}: {err:?}");
}

#[test]
fn test_capture_uses_camel_case_fields() {
    let capture = Capture::new(CaptureImage::png(vec![1]), 10.0, 20.0);
    let value = serde_json::to_value(&capture).unwrap();
    assert_eq!(value["clickX"], json!(10.0));
    assert_eq!(value["clickY"], json!(20.0));
    assert!(value.get("annotation").is_none());

    let annotated = capture.with_annotation("  note ");
    let value = serde_json::to_value(&annotated).unwrap();
    assert_eq!(value["annotation"], json!("note"));
}

#[test]
fn test_blank_annotation_clears() {
    let capture = Capture::new(CaptureImage::png(vec![1]), 0.0, 0.0)
        .with_annotation("first")
        .with_annotation("   ");
    assert_eq!(capture.annotation, None);
}

#[test]
fn test_capture_decodes_from_wire() {
    let capture: Capture = serde_json::from_value(json!({
        "image": "data:image/png;base64,AQID",
        "clickX": 5,
        "clickY": 6.5
    }))
    .unwrap();
    assert_eq!(capture.image.bytes, vec![1, 2, 3]);
    assert_eq!(capture.click_x, 5.0);
    assert_eq!(capture.click_y, 6.5);
}

#[rstest]
#[case(json!({"action": "startRecording"}), CoordinatorRequest::StartRecording { record_audio: None })]
#[case(json!({"action": "startRecording", "recordAudio": true}), CoordinatorRequest::StartRecording { record_audio: Some(true) })]
#[case(json!({"action": "stopRecording"}), CoordinatorRequest::StopRecording)]
#[case(json!({"action": "captureScreenshot", "clickX": 1.0, "clickY": 2.0}), CoordinatorRequest::CaptureScreenshot { click_x: 1.0, click_y: 2.0 })]
#[case(json!({"action": "getRecordingState"}), CoordinatorRequest::GetRecordingState)]
fn test_request_wire_names(#[case] wire: serde_json::Value, #[case] expected: CoordinatorRequest) {
    let decoded: CoordinatorRequest = serde_json::from_value(wire).unwrap();
    assert_eq!(decoded, expected);
}

#[test]
fn test_notification_wire_names() {
    assert_eq!(
        serde_json::to_value(OverlayNotification::RecordingStateChanged { is_recording: true }).unwrap(),
        json!({"action": "recordingStateChanged", "isRecording": true})
    );
    assert_eq!(
        serde_json::to_value(OverlayNotification::ShowOverlayButtons).unwrap(),
        json!({"action": "showOverlayButtons"})
    );
    assert_eq!(
        serde_json::to_value(ReviewNotification::ShowEditInterface { captures: vec![] }).unwrap(),
        json!({"action": "showEditInterface", "captures": []})
    );
    assert_eq!(
        serde_json::to_value(RecordingStateResponse { is_recording: false }).unwrap(),
        json!({"isRecording": false})
    );
}
