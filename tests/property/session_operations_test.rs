//! Property-based tests for recording session operations.
//!
//! These tests verify the buffer invariants: for any sequence of starts,
//! clicks and stops, a stop returns exactly the clicks appended since the
//! most recent start, in click order, and clicks while idle are rejected
//! without touching the buffer.

use clicktrail::managers::recording_coordinator::{
    RecordingSession, RecordingSessionTrait, SessionState,
};
use clicktrail::types::capture::{Capture, CaptureImage};
use clicktrail::types::errors::CaptureError;
use proptest::prelude::*;

/// Operations that can be performed on a RecordingSession.
#[derive(Debug, Clone)]
enum SessionOp {
    Start,
    Click(u16, u16),
    Stop,
}

/// Clicks dominate so sessions usually hold a few captures.
fn arb_session_ops() -> impl Strategy<Value = Vec<SessionOp>> {
    prop::collection::vec(
        prop_oneof![
            1 => Just(SessionOp::Start),
            5 => (0..2000u16, 0..2000u16).prop_map(|(x, y)| SessionOp::Click(x, y)),
            1 => Just(SessionOp::Stop),
        ],
        1..80,
    )
}

fn capture_at(x: u16, y: u16) -> Capture {
    Capture::new(CaptureImage::png(vec![0]), f64::from(x), f64::from(y))
}

fn coords(captures: &[Capture]) -> Vec<(f64, f64)> {
    captures.iter().map(|c| (c.click_x, c.click_y)).collect()
}

// **Buffer matches the clicks of the latest session**
//
// *For any* operation sequence, the session SHALL behave like a model that
// clears on start, appends only while recording and drains on stop.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn session_buffer_tracks_model(ops in arb_session_ops()) {
        let mut session = RecordingSession::new();
        let mut recording = false;
        let mut model: Vec<(f64, f64)> = Vec::new();

        for op in &ops {
            match op {
                SessionOp::Start => {
                    session.start();
                    recording = true;
                    model.clear();
                }
                SessionOp::Click(x, y) => {
                    let result = session.append(capture_at(*x, *y));
                    if recording {
                        prop_assert!(result.is_ok());
                        model.push((f64::from(*x), f64::from(*y)));
                    } else {
                        prop_assert!(matches!(result, Err(CaptureError::NotRecording)));
                    }
                }
                SessionOp::Stop => {
                    let drained = session.stop();
                    prop_assert_eq!(coords(&drained), std::mem::take(&mut model));
                    recording = false;
                }
            }

            prop_assert_eq!(session.is_recording(), recording);
            prop_assert_eq!(session.len(), model.len());
            prop_assert_eq!(coords(session.captures()), model.clone());
            prop_assert_eq!(session.id().is_some(), recording);
        }
    }
}

// **Idle stop is harmless**
//
// *For any* sequence ending in two stops, the second stop SHALL return an
// empty buffer and leave the session idle.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn repeated_stop_returns_empty(ops in arb_session_ops()) {
        let mut session = RecordingSession::new();
        for op in &ops {
            match op {
                SessionOp::Start => session.start(),
                SessionOp::Click(x, y) => {
                    let _ = session.append(capture_at(*x, *y));
                }
                SessionOp::Stop => {
                    session.stop();
                }
            }
        }

        session.stop();
        prop_assert!(session.stop().is_empty());
        prop_assert_eq!(session.state(), SessionState::Idle);
        prop_assert!(session.is_empty());
    }
}

// **Each start opens a new session**
//
// Two consecutive starts SHALL yield distinct session identifiers.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn restart_assigns_new_id(clicks in 0usize..10) {
        let mut session = RecordingSession::new();
        session.start();
        let first = session.id();
        for i in 0..clicks {
            session.append(capture_at(i as u16, i as u16)).unwrap();
        }
        session.start();

        prop_assert_ne!(session.id(), first);
        prop_assert!(session.is_empty());
    }
}
