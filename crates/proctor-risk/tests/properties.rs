//! Property tests for the fusion engine and classifier.

use chrono::{TimeZone, Utc};
use proctor_risk::{classify, FusionConfig, RiskFusionEngine};
use proctor_types::{FrameSignals, GazeDirection, ViolationType};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_gaze() -> impl Strategy<Value = GazeDirection> {
    prop_oneof![
        Just(GazeDirection::Center),
        Just(GazeDirection::Left),
        Just(GazeDirection::Right),
        Just(GazeDirection::Up),
        Just(GazeDirection::Down),
    ]
}

fn arb_signals() -> impl Strategy<Value = FrameSignals> {
    (
        any::<bool>(),
        arb_gaze(),
        0.0f64..1.0,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(face_present, gaze_direction, eye_openness_ratio, mouth_moving, multiple_faces, objects_detected)| {
                FrameSignals {
                    face_present,
                    gaze_direction,
                    eye_openness_ratio,
                    mouth_moving,
                    multiple_faces,
                    objects_detected,
                    timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
                }
            },
        )
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Frame scores and rolling averages always stay within [0, 100].
    #[test]
    fn scores_stay_in_range(frames in prop::collection::vec(arb_signals(), 1..80)) {
        let mut engine = RiskFusionEngine::with_defaults();
        for signals in &frames {
            let (score, _) = engine.compute_frame_score(signals);
            prop_assert!(score <= 100);
            let assessment = engine.update(signals);
            prop_assert!(assessment.frame_score <= 100);
            prop_assert!(assessment.rolling_average <= 100);
        }
    }

    /// The window never holds more than `window_size` scores.
    #[test]
    fn window_is_bounded(
        window_size in 1usize..40,
        frames in prop::collection::vec(arb_signals(), 1..120),
    ) {
        let config = FusionConfig::default().with_window_size(window_size);
        let mut engine = RiskFusionEngine::new(config).unwrap();
        for signals in &frames {
            engine.update(signals);
            prop_assert!(engine.window().len() <= window_size);
        }
    }

    /// A full window of identical frames averages to exactly that frame's score.
    #[test]
    fn identical_frames_average_to_their_score(
        window_size in 1usize..40,
        signals in arb_signals(),
    ) {
        let config = FusionConfig::default().with_window_size(window_size);
        let mut engine = RiskFusionEngine::new(config).unwrap();
        let (score, _) = engine.compute_frame_score(&signals);
        let mut last = None;
        for _ in 0..window_size {
            last = Some(engine.update(&signals));
        }
        prop_assert_eq!(last.unwrap().rolling_average, score);
    }

    /// Feeding one extra frame evicts the oldest rather than accumulating.
    #[test]
    fn extra_frame_evicts_oldest(
        window_size in 1usize..40,
        first in arb_signals(),
        rest in arb_signals(),
        extra in arb_signals(),
    ) {
        let config = FusionConfig::default().with_window_size(window_size);
        let mut engine = RiskFusionEngine::new(config).unwrap();
        engine.update(&first);
        for _ in 1..window_size {
            engine.update(&rest);
        }
        let assessment = engine.update(&extra);

        let (rest_score, _) = engine.compute_frame_score(&rest);
        let (extra_score, _) = engine.compute_frame_score(&extra);
        let expected_sum = u32::from(rest_score) * (window_size as u32 - 1) + u32::from(extra_score);
        prop_assert_eq!(u32::from(assessment.rolling_average), expected_sum / window_size as u32);
    }

    /// Reasons always describe the current frame, whatever the history.
    #[test]
    fn reasons_match_current_frame(
        history in prop::collection::vec(arb_signals(), 0..40),
        current in arb_signals(),
    ) {
        let mut engine = RiskFusionEngine::with_defaults();
        for signals in &history {
            engine.update(signals);
        }
        let (_, expected) = engine.compute_frame_score(&current);
        prop_assert_eq!(engine.update(&current).reasons, expected);
    }

    /// A face that is not present always wins classification.
    #[test]
    fn face_absence_always_wins(signals in arb_signals()) {
        let signals = FrameSignals { face_present: false, ..signals };
        prop_assert_eq!(classify(&signals), Some(ViolationType::FaceDisappeared));
    }

    /// Gaze direction never changes the classified label.
    #[test]
    fn gaze_does_not_affect_label(signals in arb_signals(), gaze in arb_gaze()) {
        let moved = FrameSignals { gaze_direction: gaze, ..signals.clone() };
        prop_assert_eq!(classify(&signals), classify(&moved));
    }
}
