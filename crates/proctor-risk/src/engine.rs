//! Risk fusion engine.

use proctor_types::{FrameSignals, RiskAssessment, ViolationType, WeightTable};
use tracing::trace;

use crate::config::FusionConfig;
use crate::error::RiskResult;
use crate::window::ScoreWindow;

/// Upper bound of every score the engine produces.
const MAX_SCORE: u32 = 100;

/// Fuses per-frame signals into a frame score and a windowed probability.
///
/// Conditions are evaluated in a fixed order (face absence, multiple faces,
/// object, mouth movement, gaze away). Each present condition adds its
/// configured weight and appends its reason; the sum is clamped to 100.
#[derive(Clone, Debug)]
pub struct RiskFusionEngine {
    weights: WeightTable,
    window: ScoreWindow,
}

impl RiskFusionEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: FusionConfig) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self {
            window: ScoreWindow::new(config.window_size),
            weights: config.risk_weights,
        })
    }

    /// Engine with the default window of 30 frames and default weights.
    pub fn with_defaults() -> Self {
        Self {
            weights: WeightTable::risk_defaults(),
            window: ScoreWindow::new(crate::config::DEFAULT_WINDOW_SIZE),
        }
    }

    /// Score a single frame without touching the window.
    pub fn compute_frame_score(&self, signals: &FrameSignals) -> (u8, Vec<String>) {
        let conditions = [
            (!signals.face_present, ViolationType::FaceDisappeared, "Face not visible"),
            (signals.multiple_faces, ViolationType::MultipleFaces, "Multiple faces detected"),
            (signals.objects_detected, ViolationType::ObjectDetected, "Suspicious object detected"),
            (signals.mouth_moving, ViolationType::MouthMoving, "Mouth movement detected"),
            (signals.gaze_direction.is_away(), ViolationType::GazeAway, "Looking away from screen"),
        ];

        let mut score: u32 = 0;
        let mut reasons = Vec::new();
        for (present, ty, reason) in conditions {
            if present {
                score = score.saturating_add(self.weights.weight_or(ty, 0));
                reasons.push(reason.to_string());
            }
        }

        (score.min(MAX_SCORE) as u8, reasons)
    }

    /// Push the frame's score into the window and return the assessment.
    ///
    /// The probability is the truncated mean of the window; the reasons are
    /// those of the current frame only.
    pub fn update(&mut self, signals: &FrameSignals) -> RiskAssessment {
        let (frame_score, reasons) = self.compute_frame_score(signals);
        self.window.push(frame_score);
        // The window holds at least the score just pushed.
        let rolling_average = self.window.average().unwrap_or(frame_score);

        trace!(
            frame_score,
            rolling_average,
            window_len = self.window.len(),
            "Risk updated"
        );

        RiskAssessment {
            frame_score,
            rolling_average,
            reasons,
        }
    }

    pub fn window(&self) -> &ScoreWindow {
        &self.window
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Forget all windowed history.
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proctor_types::GazeDirection;

    fn attentive() -> FrameSignals {
        FrameSignals::attentive(Utc::now())
    }

    fn face_absent() -> FrameSignals {
        FrameSignals {
            face_present: false,
            ..attentive()
        }
    }

    #[test]
    fn attentive_frame_scores_zero() {
        let engine = RiskFusionEngine::with_defaults();
        let (score, reasons) = engine.compute_frame_score(&attentive());
        assert_eq!(score, 0);
        assert!(reasons.is_empty());
    }

    #[test]
    fn reasons_follow_fixed_order() {
        let engine = RiskFusionEngine::with_defaults();
        let signals = FrameSignals {
            gaze_direction: GazeDirection::Left,
            mouth_moving: true,
            objects_detected: true,
            ..attentive()
        };
        let (score, reasons) = engine.compute_frame_score(&signals);
        assert_eq!(score, 45 + 20 + 15);
        assert_eq!(
            reasons,
            vec![
                "Suspicious object detected",
                "Mouth movement detected",
                "Looking away from screen",
            ]
        );
    }

    #[test]
    fn score_is_clamped_to_100() {
        let engine = RiskFusionEngine::with_defaults();
        let signals = FrameSignals {
            face_present: false,
            multiple_faces: true,
            objects_detected: true,
            mouth_moving: true,
            gaze_direction: GazeDirection::Down,
            ..attentive()
        };
        let (score, reasons) = engine.compute_frame_score(&signals);
        assert_eq!(score, 100);
        assert_eq!(reasons.len(), 5);
    }

    #[test]
    fn first_update_returns_frame_score() {
        let mut engine = RiskFusionEngine::with_defaults();
        let assessment = engine.update(&face_absent());
        assert_eq!(assessment.frame_score, 40);
        assert_eq!(assessment.rolling_average, 40);
        assert_eq!(engine.window().len(), 1);
    }

    #[test]
    fn thirty_face_absent_frames_stabilise_at_forty() {
        let mut engine = RiskFusionEngine::with_defaults();
        for _ in 0..30 {
            let assessment = engine.update(&face_absent());
            assert_eq!(assessment.rolling_average, 40);
            assert_eq!(assessment.reasons, vec!["Face not visible"]);
        }
        assert_eq!(engine.window().len(), 30);
    }

    #[test]
    fn reasons_are_not_windowed() {
        let mut engine = RiskFusionEngine::with_defaults();
        engine.update(&face_absent());
        let assessment = engine.update(&attentive());
        assert_eq!(assessment.rolling_average, 20);
        assert!(assessment.reasons.is_empty());
    }

    #[test]
    fn oldest_score_is_evicted() {
        let config = FusionConfig::default().with_window_size(3);
        let mut engine = RiskFusionEngine::new(config).unwrap();
        engine.update(&face_absent());
        engine.update(&attentive());
        engine.update(&attentive());
        // window [40, 0, 0]
        assert_eq!(engine.update(&attentive()).rolling_average, 0);
    }

    #[test]
    fn custom_weights_apply() {
        let weights = WeightTable::risk_defaults().with(ViolationType::FaceDisappeared, 90);
        let config = FusionConfig::default().with_risk_weights(weights);
        let engine = RiskFusionEngine::new(config).unwrap();
        assert_eq!(engine.compute_frame_score(&face_absent()).0, 90);
    }

    #[test]
    fn zero_window_is_rejected() {
        let config = FusionConfig::default().with_window_size(0);
        assert!(RiskFusionEngine::new(config).is_err());
    }

    #[test]
    fn reset_clears_history() {
        let mut engine = RiskFusionEngine::with_defaults();
        engine.update(&face_absent());
        engine.reset();
        assert!(engine.window().is_empty());
        assert_eq!(engine.update(&attentive()).rolling_average, 0);
    }
}
