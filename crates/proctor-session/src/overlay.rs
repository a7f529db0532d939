//! Proctor-facing per-frame status display.

use chrono::{DateTime, Utc};
use proctor_types::{FrameSignals, RiskAssessment, RiskLevel, REASON_DISPLAY_THRESHOLD};
use serde::Serialize;
use tracing::debug;

/// Maximum number of reasons shown with a high probability.
pub const MAX_DISPLAYED_REASONS: usize = 3;

/// Everything shown for one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayFrame {
    pub status: Vec<String>,
    pub alerts: Vec<String>,
    pub probability: u8,
    pub level: RiskLevel,
    /// Empty unless the probability reaches the display threshold.
    pub reasons: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl OverlayFrame {
    pub fn build(signals: &FrameSignals, assessment: &RiskAssessment) -> Self {
        let status = vec![
            format!("Face: {}", if signals.face_present { "Present" } else { "Absent" }),
            format!("Gaze: {}", signals.gaze_direction),
            format!("Eyes: {}", if signals.eyes_open() { "Open" } else { "Closed" }),
            format!("Mouth: {}", if signals.mouth_moving { "Moving" } else { "Still" }),
        ];

        let mut alerts = Vec::new();
        if signals.multiple_faces {
            alerts.push("Multiple Faces Detected!".to_string());
        }
        if signals.objects_detected {
            alerts.push("Suspicious Object Detected!".to_string());
        }

        let probability = assessment.rolling_average;
        let reasons = if probability >= REASON_DISPLAY_THRESHOLD {
            assessment
                .reasons
                .iter()
                .take(MAX_DISPLAYED_REASONS)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        Self {
            status,
            alerts,
            probability,
            level: assessment.level(),
            reasons,
            timestamp: signals.timestamp,
        }
    }
}

/// Display surface for overlay frames.
pub trait Overlay: Send {
    fn render(&mut self, frame: &OverlayFrame);
}

/// Emits overlay frames as debug-level tracing events.
#[derive(Debug, Default)]
pub struct LogOverlay;

impl Overlay for LogOverlay {
    fn render(&mut self, frame: &OverlayFrame) {
        debug!(
            status = %frame.status.join(" | "),
            alerts = ?frame.alerts,
            probability = frame.probability,
            level = frame.level.as_str(),
            reasons = ?frame.reasons,
            "Cheating Probability: {}%",
            frame.probability
        );
    }
}
