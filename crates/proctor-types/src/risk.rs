//! Risk assessment values produced by the fusion engine.

use serde::{Deserialize, Serialize};

/// Windowed probability at or above which a high-risk event is logged.
pub const HIGH_RISK_THRESHOLD: u8 = 70;

/// Windowed probability at or above which reasons are shown to the proctor.
pub const REASON_DISPLAY_THRESHOLD: u8 = 50;

/// Result of feeding one frame into the fusion engine.
///
/// `rolling_average` is windowed while `reasons` describe the current frame
/// only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Instantaneous score of the current frame, in [0, 100].
    pub frame_score: u8,
    /// Mean of the scores in the window, truncated, in [0, 100].
    pub rolling_average: u8,
    /// Human-readable reasons for the current frame, in evaluation order.
    pub reasons: Vec<String>,
}

impl RiskAssessment {
    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.rolling_average)
    }

    pub fn is_high_risk(&self) -> bool {
        self.rolling_average >= HIGH_RISK_THRESHOLD
    }

    /// Snapshot stored with a recorded violation.
    pub fn snapshot(&self) -> RiskSnapshot {
        RiskSnapshot {
            probability: self.rolling_average,
            reasons: self.reasons.clone(),
        }
    }
}

/// Coarse banding of a probability for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Elevated,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: u8) -> Self {
        match probability {
            0..=29 => Self::Low,
            30..=59 => Self::Elevated,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Elevated => "elevated",
            Self::High => "high",
        }
    }
}

/// Risk context captured at the moment a violation is recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub probability: u8,
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bands() {
        assert_eq!(RiskLevel::from_probability(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(30), RiskLevel::Elevated);
        assert_eq!(RiskLevel::from_probability(59), RiskLevel::Elevated);
        assert_eq!(RiskLevel::from_probability(60), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(100), RiskLevel::High);
    }

    #[test]
    fn snapshot_carries_windowed_probability() {
        let assessment = RiskAssessment {
            frame_score: 90,
            rolling_average: 71,
            reasons: vec!["Face not visible".into()],
        };
        assert!(assessment.is_high_risk());
        let snapshot = assessment.snapshot();
        assert_eq!(snapshot.probability, 71);
        assert_eq!(snapshot.reasons, vec!["Face not visible".to_string()]);
    }
}
