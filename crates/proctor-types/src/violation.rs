//! Violation taxonomy and recorded violation events.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;
use crate::risk::RiskSnapshot;

/// Alert-worthy violation kinds.
///
/// Each kind carries two independent weights: a risk weight consumed by the
/// fusion engine and a severity weight consumed only by report statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    #[serde(rename = "FACE_DISAPPEARED", alias = "face_disappeared")]
    FaceDisappeared,
    #[serde(rename = "MULTIPLE_FACES", alias = "multiple_faces")]
    MultipleFaces,
    #[serde(rename = "OBJECT_DETECTED", alias = "object_detected")]
    ObjectDetected,
    #[serde(rename = "MOUTH_MOVING", alias = "mouth_moving")]
    MouthMoving,
    #[serde(rename = "GAZE_AWAY", alias = "gaze_away")]
    GazeAway,
    #[serde(rename = "AUDIO_DETECTED", alias = "audio_detected")]
    AudioDetected,
}

impl ViolationType {
    pub const ALL: [ViolationType; 6] = [
        Self::FaceDisappeared,
        Self::MultipleFaces,
        Self::ObjectDetected,
        Self::MouthMoving,
        Self::GazeAway,
        Self::AudioDetected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FaceDisappeared => "FACE_DISAPPEARED",
            Self::MultipleFaces => "MULTIPLE_FACES",
            Self::ObjectDetected => "OBJECT_DETECTED",
            Self::MouthMoving => "MOUTH_MOVING",
            Self::GazeAway => "GAZE_AWAY",
            Self::AudioDetected => "AUDIO_DETECTED",
        }
    }

    /// Default additive weight in the frame risk score.
    pub fn default_risk_weight(&self) -> u32 {
        match self {
            Self::FaceDisappeared => 40,
            Self::MultipleFaces => 50,
            Self::ObjectDetected => 45,
            Self::MouthMoving => 20,
            Self::GazeAway => 15,
            Self::AudioDetected => 0,
        }
    }

    /// Default severity used by report statistics.
    pub fn default_severity(&self) -> u32 {
        match self {
            Self::FaceDisappeared => 1,
            Self::GazeAway => 2,
            Self::MouthMoving => 3,
            Self::MultipleFaces => 4,
            Self::ObjectDetected => 5,
            Self::AudioDetected => 3,
        }
    }

    /// Spoken message for an alert of this kind.
    pub fn alert_message(&self) -> &'static str {
        match self {
            Self::FaceDisappeared => "Please look at the screen",
            Self::MultipleFaces => "We detected multiple people",
            Self::ObjectDetected => "Unauthorized object detected",
            Self::MouthMoving => "Please maintain silence during exam",
            Self::GazeAway => "Please focus on your screen",
            Self::AudioDetected => "We detected voice. Please maintain silence during the exam",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypeError::UnknownViolationType(s.to_string()))
    }
}

/// A violation as handed to the recorder.
///
/// Owned by the recorder once appended; the pipeline never mutates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViolationEvent {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    pub timestamp: DateTime<Utc>,
    pub risk_snapshot: RiskSnapshot,
}

impl ViolationEvent {
    pub fn new(
        violation_type: ViolationType,
        timestamp: DateTime<Utc>,
        risk_snapshot: RiskSnapshot,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            violation_type,
            timestamp,
            risk_snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for ty in ViolationType::ALL {
            assert_eq!(ty.as_str().parse::<ViolationType>().unwrap(), ty);
        }
        assert_eq!(
            "mouth_moving".parse::<ViolationType>().unwrap(),
            ViolationType::MouthMoving
        );
    }

    #[test]
    fn serde_uses_screaming_names() {
        let json = serde_json::to_string(&ViolationType::ObjectDetected).unwrap();
        assert_eq!(json, "\"OBJECT_DETECTED\"");

        let parsed: ViolationType = serde_json::from_str("\"gaze_away\"").unwrap();
        assert_eq!(parsed, ViolationType::GazeAway);
    }

    #[test]
    fn risk_and_severity_weights_are_independent() {
        assert_eq!(ViolationType::FaceDisappeared.default_risk_weight(), 40);
        assert_eq!(ViolationType::FaceDisappeared.default_severity(), 1);
        assert_eq!(ViolationType::ObjectDetected.default_risk_weight(), 45);
        assert_eq!(ViolationType::ObjectDetected.default_severity(), 5);
    }

    #[test]
    fn event_serializes_type_field() {
        let event = ViolationEvent::new(
            ViolationType::MultipleFaces,
            Utc::now(),
            RiskSnapshot {
                probability: 50,
                reasons: vec!["Multiple faces detected".into()],
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "MULTIPLE_FACES");
        assert_eq!(value["risk_snapshot"]["probability"], 50);
    }
}
