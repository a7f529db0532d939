//! Per-frame detector output.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Eye openness ratio above which the eyes are reported as open.
pub const EYE_OPEN_THRESHOLD: f64 = 0.25;

/// Where the candidate is looking, as reported by the gaze tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GazeDirection {
    #[default]
    Center,
    Left,
    Right,
    Up,
    Down,
}

impl GazeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "Center",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Up => "Up",
            Self::Down => "Down",
        }
    }

    /// Any direction other than `Center` counts as looking away.
    pub fn is_away(&self) -> bool {
        !matches!(self, Self::Center)
    }
}

impl fmt::Display for GazeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GazeDirection {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "center" => Ok(Self::Center),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(TypeError::UnknownGazeDirection(s.to_string())),
        }
    }
}

/// All detector signals for one frame.
///
/// Built fresh every frame and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSignals {
    pub face_present: bool,
    pub gaze_direction: GazeDirection,
    pub eye_openness_ratio: f64,
    pub mouth_moving: bool,
    pub multiple_faces: bool,
    pub objects_detected: bool,
    pub timestamp: DateTime<Utc>,
}

impl FrameSignals {
    /// Signals of a candidate sitting still and looking at the screen.
    pub fn attentive(timestamp: DateTime<Utc>) -> Self {
        Self {
            face_present: true,
            gaze_direction: GazeDirection::Center,
            eye_openness_ratio: 0.3,
            mouth_moving: false,
            multiple_faces: false,
            objects_detected: false,
            timestamp,
        }
    }

    pub fn eyes_open(&self) -> bool {
        self.eye_openness_ratio > EYE_OPEN_THRESHOLD
    }
}
