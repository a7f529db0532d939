//! Single-label violation classifier.

use proctor_types::{FrameSignals, ViolationType};

/// Derive at most one violation from a frame's signals.
///
/// Precedence is fixed: face disappeared, then multiple faces, then object
/// detected, then mouth moving. When several conditions hold only the
/// highest-precedence one is reported. Gaze direction raises risk but is
/// never classified on its own.
pub fn classify(signals: &FrameSignals) -> Option<ViolationType> {
    if !signals.face_present {
        Some(ViolationType::FaceDisappeared)
    } else if signals.multiple_faces {
        Some(ViolationType::MultipleFaces)
    } else if signals.objects_detected {
        Some(ViolationType::ObjectDetected)
    } else if signals.mouth_moving {
        Some(ViolationType::MouthMoving)
    } else {
        None
    }
}
