//! # proctor-types
//!
//! Shared data model for the exam proctoring pipeline.
//!
//! ## Overview
//!
//! - [`FrameSignals`]: one frame's worth of detector output
//! - [`RiskAssessment`]: frame score, windowed probability and reasons
//! - [`ViolationType`]: the fixed set of alert-worthy violations, with their
//!   default risk weights, severity weights and alert messages
//! - [`ViolationEvent`]: a recorded violation with its risk snapshot
//! - [`WeightTable`]: per-violation weights used for risk scoring and for
//!   report severity

pub mod error;
pub mod risk;
pub mod signals;
pub mod violation;
pub mod weights;

pub use error::{TypeError, TypeResult};
pub use risk::{RiskAssessment, RiskLevel, RiskSnapshot, HIGH_RISK_THRESHOLD, REASON_DISPLAY_THRESHOLD};
pub use signals::{FrameSignals, GazeDirection, EYE_OPEN_THRESHOLD};
pub use violation::{ViolationEvent, ViolationType};
pub use weights::WeightTable;
