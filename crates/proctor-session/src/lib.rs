//! # proctor-session
//!
//! Runtime for one proctoring session: turns a stream of detector signals
//! into risk assessments, alerts, recorded violations and a final report.
//!
//! ## Components
//!
//! - **SessionConfig**: layered configuration (defaults, file, `PROCTOR__*`
//!   environment)
//! - **SignalSource**: per-frame detection contract, implemented by
//!   [`DetectorSuite`] over five detector capabilities and by
//!   [`ReplaySource`] for recorded traces
//! - **ViolationRecorder**: in-memory and JSON-lines violation storage
//! - **EventLog**: high-risk event log
//! - **CaptureGuard**: start/stop lifecycle of recording subsystems
//! - **Overlay**: proctor-facing per-frame status
//! - **ProctorSession**: the frame loop
//!
//! ## Per-frame flow
//!
//! ```text
//! signals → fusion engine → high-risk event log
//!         → classifier → alert dispatch + recorder → overlay
//! ```
//!
//! At the end of the session the recorder's history is handed to the
//! report generator.

pub mod capture;
pub mod clock;
pub mod config;
pub mod detection;
pub mod error;
pub mod event_log;
pub mod overlay;
pub mod recorder;
pub mod session;

pub use capture::{start_captures, CaptureGuard, CaptureSubsystem, CommandCapture};
pub use clock::{FrameClock, FrameStats};
pub use config::{CaptureConfig, CaptureSpec, LoggingConfig, SessionConfig, StorageConfig};
pub use detection::{
    DetectorSuite, Detector, Detectors, FaceDetector, FrameSource, GazeTracker, IterSource,
    MouthMonitor, MultiFaceDetector, ObjectDetector, ReplaySource, SignalSource,
};
pub use error::{SessionError, SessionResult};
pub use event_log::{EventLog, LoggedEvent, HIGH_CHEATING_PROBABILITY};
pub use overlay::{LogOverlay, Overlay, OverlayFrame};
pub use recorder::{JsonlRecorder, MemoryRecorder, ViolationRecorder};
pub use session::{FrameOutcome, ProctorSession, SessionEnd, SessionSummary};
