//! Detection contracts.
//!
//! The frame loop only sees a [`SignalSource`]. Two implementations are
//! provided: [`DetectorSuite`], which runs five capability detectors over
//! frames from a [`FrameSource`], and [`ReplaySource`], which replays a
//! recorded JSON-lines signal trace.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use proctor_types::{FrameSignals, GazeDirection};
use tracing::debug;

use crate::error::{SessionError, SessionResult};
use crate::event_log::EventLog;

/// Produces one [`FrameSignals`] per frame.
pub trait SignalSource: Send {
    /// `Ok(None)` when the source is exhausted.
    fn next_signals(&mut self) -> SessionResult<Option<FrameSignals>>;
}

/// Any iterator of signals is a source; handy for scripted sessions.
pub struct IterSource<I>(I);

impl<I> IterSource<I>
where
    I: Iterator<Item = FrameSignals> + Send,
{
    pub fn new(signals: impl IntoIterator<IntoIter = I>) -> Self {
        Self(signals.into_iter())
    }
}

impl<I> SignalSource for IterSource<I>
where
    I: Iterator<Item = FrameSignals> + Send,
{
    fn next_signals(&mut self) -> SessionResult<Option<FrameSignals>> {
        Ok(self.0.next())
    }
}

// ── Detectors ───────────────────────────────────────────────────────

/// Produces raw frames for the detectors.
pub trait FrameSource: Send {
    type Frame;

    /// `Ok(None)` when no more frames are available.
    fn next_frame(&mut self) -> SessionResult<Option<Self::Frame>>;
}

/// Common detector behaviour.
pub trait Detector: Send {
    fn name(&self) -> &str;

    /// Give the detector a place to report its own events. Detectors that
    /// log nothing keep the default.
    fn attach_event_log(&mut self, _log: Arc<EventLog>) {}
}

pub trait FaceDetector<F>: Detector {
    fn detect_face(&mut self, frame: &F) -> SessionResult<bool>;
}

pub trait GazeTracker<F>: Detector {
    /// Gaze direction and eye openness ratio.
    fn track_eyes(&mut self, frame: &F) -> SessionResult<(GazeDirection, f64)>;
}

pub trait MouthMonitor<F>: Detector {
    fn monitor_mouth(&mut self, frame: &F) -> SessionResult<bool>;
}

pub trait MultiFaceDetector<F>: Detector {
    fn detect_multiple_faces(&mut self, frame: &F) -> SessionResult<bool>;
}

pub trait ObjectDetector<F>: Detector {
    fn detect_objects(&mut self, frame: &F) -> SessionResult<bool>;
}

/// The five detectors of a session.
pub struct Detectors<F> {
    pub face: Box<dyn FaceDetector<F>>,
    pub gaze: Box<dyn GazeTracker<F>>,
    pub mouth: Box<dyn MouthMonitor<F>>,
    pub multi_face: Box<dyn MultiFaceDetector<F>>,
    pub objects: Box<dyn ObjectDetector<F>>,
}

/// Runs every detector over each frame of a [`FrameSource`].
pub struct DetectorSuite<S: FrameSource> {
    source: S,
    detectors: Detectors<S::Frame>,
}

impl<S: FrameSource> DetectorSuite<S> {
    /// Build the suite and attach `event_log` to every detector.
    pub fn new(source: S, mut detectors: Detectors<S::Frame>, event_log: Arc<EventLog>) -> Self {
        detectors.face.attach_event_log(Arc::clone(&event_log));
        detectors.gaze.attach_event_log(Arc::clone(&event_log));
        detectors.mouth.attach_event_log(Arc::clone(&event_log));
        detectors.multi_face.attach_event_log(Arc::clone(&event_log));
        detectors.objects.attach_event_log(event_log);
        debug!(
            face = detectors.face.name(),
            gaze = detectors.gaze.name(),
            mouth = detectors.mouth.name(),
            multi_face = detectors.multi_face.name(),
            objects = detectors.objects.name(),
            "Detector suite ready"
        );
        Self { source, detectors }
    }
}

impl<S: FrameSource> SignalSource for DetectorSuite<S> {
    fn next_signals(&mut self) -> SessionResult<Option<FrameSignals>> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(None);
        };
        let timestamp = Utc::now();
        let d = &mut self.detectors;

        let face_present = d.face.detect_face(&frame)?;
        let (gaze_direction, eye_openness_ratio) = d.gaze.track_eyes(&frame)?;
        let mouth_moving = d.mouth.monitor_mouth(&frame)?;
        let multiple_faces = d.multi_face.detect_multiple_faces(&frame)?;
        let objects_detected = d.objects.detect_objects(&frame)?;

        Ok(Some(FrameSignals {
            face_present,
            gaze_direction,
            eye_openness_ratio,
            mouth_moving,
            multiple_faces,
            objects_detected,
            timestamp,
        }))
    }
}

// ── Replay ──────────────────────────────────────────────────────────

/// Replays a JSON-lines trace of [`FrameSignals`], one object per line.
pub struct ReplaySource {
    reader: Box<dyn BufRead + Send>,
    line: usize,
}

impl ReplaySource {
    pub fn open(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SessionError::SignalAcquisition(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }

    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            line: 0,
        }
    }
}

impl SignalSource for ReplaySource {
    fn next_signals(&mut self) -> SessionResult<Option<FrameSignals>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            self.line += 1;
            let read = self
                .reader
                .read_line(&mut buf)
                .map_err(|e| SessionError::SignalAcquisition(format!("line {}: {}", self.line, e)))?;
            if read == 0 {
                return Ok(None);
            }
            if buf.trim().is_empty() {
                continue;
            }
            return serde_json::from_str(buf.trim())
                .map(Some)
                .map_err(|e| SessionError::SignalAcquisition(format!("line {}: {}", self.line, e)));
        }
    }
}
