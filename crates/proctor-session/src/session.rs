//! The per-frame pipeline and session lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use proctor_alert::{AlertDispatcher, DispatchOutcome};
use proctor_report::{ReportGenerator, ReportOutcome, StudentInfo};
use proctor_risk::{classify, RiskFusionEngine};
use proctor_types::{FrameSignals, RiskAssessment, ViolationEvent, ViolationType};
use tracing::{error, info, warn};

use crate::clock::{FrameClock, FrameStats};
use crate::config::SessionConfig;
use crate::detection::SignalSource;
use crate::error::{SessionError, SessionResult};
use crate::event_log::EventLog;
use crate::overlay::{LogOverlay, Overlay, OverlayFrame};
use crate::recorder::ViolationRecorder;

/// Result of processing one frame.
#[derive(Clone, Debug)]
pub struct FrameOutcome {
    pub assessment: RiskAssessment,
    pub violation: Option<ViolationType>,
    pub dispatch: Option<DispatchOutcome>,
    pub recorded: Option<ViolationEvent>,
    pub high_risk_logged: bool,
}

/// Why the frame loop ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The signal source had no more frames.
    SourceExhausted,
    /// The stop flag was raised.
    Stopped,
    /// Signal acquisition failed; not retried.
    SourceFailed(String),
}

/// Counters for a finished frame loop.
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub end: SessionEnd,
    pub frames: u64,
    pub violations_recorded: u64,
    pub alerts_emitted: u64,
    pub high_risk_events: u64,
    pub frame_stats: FrameStats,
    pub last_assessment: Option<RiskAssessment>,
}

/// One proctoring session.
///
/// Owns the fusion engine and the alert dispatcher, so a session's window
/// and cooldowns are never shared with another session.
pub struct ProctorSession<S> {
    source: S,
    engine: RiskFusionEngine,
    dispatcher: AlertDispatcher,
    recorder: Arc<dyn ViolationRecorder>,
    event_log: Arc<EventLog>,
    overlay: Box<dyn Overlay>,
    clock: FrameClock,
    frames: u64,
    violations_recorded: u64,
    high_risk_events: u64,
    last_assessment: Option<RiskAssessment>,
}

impl<S: SignalSource> ProctorSession<S> {
    pub fn new(
        config: &SessionConfig,
        source: S,
        dispatcher: AlertDispatcher,
        recorder: Arc<dyn ViolationRecorder>,
        event_log: Arc<EventLog>,
    ) -> SessionResult<Self> {
        let engine = RiskFusionEngine::new(config.fusion.clone())
            .map_err(|e| SessionError::Config(e.to_string()))?;
        Ok(Self {
            source,
            engine,
            dispatcher,
            recorder,
            event_log,
            overlay: Box::new(LogOverlay),
            clock: FrameClock::new(config.capture.fps, config.capture.pace),
            frames: 0,
            violations_recorded: 0,
            high_risk_events: 0,
            last_assessment: None,
        })
    }

    pub fn with_overlay(mut self, overlay: Box<dyn Overlay>) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn engine(&self) -> &RiskFusionEngine {
        &self.engine
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    /// Run the pipeline for one frame.
    ///
    /// Recorder and event log failures are logged and the frame continues.
    pub fn process_frame(&mut self, signals: &FrameSignals) -> FrameOutcome {
        self.frames += 1;
        let assessment = self.engine.update(signals);

        let high_risk_logged = assessment.is_high_risk()
            && match self.event_log.log_high_risk(&assessment, signals.timestamp) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Failed to log high-risk event");
                    false
                }
            };
        if high_risk_logged {
            self.high_risk_events += 1;
        }

        let violation = classify(signals);
        let mut dispatch = None;
        let mut recorded = None;

        if let Some(ty) = violation {
            dispatch = Some(self.dispatcher.dispatch(ty));
            match self.recorder.record(ty, signals.timestamp, assessment.snapshot()) {
                Ok(event) => {
                    self.violations_recorded += 1;
                    recorded = Some(event);
                }
                Err(e) => warn!(violation = %ty, error = %e, "Failed to record violation"),
            }
        }

        self.overlay.render(&OverlayFrame::build(signals, &assessment));
        self.last_assessment = Some(assessment.clone());

        FrameOutcome {
            assessment,
            violation,
            dispatch,
            recorded,
            high_risk_logged,
        }
    }

    /// Run frames until the source ends, fails, or `stop` is raised.
    pub fn run(&mut self, stop: &AtomicBool) -> SessionSummary {
        info!("Proctoring session started");
        let end = loop {
            if stop.load(Ordering::SeqCst) {
                break SessionEnd::Stopped;
            }

            self.clock.begin_frame();
            let signals = match self.source.next_signals() {
                Ok(Some(signals)) => signals,
                Ok(None) => break SessionEnd::SourceExhausted,
                Err(e) => {
                    error!(error = %e, "Signal acquisition failed, ending session");
                    break SessionEnd::SourceFailed(e.to_string());
                }
            };
            self.process_frame(&signals);
            self.clock.end_frame();
        };

        let summary = self.summary(end);
        info!(
            end = ?summary.end,
            frames = summary.frames,
            violations = summary.violations_recorded,
            alerts = summary.alerts_emitted,
            deadline_misses = summary.frame_stats.deadline_misses,
            "Proctoring session ended"
        );
        summary
    }

    pub fn summary(&self, end: SessionEnd) -> SessionSummary {
        SessionSummary {
            end,
            frames: self.frames,
            violations_recorded: self.violations_recorded,
            alerts_emitted: self.dispatcher.emitted_count(),
            high_risk_events: self.high_risk_events,
            frame_stats: self.clock.stats(),
            last_assessment: self.last_assessment.clone(),
        }
    }

    /// Query the full violation history and produce the report.
    pub fn finish(self, generator: &ReportGenerator, student: &StudentInfo) -> ReportOutcome {
        match self.recorder.get_all() {
            Ok(violations) => generator.generate(student, &violations),
            Err(e) => {
                error!(error = %e, "Could not read violation history");
                ReportOutcome::Absent {
                    reason: format!("violation history unavailable: {e}"),
                }
            }
        }
    }
}
