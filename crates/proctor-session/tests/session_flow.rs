//! End-to-end session tests: signals in, recorded violations and a report out.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use proctor_alert::{
    AlertConfig, AlertDispatcher, AlertResult, AudioOutput, AudioPipeline, DispatchOutcome,
    SpeechArtifact, SpeechSynthesizer,
};
use proctor_report::{ReportConfig, ReportFormat, ReportGenerator, ReportOutcome, StudentInfo};
use proctor_session::{
    EventLog, IterSource, JsonlRecorder, MemoryRecorder, ProctorSession, ReplaySource,
    SessionConfig, SessionEnd, SessionError, SessionResult, SignalSource, ViolationRecorder,
    HIGH_CHEATING_PROBABILITY,
};
use proctor_types::{FrameSignals, GazeDirection, ViolationType};

fn config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.capture.pace = false;
    config.alerts = AlertConfig {
        enabled: false,
        ..AlertConfig::default()
    };
    config
}

fn dispatcher(config: &SessionConfig) -> AlertDispatcher {
    AlertDispatcher::from_config(&config.alerts).unwrap()
}

/// A short exam: attentive, talking, a second person, then the face leaves.
fn script() -> Vec<FrameSignals> {
    let start = Utc::now();
    let at = |ms: i64| start + Duration::milliseconds(ms);
    vec![
        FrameSignals::attentive(at(0)),
        FrameSignals {
            gaze_direction: GazeDirection::Left,
            ..FrameSignals::attentive(at(33))
        },
        FrameSignals {
            mouth_moving: true,
            ..FrameSignals::attentive(at(66))
        },
        FrameSignals {
            multiple_faces: true,
            objects_detected: true,
            ..FrameSignals::attentive(at(100))
        },
        FrameSignals {
            face_present: false,
            multiple_faces: true,
            ..FrameSignals::attentive(at(133))
        },
    ]
}

#[test]
fn scripted_session_produces_html_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let recorder = Arc::new(MemoryRecorder::new());
    let event_log = Arc::new(EventLog::open(dir.path().join("events.jsonl")).unwrap());

    let mut session = ProctorSession::new(
        &config,
        IterSource::new(script()),
        dispatcher(&config),
        recorder.clone(),
        event_log.clone(),
    )
    .unwrap();

    let summary = session.run(&AtomicBool::new(false));
    assert_eq!(summary.end, SessionEnd::SourceExhausted);
    assert_eq!(summary.frames, 5);
    assert_eq!(summary.violations_recorded, 3);
    assert_eq!(summary.alerts_emitted, 0);

    let kinds: Vec<_> = recorder
        .get_all()
        .unwrap()
        .into_iter()
        .map(|e| e.violation_type)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ViolationType::MouthMoving,
            ViolationType::MultipleFaces,
            ViolationType::FaceDisappeared,
        ]
    );

    // Window: 0, 15, 20, 95, 90 -> the last two frames average 32 and 44,
    // so nothing reaches the high-risk threshold.
    assert_eq!(summary.high_risk_events, 0);
    assert!(event_log.read_all().unwrap().is_empty());
    assert_eq!(summary.last_assessment.unwrap().rolling_average, 44);

    let generator = ReportGenerator::new(
        ReportConfig::default()
            .with_output_dir(dir.path().join("reports"))
            .with_format(ReportFormat::Html),
    );
    let student = StudentInfo {
        id: "S-100".into(),
        ..StudentInfo::default()
    };
    let outcome = session.finish(&generator, &student);
    let ReportOutcome::Simple { path, rich_failure: None } = &outcome else {
        panic!("expected a simple report, got {outcome:?}");
    };
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("<tr><th>Total violations</th><td>3</td></tr>"));
    // Severities 3 + 4 + 1.
    assert!(html.contains("<tr><th>Severity score</th><td>8</td></tr>"));
}

#[test]
fn sustained_risk_is_logged_as_event() {
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let event_log = Arc::new(EventLog::open(dir.path().join("events.jsonl")).unwrap());

    let crowded = FrameSignals {
        face_present: false,
        multiple_faces: true,
        objects_detected: true,
        ..FrameSignals::attentive(Utc::now())
    };
    let mut session = ProctorSession::new(
        &config,
        IterSource::new(vec![crowded.clone(), crowded]),
        dispatcher(&config),
        Arc::new(MemoryRecorder::new()),
        event_log.clone(),
    )
    .unwrap();

    let summary = session.run(&AtomicBool::new(false));
    assert_eq!(summary.high_risk_events, 2);

    let events = event_log.read_all().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, HIGH_CHEATING_PROBABILITY);
    assert_eq!(events[0].details["probability"], 100);
    assert_eq!(events[0].details["reasons"][0], "Face not visible");
}

#[test]
fn replayed_trace_with_persistent_recorder() {
    let dir = tempfile::tempdir().unwrap();
    let trace_path = dir.path().join("signals.jsonl");
    let mut trace = std::fs::File::create(&trace_path).unwrap();
    for signals in script() {
        writeln!(trace, "{}", serde_json::to_string(&signals).unwrap()).unwrap();
    }
    drop(trace);

    let config = config();
    let violations_path = dir.path().join("data/violations.jsonl");
    // Left behind by another candidate's session.
    std::fs::create_dir_all(violations_path.parent().unwrap()).unwrap();
    JsonlRecorder::open(&violations_path)
        .unwrap()
        .record(ViolationType::ObjectDetected, Utc::now(), Default::default())
        .unwrap();

    let (recorder, rotated) = JsonlRecorder::create(&violations_path).unwrap();
    assert!(rotated.is_some());
    let recorder = Arc::new(recorder);
    let mut session = ProctorSession::new(
        &config,
        ReplaySource::open(&trace_path).unwrap(),
        dispatcher(&config),
        recorder,
        Arc::new(EventLog::disabled()),
    )
    .unwrap();

    let summary = session.run(&AtomicBool::new(false));
    assert_eq!(summary.violations_recorded, 3);

    // A fresh reader over the same file sees this session's history only.
    let reloaded = JsonlRecorder::open(&violations_path).unwrap().get_all().unwrap();
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded[2].violation_type, ViolationType::FaceDisappeared);
    assert_eq!(reloaded[2].risk_snapshot.probability, 44);
}

struct FailingSource {
    served: usize,
}

impl SignalSource for FailingSource {
    fn next_signals(&mut self) -> SessionResult<Option<FrameSignals>> {
        if self.served == 2 {
            return Err(SessionError::SignalAcquisition("camera disconnected".into()));
        }
        self.served += 1;
        Ok(Some(FrameSignals {
            objects_detected: true,
            ..FrameSignals::attentive(Utc::now())
        }))
    }
}

#[test]
fn source_failure_ends_session_and_still_reports() {
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let recorder = Arc::new(MemoryRecorder::new());
    let mut session = ProctorSession::new(
        &config,
        FailingSource { served: 0 },
        dispatcher(&config),
        recorder.clone(),
        Arc::new(EventLog::disabled()),
    )
    .unwrap();

    let summary = session.run(&AtomicBool::new(false));
    assert!(matches!(summary.end, SessionEnd::SourceFailed(ref msg) if msg.contains("camera")));
    assert_eq!(summary.frames, 2);
    assert_eq!(recorder.len(), 2);

    let generator = ReportGenerator::new(
        ReportConfig::default()
            .with_output_dir(dir.path())
            .with_format(ReportFormat::Html)
            .with_charts(false),
    );
    let outcome = session.finish(&generator, &StudentInfo::default());
    assert!(outcome.path().is_some());
}

struct SilentSynth;

#[async_trait]
impl SpeechSynthesizer for SilentSynth {
    async fn synthesize(&self, _text: &str) -> AlertResult<SpeechArtifact> {
        SpeechArtifact::create(".wav")
    }
}

struct CountingOutput(Arc<AtomicUsize>);

#[async_trait]
impl AudioOutput for CountingOutput {
    async fn play(&self, _clip: &SpeechArtifact) -> AlertResult<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn alerts_respect_cooldown_across_frames() {
    let config = config();
    let plays = Arc::new(AtomicUsize::new(0));
    let pipeline = AudioPipeline::new(
        Arc::new(SilentSynth),
        Arc::new(CountingOutput(Arc::clone(&plays))),
    );
    let dispatcher = AlertDispatcher::new(&AlertConfig::default(), Ok(pipeline)).unwrap();
    assert!(!dispatcher.is_degraded());

    let talking = || FrameSignals {
        mouth_moving: true,
        ..FrameSignals::attentive(Utc::now())
    };
    let mut session = ProctorSession::new(
        &config,
        IterSource::new((0..10).map(|_| talking()).collect::<Vec<_>>()),
        dispatcher,
        Arc::new(MemoryRecorder::new()),
        Arc::new(EventLog::disabled()),
    )
    .unwrap();

    // Paused time: the whole burst falls inside one cooldown.
    let summary = session.run(&AtomicBool::new(false));
    assert_eq!(summary.violations_recorded, 10);
    assert_eq!(summary.alerts_emitted, 1);

    tokio::time::advance(std::time::Duration::from_secs(6)).await;
    let outcome = session.process_frame(&talking());
    assert_eq!(outcome.dispatch, Some(DispatchOutcome::Emitted));
    assert_eq!(session.dispatcher().emitted_count(), 2);

    for _ in 0..100 {
        if plays.load(Ordering::SeqCst) == 2 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(plays.load(Ordering::SeqCst), 2);
}
