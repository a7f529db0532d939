//! Recording subsystems that run alongside the frame loop.
//!
//! A subsystem is started before the loop and must be stopped on every exit
//! path. [`CaptureGuard`] stops it on `finish` or, failing that, on drop.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::{CaptureConfig, CaptureSpec};
use crate::error::{SessionError, SessionResult};

/// A start/stop recording subsystem.
pub trait CaptureSubsystem: Send {
    fn name(&self) -> &str;

    fn start(&mut self) -> SessionResult<()>;

    /// Stop recording and return the saved file, if any.
    fn stop(&mut self) -> SessionResult<Option<PathBuf>>;
}

/// Keeps a started subsystem running until finished or dropped.
pub struct CaptureGuard {
    subsystem: Box<dyn CaptureSubsystem>,
    active: bool,
}

impl CaptureGuard {
    pub fn start(mut subsystem: Box<dyn CaptureSubsystem>) -> SessionResult<Self> {
        subsystem.start()?;
        info!(capture = subsystem.name(), "Capture started");
        Ok(Self {
            subsystem,
            active: true,
        })
    }

    pub fn name(&self) -> &str {
        self.subsystem.name()
    }

    /// Stop the subsystem and return the saved recording.
    pub fn finish(mut self) -> SessionResult<Option<PathBuf>> {
        self.active = false;
        let saved = self.subsystem.stop()?;
        info!(capture = self.subsystem.name(), saved = ?saved, "Capture stopped");
        Ok(saved)
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(e) = self.subsystem.stop() {
            warn!(capture = self.subsystem.name(), error = %e, "Capture stop failed");
        }
    }
}

/// Drives an external recorder process, e.g. ffmpeg.
///
/// Invoked as `<program> <args..> <output>`. Stopping writes the spec's
/// `stop_input` to the recorder's stdin and closes it, then waits up to
/// `stop_timeout_ms` for the recorder to finalize its file before killing it.
pub struct CommandCapture {
    name: String,
    spec: CaptureSpec,
    child: Option<Child>,
}

impl CommandCapture {
    pub fn new(name: impl Into<String>, spec: CaptureSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            child: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }
}

impl CaptureSubsystem for CommandCapture {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> SessionResult<()> {
        if self.child.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.spec.output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let child = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .arg(&self.spec.output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SessionError::Capture(format!("{}: {}: {}", self.name, self.spec.program, e)))?;
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) -> SessionResult<Option<PathBuf>> {
        let Some(mut child) = self.child.take() else {
            return Ok(None);
        };

        if let Some(mut stdin) = child.stdin.take() {
            // A recorder that already exited gives a broken pipe here.
            let _ = stdin.write_all(self.spec.stop_input.as_bytes());
        }

        let timeout = Duration::from_millis(self.spec.stop_timeout_ms);
        match wait_timeout(&mut child, timeout)? {
            Some(status) => {
                info!(capture = %self.name, status = %status, "Recorder exited");
            }
            None => {
                warn!(capture = %self.name, timeout_ms = self.spec.stop_timeout_ms, "Recorder did not stop, killing it");
                child.kill()?;
                child.wait()?;
            }
        }
        Ok(self.spec.output.exists().then(|| self.spec.output.clone()))
    }
}

/// Poll `child` until it exits or `timeout` elapses.
fn wait_timeout(child: &mut Child, timeout: Duration) -> SessionResult<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Start every configured recorder. Already started guards are stopped
/// again if a later one fails.
pub fn start_captures(config: &CaptureConfig) -> SessionResult<Vec<CaptureGuard>> {
    let mut guards = Vec::new();
    for (name, spec) in [("video", &config.video), ("screen", &config.screen)] {
        if let Some(spec) = spec {
            guards.push(CaptureGuard::start(Box::new(CommandCapture::new(name, spec.clone())))?);
        }
    }
    Ok(guards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counters {
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    struct Fake(Arc<Counters>);

    impl CaptureSubsystem for Fake {
        fn name(&self) -> &str {
            "fake"
        }

        fn start(&mut self) -> SessionResult<()> {
            self.0.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) -> SessionResult<Option<PathBuf>> {
            self.0.stops.fetch_add(1, Ordering::SeqCst);
            Ok(Some(PathBuf::from("fake.mp4")))
        }
    }

    #[test]
    fn finish_stops_once() {
        let counters = Arc::new(Counters::default());
        let guard = CaptureGuard::start(Box::new(Fake(Arc::clone(&counters)))).unwrap();
        assert_eq!(guard.finish().unwrap(), Some(PathBuf::from("fake.mp4")));
        assert_eq!(counters.starts.load(Ordering::SeqCst), 1);
        assert_eq!(counters.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_stops_unfinished_capture() {
        let counters = Arc::new(Counters::default());
        {
            let _guard = CaptureGuard::start(Box::new(Fake(Arc::clone(&counters)))).unwrap();
        }
        assert_eq!(counters.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_stops_on_panic_unwind() {
        let counters = Arc::new(Counters::default());
        let inner = Arc::clone(&counters);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = CaptureGuard::start(Box::new(Fake(inner))).unwrap();
            panic!("frame loop crashed");
        }));
        assert!(result.is_err());
        assert_eq!(counters.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_recorder_program_fails_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CaptureSpec::new("definitely-not-a-recorder-xyz", dir.path().join("video.mp4"));
        let mut capture = CommandCapture::new("video", spec);
        assert!(matches!(capture.start(), Err(SessionError::Capture(_))));
        assert!(!capture.is_running());
        assert_eq!(capture.stop().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn stop_lets_recorder_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("rec/video.mp4");
        // Waits for the stop request on stdin, then writes its output.
        let spec = CaptureSpec::new("sh", &output)
            .with_args(["-c", r#"read cmd; echo "finalized $cmd" > "$0""#]);
        let mut capture = CommandCapture::new("video", spec);

        capture.start().unwrap();
        assert!(capture.is_running());
        assert_eq!(capture.stop().unwrap(), Some(output.clone()));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "finalized q\n");
        assert!(!capture.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn unresponsive_recorder_is_killed_after_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CaptureSpec::new("sh", dir.path().join("video.mp4"))
            .with_args(["-c", "exec sleep 30"])
            .with_stop_timeout_ms(100);
        let mut capture = CommandCapture::new("video", spec);

        capture.start().unwrap();
        let started = Instant::now();
        assert_eq!(capture.stop().unwrap(), None);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn no_configured_captures() {
        assert!(start_captures(&CaptureConfig::default()).unwrap().is_empty());
    }
}
