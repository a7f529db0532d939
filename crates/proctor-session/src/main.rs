//! Proctor - exam session monitor
//!
//! Replays a detector signal trace through the proctoring pipeline:
//! - windowed cheating-risk estimation with per-frame reasons
//! - cooldown-limited audio alerts
//! - violation recording and high-risk event logging
//! - an end-of-session report

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use proctor_alert::AlertDispatcher;
use proctor_report::{ReportGenerator, ReportOutcome};
use proctor_session::{
    start_captures, EventLog, JsonlRecorder, MemoryRecorder, ProctorSession, ReplaySource,
    SessionConfig, ViolationRecorder,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Proctor CLI
#[derive(Parser)]
#[command(name = "proctor")]
#[command(about = "Proctor - exam session monitoring and violation reporting", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PROCTOR_CONFIG")]
    config: Option<String>,

    /// JSON-lines trace of frame signals to replay
    #[arg(short, long, env = "PROCTOR_SIGNALS")]
    signals: PathBuf,

    /// Candidate identifier, overriding the configured one
    #[arg(long, env = "PROCTOR_STUDENT_ID")]
    student_id: Option<String>,

    /// Log level, overriding the configured one
    #[arg(long, env = "PROCTOR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "PROCTOR_LOG_JSON")]
    json: bool,
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config =
        SessionConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Override with CLI args
    if let Some(id) = cli.student_id {
        config.student.id = id;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    init_tracing(&config.logging.level, config.logging.json);
    config.validate().context("invalid configuration")?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Stop requested");
                stop.store(true, Ordering::SeqCst);
            }
        });
    }

    let recorder: Arc<dyn ViolationRecorder> = match &config.storage.violations_path {
        Some(path) => {
            let (recorder, rotated) =
                JsonlRecorder::create(path).context("failed to open violation log")?;
            if let Some(rotated) = rotated {
                info!(path = %rotated.display(), "Previous violation history kept aside");
            }
            Arc::new(recorder)
        }
        None => Arc::new(MemoryRecorder::new()),
    };
    let event_log = Arc::new(match &config.storage.event_log_path {
        Some(path) => EventLog::open(path).context("failed to open event log")?,
        None => EventLog::disabled(),
    });

    let dispatcher =
        AlertDispatcher::from_config(&config.alerts).context("invalid alert configuration")?;
    let source = ReplaySource::open(&cli.signals)
        .with_context(|| format!("failed to open signal trace {}", cli.signals.display()))?;
    let generator = ReportGenerator::new(config.reporting.clone());
    let student = config.student.clone();

    let captures = start_captures(&config.capture).context("failed to start capture")?;
    let mut session = ProctorSession::new(&config, source, dispatcher, recorder, event_log)?;

    let (outcome, summary) = tokio::task::spawn_blocking(move || {
        let summary = session.run(&stop);
        (session.finish(&generator, &student), summary)
    })
    .await
    .context("frame loop panicked")?;

    info!(frames = summary.frames, violations = summary.violations_recorded, "Session complete");

    match &outcome {
        ReportOutcome::Rich { path, html } => {
            println!("Report generated: {}", path.display());
            println!("HTML report: {}", html.display());
        }
        ReportOutcome::Simple { path, rich_failure } => {
            if let Some(reason) = rich_failure {
                warn!(reason = %reason, "PDF report unavailable, HTML report kept");
            }
            println!("Report generated: {}", path.display());
        }
        ReportOutcome::Absent { reason } => println!("Report generation skipped: {reason}"),
    }

    for capture in captures {
        let name = capture.name().to_string();
        match capture.finish() {
            Ok(Some(path)) => println!("{} recording saved: {}", name, path.display()),
            Ok(None) => {}
            Err(e) => warn!(capture = %name, error = %e, "Failed to stop capture"),
        }
    }

    Ok(())
}
