//! Optional chart artifacts written next to the report.
//!
//! Charts are best effort: a chart that cannot be produced is simply absent
//! from the report.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use proctor_types::{ViolationType, WeightTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ReportError, ReportResult};
use crate::render::escape_markup;
use crate::stats::{Stats, DEFAULT_SEVERITY};

const WIDTH: f64 = 960.0;
const TIMELINE_HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const BAR_LABEL_WIDTH: f64 = 180.0;
const BAR_HEIGHT: f64 = 28.0;
const BAR_GAP: f64 = 12.0;
/// Severity mapped to the darkest bar colour.
const SEVERITY_SCALE: f64 = 5.0;

/// Paths of the charts produced for a report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartArtifacts {
    pub timeline: Option<PathBuf>,
    pub frequency: Option<PathBuf>,
}

impl ChartArtifacts {
    /// Write both charts into `image_dir`, keeping whichever succeed.
    pub fn generate(
        image_dir: &Path,
        student_id: &str,
        stats: &Stats,
        severity_weights: &WeightTable,
    ) -> Self {
        let timeline = best_effort("timeline", || {
            write_chart(image_dir, &format!("timeline_{student_id}.svg"), timeline_svg(stats, student_id))
        });
        let frequency = best_effort("frequency", || {
            write_chart(
                image_dir,
                &format!("heatmap_{student_id}.svg"),
                frequency_svg(stats, student_id, severity_weights),
            )
        });
        Self {
            timeline,
            frequency,
        }
    }
}

fn best_effort(
    name: &str,
    produce: impl FnOnce() -> ReportResult<Option<PathBuf>>,
) -> Option<PathBuf> {
    match produce() {
        Ok(path) => path,
        Err(e) => {
            warn!(chart = name, error = %e, "Chart generation failed");
            None
        }
    }
}

fn write_chart(dir: &Path, file_name: &str, svg: Option<String>) -> ReportResult<Option<PathBuf>> {
    let Some(svg) = svg else {
        return Ok(None);
    };
    let path = dir.join(file_name);
    fs::write(&path, svg).map_err(|e| ReportError::Chart(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "Chart written");
    Ok(Some(path))
}

/// Severity over time, one annotated point per violation.
///
/// `None` when there is nothing to plot.
pub fn timeline_svg(stats: &Stats, student_id: &str) -> Option<String> {
    let first = stats.timeline.iter().map(|e| e.time).min()?;
    let last = stats.timeline.iter().map(|e| e.time).max()?;
    let span_ms = (last - first).num_milliseconds().max(0) as f64;

    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = TIMELINE_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let y_max = f64::from(stats.max_severity()).max(SEVERITY_SCALE);

    let x_of = |time: chrono::DateTime<chrono::Utc>| {
        if span_ms == 0.0 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + (time - first).num_milliseconds() as f64 / span_ms * plot_w
        }
    };
    let y_of = |severity: u32| MARGIN_TOP + plot_h - f64::from(severity) / y_max * plot_h;

    let mut svg = svg_open(WIDTH, TIMELINE_HEIGHT);
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="28" text-anchor="middle" font-size="18">Violation Timeline - {}</text>"#,
        WIDTH / 2.0,
        escape_markup(student_id)
    );
    axes(&mut svg, plot_w, plot_h);

    for tick in 0..=(y_max as u32) {
        let y = y_of(tick);
        let _ = writeln!(
            svg,
            r##"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#ddd" stroke-dasharray="4 4"/>"##,
            MARGIN_LEFT + plot_w
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11">{tick}</text>"#,
            MARGIN_LEFT - 8.0,
            y + 4.0
        );
    }

    let points: Vec<(f64, f64)> = stats
        .timeline
        .iter()
        .map(|e| (x_of(e.time), y_of(e.severity)))
        .collect();
    let polyline: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
    let _ = writeln!(
        svg,
        r##"<polyline points="{}" fill="none" stroke="#1f77b4" stroke-width="2"/>"##,
        polyline.join(" ")
    );

    for (entry, (x, y)) in stats.timeline.iter().zip(&points) {
        let _ = writeln!(svg, r##"<circle cx="{x:.1}" cy="{y:.1}" r="5" fill="#1f77b4"/>"##);
        let _ = writeln!(
            svg,
            r#"<text x="{x:.1}" y="{:.1}" text-anchor="middle" font-size="9">{}</text>"#,
            y - 9.0,
            entry.violation_type
        );
    }

    let label_y = TIMELINE_HEIGHT - MARGIN_BOTTOM + 20.0;
    let _ = writeln!(
        svg,
        r#"<text x="{MARGIN_LEFT}" y="{label_y:.1}" font-size="11">{}</text>"#,
        first.format("%H:%M:%S")
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{label_y:.1}" text-anchor="end" font-size="11">{}</text>"#,
        MARGIN_LEFT + plot_w,
        last.format("%H:%M:%S")
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12">Time</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        TIMELINE_HEIGHT - 15.0
    );

    svg.push_str("</svg>\n");
    Some(svg)
}

/// Horizontal bars of violation counts, shaded by severity.
///
/// `None` when there is nothing to plot.
pub fn frequency_svg(stats: &Stats, student_id: &str, severity_weights: &WeightTable) -> Option<String> {
    if stats.by_type.is_empty() {
        return None;
    }

    let mut bars: Vec<(ViolationType, usize)> =
        stats.by_type.iter().map(|(ty, count)| (*ty, *count)).collect();
    bars.sort_by_key(|(_, count)| *count);

    let max_count = bars.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f64;
    let height = MARGIN_TOP + bars.len() as f64 * (BAR_HEIGHT + BAR_GAP) + MARGIN_BOTTOM;
    let plot_w = WIDTH - BAR_LABEL_WIDTH - MARGIN_RIGHT - 40.0;

    let mut svg = svg_open(WIDTH, height);
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="28" text-anchor="middle" font-size="18">Violation Frequency - {}</text>"#,
        WIDTH / 2.0,
        escape_markup(student_id)
    );

    for (row, (ty, count)) in bars.iter().enumerate() {
        let y = MARGIN_TOP + row as f64 * (BAR_HEIGHT + BAR_GAP);
        let width = *count as f64 / max_count * plot_w;
        let severity = severity_weights.weight_or(*ty, DEFAULT_SEVERITY);
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12">{ty}</text>"#,
            BAR_LABEL_WIDTH - 10.0,
            y + BAR_HEIGHT / 2.0 + 4.0
        );
        let _ = writeln!(
            svg,
            r#"<rect x="{BAR_LABEL_WIDTH}" y="{y:.1}" width="{width:.1}" height="{BAR_HEIGHT}" fill="{}"/>"#,
            severity_colour(severity)
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="12">{count}</text>"#,
            BAR_LABEL_WIDTH + width + 6.0,
            y + BAR_HEIGHT / 2.0 + 4.0
        );
    }

    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12">Count</text>"#,
        BAR_LABEL_WIDTH + plot_w / 2.0,
        height - 15.0
    );
    svg.push_str("</svg>\n");
    Some(svg)
}

fn svg_open(width: f64, height: f64) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" \
         viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"sans-serif\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n"
    )
}

fn axes(svg: &mut String, plot_w: f64, plot_h: f64) {
    let bottom = MARGIN_TOP + plot_h;
    let _ = writeln!(
        svg,
        r#"<line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{bottom:.1}" stroke="black"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{MARGIN_LEFT}" y1="{bottom:.1}" x2="{:.1}" y2="{bottom:.1}" stroke="black"/>"#,
        MARGIN_LEFT + plot_w
    );
    let _ = writeln!(
        svg,
        r#"<text x="18" y="{:.1}" font-size="12" transform="rotate(-90 18 {:.1})">Severity</text>"#,
        MARGIN_TOP + plot_h / 2.0,
        MARGIN_TOP + plot_h / 2.0
    );
}

/// Light to dark red as severity grows.
fn severity_colour(severity: u32) -> String {
    let ratio = (f64::from(severity) / SEVERITY_SCALE).clamp(0.0, 1.0);
    let channel = (235.0 - 200.0 * ratio).round() as u8;
    format!("rgb(220,{channel},{channel})")
}
