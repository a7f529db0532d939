//! Report renderers.
//!
//! HTML is the simple format and is always produced. PDF is the rich format,
//! converted from the HTML by an external `wkhtmltopdf` binary.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::document::ReportData;
use crate::error::{ReportError, ReportResult};

/// Escape text for inclusion in HTML or SVG markup.
pub(crate) fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the simple HTML report.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    /// Directory the HTML file will live in; chart links are made relative to it.
    base_dir: Option<PathBuf>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    pub fn render(&self, data: &ReportData<'_>) -> String {
        let mut html = String::new();
        let student = data.student;
        let stats = &data.stats;

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(
            html,
            "<title>Exam Violation Report - {}</title>",
            escape_markup(&student.id)
        );
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n");

        let _ = writeln!(html, "<h1>Exam Violation Report</h1>");
        let _ = writeln!(
            html,
            "<p class=\"generated\">Generated at {}</p>",
            data.generated_at.format("%Y-%m-%d %H:%M:%S")
        );

        html.push_str("<h2>Candidate</h2>\n<table>\n");
        for (label, value) in [
            ("ID", &student.id),
            ("Name", &student.name),
            ("Exam", &student.exam),
            ("Course", &student.course),
        ] {
            let _ = writeln!(
                html,
                "<tr><th>{label}</th><td>{}</td></tr>",
                escape_markup(value)
            );
        }
        html.push_str("</table>\n");

        html.push_str("<h2>Summary</h2>\n<table>\n");
        let _ = writeln!(html, "<tr><th>Total violations</th><td>{}</td></tr>", stats.total);
        let _ = writeln!(html, "<tr><th>Severity score</th><td>{}</td></tr>", stats.severity_score);
        let _ = writeln!(
            html,
            "<tr><th>Average severity</th><td>{:.2}</td></tr>",
            stats.average_severity
        );
        html.push_str("</table>\n");

        if !stats.by_type.is_empty() {
            html.push_str("<h2>By type</h2>\n<table>\n<tr><th>Type</th><th>Count</th></tr>\n");
            for (ty, count) in &stats.by_type {
                let _ = writeln!(html, "<tr><td>{ty}</td><td>{count}</td></tr>");
            }
            html.push_str("</table>\n");
        }

        if data.has_images() {
            html.push_str("<h2>Charts</h2>\n");
            for (alt, path) in [
                ("Violation timeline", &data.charts.timeline),
                ("Violation frequency", &data.charts.frequency),
            ] {
                if let Some(path) = path {
                    let _ = writeln!(
                        html,
                        "<img src=\"{}\" alt=\"{alt}\">",
                        escape_markup(&self.link(path))
                    );
                }
            }
        }

        html.push_str("<h2>Violations</h2>\n");
        if data.violations.is_empty() {
            html.push_str("<p>No violations were recorded during this session.</p>\n");
        } else {
            html.push_str(
                "<table>\n<tr><th>Time</th><th>Type</th><th>Severity</th>\
                 <th>Probability</th><th>Reasons</th></tr>\n",
            );
            for (violation, entry) in data.violations.iter().zip(&stats.timeline) {
                let _ = writeln!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}%</td><td>{}</td></tr>",
                    violation.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                    violation.violation_type,
                    entry.severity,
                    violation.risk_snapshot.probability,
                    escape_markup(&violation.risk_snapshot.reasons.join("; "))
                );
            }
            html.push_str("</table>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    fn link(&self, path: &Path) -> String {
        self.base_dir
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok())
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

const STYLE: &str = "<style>\n\
body { font-family: sans-serif; margin: 2em; color: #222; }\n\
table { border-collapse: collapse; margin-bottom: 1.5em; }\n\
th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: left; }\n\
th { background: #f3f3f3; }\n\
img { max-width: 100%; display: block; margin-bottom: 1em; }\n\
.generated { color: #666; }\n\
</style>\n";

/// Converts an HTML report into PDF with `wkhtmltopdf`.
#[derive(Debug, Clone)]
pub struct PdfConverter {
    program: PathBuf,
}

impl Default for PdfConverter {
    fn default() -> Self {
        Self::new("wkhtmltopdf")
    }
}

impl PdfConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn convert(&self, html_path: &Path, pdf_path: &Path) -> ReportResult<()> {
        let output = Command::new(&self.program)
            .args(["--enable-local-file-access", "--quiet"])
            .args(["--margin-top", "10mm", "--margin-right", "10mm"])
            .args(["--margin-bottom", "10mm", "--margin-left", "10mm"])
            .arg(html_path)
            .arg(pdf_path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ReportError::Conversion(format!("{}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReportError::Conversion(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        if !pdf_path.is_file() {
            return Err(ReportError::Conversion(format!(
                "{} produced no output",
                self.program.display()
            )));
        }
        Ok(())
    }
}
