//! Report production with graceful degradation.
//!
//! The generator tries the rich format first, falls back to the simple one,
//! and as a last resort reports that no document was produced. It never
//! returns an error to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use proctor_types::{ViolationEvent, WeightTable};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::charts::ChartArtifacts;
use crate::document::{ReportData, StudentInfo};
use crate::error::ReportResult;
use crate::render::{HtmlRenderer, PdfConverter};
use crate::stats::compute_stats;

/// Preferred output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Html,
    #[default]
    Pdf,
}

/// Report generation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub format: ReportFormat,

    /// Converter binary. `None` means `wkhtmltopdf` on the PATH.
    #[serde(default)]
    pub wkhtmltopdf_path: Option<PathBuf>,

    #[serde(default = "default_charts")]
    pub charts: bool,

    #[serde(default = "WeightTable::severity_defaults")]
    pub severity_weights: WeightTable,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: ReportFormat::default(),
            wkhtmltopdf_path: None,
            charts: default_charts(),
            severity_weights: WeightTable::severity_defaults(),
        }
    }
}

impl ReportConfig {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_wkhtmltopdf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.wkhtmltopdf_path = Some(path.into());
        self
    }

    pub fn with_charts(mut self, charts: bool) -> Self {
        self.charts = charts;
        self
    }
}

/// What report generation produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The rich (PDF) document. The simple document it was converted from
    /// is kept at `html`.
    Rich { path: PathBuf, html: PathBuf },
    /// The simple (HTML) document. `rich_failure` says why the rich format
    /// was not produced, if it was attempted.
    Simple {
        path: PathBuf,
        rich_failure: Option<String>,
    },
    /// No document could be produced.
    Absent { reason: String },
}

impl ReportOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Rich { path, .. } | Self::Simple { path, .. } => Some(path),
            Self::Absent { .. } => None,
        }
    }

    /// The simple document, which exists whenever any report does.
    pub fn html_path(&self) -> Option<&Path> {
        match self {
            Self::Rich { html, .. } => Some(html),
            Self::Simple { path, .. } => Some(path),
            Self::Absent { .. } => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent { .. })
    }
}

/// Produces the end-of-session report.
#[derive(Clone, Debug)]
pub struct ReportGenerator {
    config: ReportConfig,
    renderer: HtmlRenderer,
    converter: PdfConverter,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        let converter = config
            .wkhtmltopdf_path
            .clone()
            .map(PdfConverter::new)
            .unwrap_or_default();
        let renderer = HtmlRenderer::with_base_dir(config.output_dir.clone());
        Self {
            config,
            renderer,
            converter,
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Generate the report for `violations`.
    ///
    /// An empty history still yields a report stating zero violations.
    pub fn generate(&self, student: &StudentInfo, violations: &[ViolationEvent]) -> ReportOutcome {
        if let Err(e) = fs::create_dir_all(&self.config.output_dir) {
            warn!(dir = %self.config.output_dir.display(), error = %e, "Cannot create report directory");
            return ReportOutcome::Absent {
                reason: format!("cannot create {}: {}", self.config.output_dir.display(), e),
            };
        }

        let file_id = sanitize_id(&student.id);
        let stats = compute_stats(violations, &self.config.severity_weights);
        let charts = if self.config.charts {
            self.charts(&file_id, &stats)
        } else {
            ChartArtifacts::default()
        };

        let generated_at = Utc::now();
        let data = ReportData {
            student,
            violations,
            stats,
            charts,
            generated_at,
        };

        let stem = format!("report_{}_{}", file_id, generated_at.format("%Y%m%d_%H%M%S"));
        let html_path = self.config.output_dir.join(format!("{stem}.html"));

        if let Err(e) = self.write_html(&data, &html_path) {
            warn!(path = %html_path.display(), error = %e, "HTML report failed");
            return ReportOutcome::Absent {
                reason: format!("html report failed: {e}"),
            };
        }

        let rich_failure = match self.config.format {
            ReportFormat::Html => None,
            ReportFormat::Pdf => {
                let pdf_path = self.config.output_dir.join(format!("{stem}.pdf"));
                match self.converter.convert(&html_path, &pdf_path) {
                    Ok(()) => {
                        info!(path = %pdf_path.display(), violations = violations.len(), "PDF report generated");
                        return ReportOutcome::Rich {
                            path: pdf_path,
                            html: html_path,
                        };
                    }
                    Err(e) => {
                        warn!(error = %e, "PDF conversion failed, keeping HTML report");
                        Some(e.to_string())
                    }
                }
            }
        };

        info!(path = %html_path.display(), violations = violations.len(), "HTML report generated");
        ReportOutcome::Simple {
            path: html_path,
            rich_failure,
        }
    }

    fn charts(&self, file_id: &str, stats: &crate::stats::Stats) -> ChartArtifacts {
        let image_dir = self.config.output_dir.join("images");
        if let Err(e) = fs::create_dir_all(&image_dir) {
            warn!(dir = %image_dir.display(), error = %e, "Cannot create chart directory");
            return ChartArtifacts::default();
        }
        ChartArtifacts::generate(&image_dir, file_id, stats, &self.config.severity_weights)
    }

    fn write_html(&self, data: &ReportData<'_>, path: &Path) -> ReportResult<()> {
        fs::write(path, self.renderer.render(data))?;
        Ok(())
    }
}

/// Keep identifiers safe for use in file names.
fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports/generated")
}

fn default_charts() -> bool {
    true
}
