//! # proctor-report
//!
//! End-of-session reporting for an exam session.
//!
//! ## Components
//!
//! - [`compute_stats`]: pure aggregation of a violation history into
//!   [`Stats`] (counts, severity score, average severity, timeline)
//! - [`ChartArtifacts`]: optional SVG timeline and frequency charts
//! - [`HtmlRenderer`]: the simple report format, always produced
//! - [`PdfConverter`]: the rich format, best effort via `wkhtmltopdf`
//! - [`ReportGenerator`]: runs the rich → simple fallback and reports the
//!   result as a [`ReportOutcome`] value instead of failing
//!
//! Severity weights used here are independent of the risk weights used to
//! score frames.

pub mod charts;
pub mod document;
pub mod error;
pub mod generator;
pub mod render;
pub mod stats;

pub use charts::ChartArtifacts;
pub use document::{ReportData, StudentInfo};
pub use error::{ReportError, ReportResult};
pub use generator::{ReportConfig, ReportFormat, ReportGenerator, ReportOutcome};
pub use render::{HtmlRenderer, PdfConverter};
pub use stats::{compute_stats, Stats, TimelineEntry, DEFAULT_SEVERITY};
