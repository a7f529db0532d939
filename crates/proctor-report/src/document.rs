//! Input structure handed to the renderers.

use chrono::{DateTime, Utc};
use proctor_types::ViolationEvent;
use serde::{Deserialize, Serialize};

use crate::charts::ChartArtifacts;
use crate::stats::Stats;

/// Identity of the examined candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentInfo {
    pub id: String,
    pub name: String,
    pub exam: String,
    pub course: String,
}

impl Default for StudentInfo {
    fn default() -> Self {
        Self {
            id: "STUDENT_001".to_string(),
            name: "Unknown Candidate".to_string(),
            exam: "Examination".to_string(),
            course: String::new(),
        }
    }
}

/// Everything a renderer needs for one report.
#[derive(Clone, Debug, Serialize)]
pub struct ReportData<'a> {
    pub student: &'a StudentInfo,
    pub violations: &'a [ViolationEvent],
    pub stats: Stats,
    pub charts: ChartArtifacts,
    pub generated_at: DateTime<Utc>,
}

impl ReportData<'_> {
    pub fn has_images(&self) -> bool {
        self.charts.timeline.is_some() || self.charts.frequency.is_some()
    }
}
