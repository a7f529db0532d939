//! Violation statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use proctor_types::{ViolationEvent, ViolationType, WeightTable};
use serde::{Deserialize, Serialize};

/// Severity assumed for a type missing from the severity table.
pub const DEFAULT_SEVERITY: u32 = 1;

/// One point of the severity timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    pub severity: u32,
}

/// Summary statistics of a session's violations.
///
/// Always recomputed from the full history; never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub by_type: BTreeMap<ViolationType, usize>,
    pub severity_score: u32,
    /// `severity_score / total`, or 0 when there are no violations.
    pub average_severity: f64,
    /// In input order, which the recorder guarantees is time order.
    pub timeline: Vec<TimelineEntry>,
}

impl Stats {
    pub fn count(&self, ty: ViolationType) -> usize {
        self.by_type.get(&ty).copied().unwrap_or(0)
    }

    pub fn max_severity(&self) -> u32 {
        self.timeline.iter().map(|e| e.severity).max().unwrap_or(0)
    }
}

/// Aggregate a violation history.
///
/// Pure and deterministic; performs no I/O.
pub fn compute_stats(violations: &[ViolationEvent], severity_weights: &WeightTable) -> Stats {
    let mut stats = Stats {
        total: violations.len(),
        ..Stats::default()
    };

    for violation in violations {
        let ty = violation.violation_type;
        let severity = severity_weights.weight_or(ty, DEFAULT_SEVERITY);

        *stats.by_type.entry(ty).or_insert(0) += 1;
        stats.severity_score = stats.severity_score.saturating_add(severity);
        stats.timeline.push(TimelineEntry {
            time: violation.timestamp,
            violation_type: ty,
            severity,
        });
    }

    if stats.total > 0 {
        stats.average_severity = f64::from(stats.severity_score) / stats.total as f64;
    }

    stats
}
