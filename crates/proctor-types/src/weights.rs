//! Per-violation weight tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::violation::ViolationType;

/// Mapping from violation type to an integer weight.
///
/// The same shape serves two unrelated purposes: additive risk weights for
/// the fusion engine and severity weights for report statistics. The two
/// tables are configured independently.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable(BTreeMap<ViolationType, u32>);

impl WeightTable {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Default risk weights for every violation type.
    pub fn risk_defaults() -> Self {
        ViolationType::ALL
            .into_iter()
            .map(|ty| (ty, ty.default_risk_weight()))
            .collect()
    }

    /// Default report severities for every violation type.
    pub fn severity_defaults() -> Self {
        ViolationType::ALL
            .into_iter()
            .map(|ty| (ty, ty.default_severity()))
            .collect()
    }

    /// Builder-style insert.
    pub fn with(mut self, ty: ViolationType, weight: u32) -> Self {
        self.0.insert(ty, weight);
        self
    }

    pub fn set(&mut self, ty: ViolationType, weight: u32) {
        self.0.insert(ty, weight);
    }

    pub fn get(&self, ty: ViolationType) -> Option<u32> {
        self.0.get(&ty).copied()
    }

    /// Weight for `ty`, or `fallback` when the table has no entry.
    pub fn weight_or(&self, ty: ViolationType, fallback: u32) -> u32 {
        self.get(ty).unwrap_or(fallback)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ViolationType, u32)> + '_ {
        self.0.iter().map(|(ty, w)| (*ty, *w))
    }
}

impl FromIterator<(ViolationType, u32)> for WeightTable {
    fn from_iter<I: IntoIterator<Item = (ViolationType, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
