//! Run-level bookkeeping types

use serde::{Deserialize, Serialize};

/// Cumulative event weights seen by the host over a run.
///
/// Every delivered event is counted, including vetoed ones: the
/// cross-section normalisation divides by the weight of everything that was
/// generated, not only of what passed the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightTally {
    /// Number of events seen.
    pub n_events: u64,
    /// Sum of event weights.
    pub sum_w: f64,
    /// Sum of squared event weights.
    pub sum_w2: f64,
}

impl WeightTally {
    /// Record one event.
    pub fn record(&mut self, weight: f64) {
        self.n_events += 1;
        self.sum_w += weight;
        self.sum_w2 += weight * weight;
    }

    /// Add another tally (from a partial run) into this one.
    pub fn merge(&mut self, other: &WeightTally) {
        self.n_events += other.n_events;
        self.sum_w += other.sum_w;
        self.sum_w2 += other.sum_w2;
    }

    /// Effective number of entries `(Σw)² / Σw²`, `None` when no weight was recorded.
    pub fn effective_entries(&self) -> Option<f64> {
        if self.sum_w2 > 0.0 { Some(self.sum_w * self.sum_w / self.sum_w2) } else { None }
    }
}
