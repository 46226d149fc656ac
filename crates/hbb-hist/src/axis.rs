//! Binned axes and bin lookup.

use serde::{Deserialize, Serialize};

use hbb_core::{Error, Result};

/// Under/overflow handling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPolicy {
    /// Keep entries outside the axis range out of the bins (record them as under/overflow).
    #[default]
    Drop,
    /// Fold underflow into the first bin and overflow into the last bin.
    Fold,
}

/// Where a value falls on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinLocation {
    /// Below the lower edge.
    Underflow,
    /// Inside bin `i` (half-open `[lo, hi)`).
    Bin(usize),
    /// At or above the upper edge.
    Overflow,
}

impl BinLocation {
    /// Resolve the location to a bin index under `policy`.
    ///
    /// Returns `None` when the entry does not land in any bin.
    pub fn resolve(self, policy: FlowPolicy, n_bins: usize) -> Option<usize> {
        match (self, policy) {
            (BinLocation::Bin(i), _) => Some(i),
            (BinLocation::Underflow, FlowPolicy::Fold) => Some(0),
            (BinLocation::Overflow, FlowPolicy::Fold) => Some(n_bins - 1),
            (_, FlowPolicy::Drop) => None,
        }
    }
}

/// Uniform binning request: `bins` equal-width bins over `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// Number of bins.
    pub bins: usize,
    /// Lower edge of the first bin.
    pub lo: f64,
    /// Upper edge of the last bin.
    pub hi: f64,
}

impl AxisSpec {
    /// Create a uniform binning request.
    pub const fn new(bins: usize, lo: f64, hi: f64) -> Self {
        Self { bins, lo, hi }
    }

    /// Width of one bin.
    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.bins as f64
    }
}

/// A binned axis defined by its sorted edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    edges: Vec<f64>,
}

impl Axis {
    /// Build an axis from explicit edges (sorted, length = n_bins + 1).
    pub fn from_edges(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::Validation(format!(
                "axis needs at least two edges, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(Error::Validation("axis edges must be finite".into()));
        }
        if edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::Validation("axis edges must be strictly increasing".into()));
        }
        Ok(Self { edges })
    }

    /// Build a uniform axis from a binning request.
    pub fn uniform(spec: &AxisSpec) -> Result<Self> {
        if spec.bins == 0 {
            return Err(Error::Validation("axis needs at least one bin".into()));
        }
        let width = spec.bin_width();
        let mut edges: Vec<f64> = (0..spec.bins).map(|i| spec.lo + i as f64 * width).collect();
        edges.push(spec.hi);
        Self::from_edges(edges)
    }

    /// Bin edges (length = n_bins + 1).
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Lower edge of the first bin.
    pub fn lo(&self) -> f64 {
        self.edges[0]
    }

    /// Upper edge of the last bin.
    pub fn hi(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Locate a (non-NaN) value on the axis.
    ///
    /// Bins are half-open, so a value sitting on an inner edge belongs to the
    /// bin above it.
    pub fn locate(&self, val: f64) -> BinLocation {
        if val < self.lo() {
            BinLocation::Underflow
        } else if val >= self.hi() {
            BinLocation::Overflow
        } else {
            // lo <= val < hi, so at least one edge is <= val and the last one is not.
            BinLocation::Bin(self.edges.partition_point(|&e| e <= val) - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_width_lookup() {
        // Jet multiplicity style edges: 0, 1, 2-3, 4-7.
        let axis = Axis::from_edges(vec![0.0, 1.0, 2.0, 4.0, 8.0]).unwrap();
        assert_eq!(axis.n_bins(), 4);
        assert_eq!(axis.locate(0.5), BinLocation::Bin(0));
        assert_eq!(axis.locate(2.0), BinLocation::Bin(2));
        assert_eq!(axis.locate(3.999), BinLocation::Bin(2));
        assert_eq!(axis.locate(4.0), BinLocation::Bin(3));
        assert_eq!(axis.locate(7.5), BinLocation::Bin(3));
        assert_eq!(axis.locate(8.0), BinLocation::Overflow);
        assert_eq!(axis.locate(-0.0), BinLocation::Bin(0));
    }

    #[test]
    fn uniform_axis_edges() {
        let axis = Axis::uniform(&AxisSpec::new(10, 0.0, 10.0)).unwrap();
        assert_eq!(axis.n_bins(), 10);
        assert_eq!(axis.edges()[3], 3.0);
        assert_eq!(axis.hi(), 10.0);
        assert_eq!(axis.locate(3.0), BinLocation::Bin(3));
        assert_eq!(axis.locate(0.0), BinLocation::Bin(0));
        assert_eq!(axis.locate(10.0), BinLocation::Overflow);
        assert_eq!(axis.locate(-1e-9), BinLocation::Underflow);
        assert_eq!(axis.locate(f64::INFINITY), BinLocation::Overflow);
        assert_eq!(axis.locate(f64::NEG_INFINITY), BinLocation::Underflow);
    }

    #[test]
    fn invalid_axes_are_rejected() {
        assert!(Axis::uniform(&AxisSpec::new(0, 0.0, 1.0)).is_err());
        assert!(Axis::uniform(&AxisSpec::new(5, 1.0, 1.0)).is_err());
        assert!(Axis::from_edges(vec![0.0]).is_err());
        assert!(Axis::from_edges(vec![0.0, 2.0, 1.0]).is_err());
        assert!(Axis::from_edges(vec![0.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn flow_resolution() {
        assert_eq!(BinLocation::Underflow.resolve(FlowPolicy::Drop, 4), None);
        assert_eq!(BinLocation::Underflow.resolve(FlowPolicy::Fold, 4), Some(0));
        assert_eq!(BinLocation::Overflow.resolve(FlowPolicy::Fold, 4), Some(3));
        assert_eq!(BinLocation::Bin(2).resolve(FlowPolicy::Drop, 4), Some(2));
    }
}
