//! Weighted 1D and 2D histogram accumulators.

use serde::{Deserialize, Serialize};

use hbb_core::{Error, Result};

use crate::axis::{Axis, BinLocation, FlowPolicy};

/// A weighted 1D histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histo1D {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// x-axis label.
    pub x_label: String,
    /// y-axis label.
    pub y_label: String,
    /// Binning.
    pub axis: Axis,
    /// Under/overflow policy.
    pub flow_policy: FlowPolicy,
    /// Sum of weights per bin.
    pub sumw: Vec<f64>,
    /// Sum of weights squared per bin.
    pub sumw2: Vec<f64>,
    /// Underflow sum of weights (before optional folding).
    pub underflow: f64,
    /// Overflow sum of weights (before optional folding).
    pub overflow: f64,
    /// Underflow sum of weights squared (before optional folding).
    pub underflow_sumw2: f64,
    /// Overflow sum of weights squared (before optional folding).
    pub overflow_sumw2: f64,
    /// Entries that landed in a bin.
    pub entries: u64,
    /// NaN observations that were refused.
    pub rejected: u64,
}

impl Histo1D {
    /// Create an empty histogram.
    pub fn new(name: impl Into<String>, axis: Axis, flow_policy: FlowPolicy) -> Self {
        let n = axis.n_bins();
        Self {
            name: name.into(),
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            axis,
            flow_policy,
            sumw: vec![0.0; n],
            sumw2: vec![0.0; n],
            underflow: 0.0,
            overflow: 0.0,
            underflow_sumw2: 0.0,
            overflow_sumw2: 0.0,
            entries: 0,
            rejected: 0,
        }
    }

    /// Set the title and axis labels.
    pub fn with_labels(
        mut self,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.sumw.len()
    }

    /// Record one weighted observation.
    pub fn fill(&mut self, val: f64, weight: f64) {
        if val.is_nan() {
            self.rejected += 1;
            return;
        }
        let w2 = weight * weight;
        let loc = self.axis.locate(val);
        match loc {
            BinLocation::Underflow => {
                self.underflow += weight;
                self.underflow_sumw2 += w2;
            }
            BinLocation::Overflow => {
                self.overflow += weight;
                self.overflow_sumw2 += w2;
            }
            BinLocation::Bin(_) => {}
        }
        if let Some(b) = loc.resolve(self.flow_policy, self.n_bins()) {
            self.sumw[b] += weight;
            self.sumw2[b] += w2;
            self.entries += 1;
        }
    }

    /// Sum of weights in bin `i`.
    pub fn bin_content(&self, i: usize) -> f64 {
        self.sumw[i]
    }

    /// Sum of weights over all bins (flows excluded).
    pub fn integral(&self) -> f64 {
        self.sumw.iter().sum()
    }

    /// Multiply every accumulated weight by `factor` (squared weights by `factor²`).
    pub fn scale(&mut self, factor: f64) {
        let f2 = factor * factor;
        self.sumw.iter_mut().for_each(|w| *w *= factor);
        self.sumw2.iter_mut().for_each(|w| *w *= f2);
        self.underflow *= factor;
        self.overflow *= factor;
        self.underflow_sumw2 *= f2;
        self.overflow_sumw2 *= f2;
    }

    /// Add the contents of `other` bin by bin.
    pub fn merge(&mut self, other: &Histo1D) -> Result<()> {
        if self.axis != other.axis || self.flow_policy != other.flow_policy {
            return Err(Error::IncompatibleMerge(format!(
                "histogram '{}' has different binning or flow policy",
                self.name
            )));
        }
        for (a, b) in self.sumw.iter_mut().zip(&other.sumw) {
            *a += b;
        }
        for (a, b) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.underflow_sumw2 += other.underflow_sumw2;
        self.overflow_sumw2 += other.overflow_sumw2;
        self.entries += other.entries;
        self.rejected += other.rejected;
        Ok(())
    }
}

/// A weighted 2D histogram (row-major: `index = iy * nx + ix`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histo2D {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// x-axis label.
    pub x_label: String,
    /// y-axis label.
    pub y_label: String,
    /// z-axis label.
    pub z_label: String,
    /// x binning.
    pub x_axis: Axis,
    /// y binning.
    pub y_axis: Axis,
    /// Under/overflow policy, applied per axis.
    pub flow_policy: FlowPolicy,
    /// Sum of weights per bin.
    pub sumw: Vec<f64>,
    /// Sum of weights squared per bin.
    pub sumw2: Vec<f64>,
    /// Sum of weights that fell outside the bins on either axis.
    pub out_of_range: f64,
    /// Entries that landed in a bin.
    pub entries: u64,
    /// NaN observations that were refused.
    pub rejected: u64,
}

impl Histo2D {
    /// Create an empty histogram.
    pub fn new(
        name: impl Into<String>,
        x_axis: Axis,
        y_axis: Axis,
        flow_policy: FlowPolicy,
    ) -> Self {
        let n = x_axis.n_bins() * y_axis.n_bins();
        Self {
            name: name.into(),
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            z_label: String::new(),
            x_axis,
            y_axis,
            flow_policy,
            sumw: vec![0.0; n],
            sumw2: vec![0.0; n],
            out_of_range: 0.0,
            entries: 0,
            rejected: 0,
        }
    }

    /// Set the title and axis labels.
    pub fn with_labels(
        mut self,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        z_label: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self.z_label = z_label.into();
        self
    }

    /// Record one weighted observation at `(x, y)`.
    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        if x.is_nan() || y.is_nan() {
            self.rejected += 1;
            return;
        }
        let nx = self.x_axis.n_bins();
        let ny = self.y_axis.n_bins();
        let ix = self.x_axis.locate(x).resolve(self.flow_policy, nx);
        let iy = self.y_axis.locate(y).resolve(self.flow_policy, ny);
        match (ix, iy) {
            (Some(ix), Some(iy)) => {
                let idx = iy * nx + ix;
                self.sumw[idx] += weight;
                self.sumw2[idx] += weight * weight;
                self.entries += 1;
            }
            _ => self.out_of_range += weight,
        }
    }

    /// Sum of weights in bin `(ix, iy)`.
    pub fn bin_content(&self, ix: usize, iy: usize) -> f64 {
        self.sumw[iy * self.x_axis.n_bins() + ix]
    }

    /// Sum of weights over all bins.
    pub fn integral(&self) -> f64 {
        self.sumw.iter().sum()
    }

    /// Multiply every accumulated weight by `factor` (squared weights by `factor²`).
    pub fn scale(&mut self, factor: f64) {
        let f2 = factor * factor;
        self.sumw.iter_mut().for_each(|w| *w *= factor);
        self.sumw2.iter_mut().for_each(|w| *w *= f2);
        self.out_of_range *= factor;
    }

    /// Add the contents of `other` bin by bin.
    pub fn merge(&mut self, other: &Histo2D) -> Result<()> {
        if self.x_axis != other.x_axis
            || self.y_axis != other.y_axis
            || self.flow_policy != other.flow_policy
        {
            return Err(Error::IncompatibleMerge(format!(
                "histogram '{}' has different binning or flow policy",
                self.name
            )));
        }
        for (a, b) in self.sumw.iter_mut().zip(&other.sumw) {
            *a += b;
        }
        for (a, b) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *a += b;
        }
        self.out_of_range += other.out_of_range;
        self.entries += other.entries;
        self.rejected += other.rejected;
        Ok(())
    }
}
