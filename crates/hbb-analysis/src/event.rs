//! Per-event object provider.
//!
//! The host owns clustering and final-state selection; the analysis only
//! sees an [`EventView`]. [`EventRecord`] is a self-contained view that can
//! be read from JSON lines.

use std::collections::HashMap;
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use hbb_core::{Error, FourMomentum, Jet, Particle, Result, jets_by_pt, sort_by_pt};

use crate::registry::JetCollectionSpec;

/// Objects available for one event.
pub trait EventView {
    /// Event weight (may be negative).
    fn weight(&self) -> f64;

    /// Selected charged leptons, ordered by descending pT.
    fn leptons(&self) -> Vec<Particle>;

    /// Missing transverse momentum pseudo-object.
    fn missing_momentum(&self) -> FourMomentum;

    /// Jets of `collection` above its `min_pt`, ordered by descending pT.
    fn jets(&self, collection: &JetCollectionSpec) -> Result<Vec<Jet>>;
}

/// A fully materialised event, as written by the generator-side host.
///
/// Jets are stored already clustered, keyed by collection name. Ordering and
/// thresholds are applied on access, so records may be written unsorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Selected charged leptons.
    #[serde(default)]
    pub leptons: Vec<Particle>,
    /// Sum of the visible final-state momenta.
    #[serde(default)]
    pub visible_momentum: FourMomentum,
    /// Clustered jets per collection name.
    #[serde(default)]
    pub jets: HashMap<String, Vec<Jet>>,
}

fn default_weight() -> f64 {
    1.0
}

impl EventRecord {
    /// Create an empty event with the given weight.
    pub fn new(weight: f64) -> Self {
        Self { weight, ..Default::default() }
    }

    /// Add a lepton.
    pub fn lepton(mut self, lepton: Particle) -> Self {
        self.leptons.push(lepton);
        self
    }

    /// Add jets to a collection.
    pub fn with_jets(mut self, collection: impl Into<String>, jets: Vec<Jet>) -> Self {
        self.jets.entry(collection.into()).or_default().extend(jets);
        self
    }

    /// Set the visible momentum sum.
    pub fn visible(mut self, visible: FourMomentum) -> Self {
        self.visible_momentum = visible;
        self
    }
}

impl EventView for EventRecord {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn leptons(&self) -> Vec<Particle> {
        let mut leptons = self.leptons.clone();
        sort_by_pt(&mut leptons);
        leptons
    }

    fn missing_momentum(&self) -> FourMomentum {
        FourMomentum::missing_transverse(&self.visible_momentum)
    }

    fn jets(&self, collection: &JetCollectionSpec) -> Result<Vec<Jet>> {
        match self.jets.get(&collection.name) {
            Some(jets) => Ok(jets_by_pt(jets, collection.min_pt)),
            None => Ok(Vec::new()),
        }
    }
}

/// Read one [`EventRecord`] per non-empty line.
///
/// Line numbers (1-based) are reported in parse errors.
pub fn read_json_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<EventRecord>> {
    reader.lines().enumerate().filter_map(|(i, line)| match line {
        Err(e) => Some(Err(Error::Io(e))),
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(
            serde_json::from_str(&line)
                .map_err(|e| Error::Validation(format!("event line {}: {e}", i + 1))),
        ),
    })
}
