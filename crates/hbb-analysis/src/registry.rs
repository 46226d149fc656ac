//! Jet collection registry.
//!
//! Each registered collection is filled twice per event: once with every jet
//! above its threshold and once with the b-tagged subset (`<name>B`).
//! Collections flagged with a leading pair also get the two leading b-jets
//! filled as a pair (`Leading<name>B`).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use hbb_core::{Error, Jet, Result, b_tagged};
use hbb_hist::HistogramBank;

use crate::event::EventView;

/// Particles a jet collection is clustered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleSource {
    /// Visible final state within |η| < 4.2, prompt leptons and neutrinos removed.
    Calo,
    /// Charged final state within |η| < 2.5 and pT > 0.5, prompt leptons removed.
    Track,
}

/// Configuration of one clustered jet collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JetCollectionSpec {
    /// Collection name (histogram prefix).
    pub name: String,
    /// Clustering radius parameter.
    pub radius: f64,
    /// Jets at or below this transverse momentum are not requested.
    pub min_pt: f64,
    /// Constituent particles.
    pub source: ParticleSource,
    /// Also book and fill the two leading b-tagged jets as a pair.
    #[serde(default)]
    pub leading_pair: bool,
}

impl JetCollectionSpec {
    /// Create a collection spec.
    pub fn new(name: impl Into<String>, radius: f64, min_pt: f64, source: ParticleSource) -> Self {
        Self { name: name.into(), radius, min_pt, source, leading_pair: false }
    }

    /// Enable the leading b-jet pair booking.
    pub fn with_leading_pair(mut self) -> Self {
        self.leading_pair = true;
        self
    }

    /// Name of the b-tagged subset collection.
    pub fn b_name(&self) -> String {
        format!("{}B", self.name)
    }

    /// Name of the leading b-jet pair collection.
    pub fn leading_pair_name(&self) -> String {
        format!("Leading{}B", self.name)
    }

    /// Reject unusable constants.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("jet collection name must not be empty".into()));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::Validation(format!(
                "jet collection '{}': radius must be > 0, got {}",
                self.name, self.radius
            )));
        }
        if !self.min_pt.is_finite() || self.min_pt < 0.0 {
            return Err(Error::Validation(format!(
                "jet collection '{}': min_pt must be >= 0, got {}",
                self.name, self.min_pt
            )));
        }
        Ok(())
    }
}

/// Jets requested for one event, keyed by collection name.
pub type EventJets = HashMap<String, Vec<Jet>>;

/// Ordered set of jet collections registered for the run.
#[derive(Debug, Clone)]
pub struct JetCollectionRegistry {
    specs: Vec<JetCollectionSpec>,
}

impl JetCollectionRegistry {
    /// Build a registry, rejecting duplicate or invalid entries.
    pub fn new(specs: Vec<JetCollectionSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::Validation(format!(
                    "jet collection '{}' registered twice",
                    spec.name
                )));
            }
        }
        Ok(Self { specs })
    }

    /// Number of registered collections.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Book the full, b-tagged and (optional) leading-pair histograms of every collection.
    pub fn book(&self, bank: &mut HistogramBank) -> Result<()> {
        for spec in &self.specs {
            bank.book_collection(&spec.name)?;
            bank.book_collection(&spec.b_name())?;
            if spec.leading_pair {
                bank.book_pair(&spec.leading_pair_name())?;
            }
        }
        Ok(())
    }

    /// Request every collection from the event and fill it into `bank`.
    ///
    /// Returns the requested jets so later stages reuse them instead of
    /// asking the provider again.
    pub fn fill<E>(&self, event: &E, bank: &mut HistogramBank, weight: f64) -> Result<EventJets>
    where
        E: EventView + ?Sized,
    {
        let mut out = EventJets::with_capacity(self.specs.len());
        for spec in &self.specs {
            let jets = event.jets(spec)?;
            bank.fill_collection(&spec.name, &jets, weight)?;

            let bjets = b_tagged(&jets);
            bank.fill_collection(&spec.b_name(), &bjets, weight)?;
            if spec.leading_pair && bjets.len() >= 2 {
                bank.fill_pair(&spec.leading_pair_name(), &bjets[0], &bjets[1], weight)?;
            }

            out.insert(spec.name.clone(), jets);
        }
        Ok(out)
    }
}
