//! Configuration types for the per-event analysis.
//!
//! Every cut constant lives here rather than in the algorithms, and the whole
//! tree deserializes from YAML (or JSON) with each field defaulted to the
//! standard boosted H→bb setup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use hbb_core::{Error, Result};
use hbb_hist::HistogramSchema;

use crate::registry::{JetCollectionSpec, ParticleSource};

/// Event-level lepton cuts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Reference dilepton mass (Z boson).
    pub dilepton_mass: f64,
    /// Maximum allowed `|m(ℓℓ) - dilepton_mass|`.
    pub dilepton_window: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { dilepton_mass: 90.0, dilepton_window: 15.0 }
    }
}

/// Higgs candidate matching parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiggsConfig {
    /// Collection providing the wide (large-R) jets.
    pub wide_collection: String,
    /// Collection providing the narrow jets matched to the wide jet.
    pub narrow_collection: String,
    /// Target Higgs mass.
    pub target_mass: f64,
    /// Maximum allowed `|m(wide jet) - target_mass|`.
    pub mass_window: f64,
    /// Maximum `ΔR(wide, narrow)` for a narrow jet to be matched.
    pub max_delta_r: f64,
    /// Minimum number of matched b-tagged narrow jets.
    pub min_matched: usize,
}

impl Default for HiggsConfig {
    fn default() -> Self {
        Self {
            wide_collection: "AntiKt10CaloJets".into(),
            narrow_collection: "AntiKt03TrackJets".into(),
            target_mass: 125.0,
            mass_window: 30.0,
            max_delta_r: 1.0,
            min_matched: 2,
        }
    }
}

/// Lepton to b-jet nearest-neighbour pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Collection whose b-tagged jets are paired with the leading lepton.
    pub collection: String,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self { collection: "AntiKt03TrackJets".into() }
    }
}

/// Top-level analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Lepton cuts.
    pub selection: SelectionConfig,
    /// Registered jet collections, in fill order.
    pub collections: Vec<JetCollectionSpec>,
    /// Higgs candidate reconstruction.
    pub higgs: HiggsConfig,
    /// Nearest lepton/b-jet pairing.
    pub pairing: PairingConfig,
    /// Binning and labels for every booked histogram.
    pub histograms: HistogramSchema,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            collections: default_collections(),
            higgs: HiggsConfig::default(),
            pairing: PairingConfig::default(),
            histograms: HistogramSchema::default(),
        }
    }
}

/// The standard calorimeter and track jet collections.
pub fn default_collections() -> Vec<JetCollectionSpec> {
    vec![
        JetCollectionSpec::new("AntiKt04CaloJets", 0.4, 25.0, ParticleSource::Calo)
            .with_leading_pair(),
        JetCollectionSpec::new("AntiKt10CaloJets", 1.0, 250.0, ParticleSource::Calo),
        JetCollectionSpec::new("AntiKt03TrackJets", 0.3, 25.0, ParticleSource::Track)
            .with_leading_pair(),
    ]
}

fn require_finite_non_negative(what: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(format!("{what} must be finite and >= 0, got {value}")));
    }
    Ok(())
}

impl AnalysisConfig {
    /// Read a YAML or JSON configuration file and validate it.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let config: AnalysisConfig = serde_yaml_ng::from_slice(&bytes)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML (or JSON) document and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: AnalysisConfig =
            serde_yaml_ng::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        require_finite_non_negative("selection.dilepton_mass", self.selection.dilepton_mass)?;
        require_finite_non_negative("selection.dilepton_window", self.selection.dilepton_window)?;
        require_finite_non_negative("higgs.target_mass", self.higgs.target_mass)?;
        require_finite_non_negative("higgs.mass_window", self.higgs.mass_window)?;
        require_finite_non_negative("higgs.max_delta_r", self.higgs.max_delta_r)?;
        if self.higgs.min_matched < 2 {
            return Err(Error::Validation(format!(
                "higgs.min_matched must be >= 2 to form a jet pair, got {}",
                self.higgs.min_matched
            )));
        }
        for spec in &self.collections {
            spec.validate()?;
        }
        for (what, name) in [
            ("higgs.wide_collection", &self.higgs.wide_collection),
            ("higgs.narrow_collection", &self.higgs.narrow_collection),
            ("pairing.collection", &self.pairing.collection),
        ] {
            if !self.collections.iter().any(|c| &c.name == name) {
                return Err(Error::Validation(format!(
                    "{what} refers to unregistered jet collection '{name}'"
                )));
            }
        }
        self.histograms.validate()
    }
}
