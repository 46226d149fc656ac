//! BoostedHbb: the per-event driver.
//!
//! Owns the histogram bank and the weight tally for a run (or a partial run
//! when events are split across workers). Every event goes through the same
//! stages: lepton veto, lepton and missing-momentum fills, the jet collection
//! registry, Higgs reconstruction and nearest lepton/b-jet pairing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use hbb_core::{Error, Result, WeightTally};
use hbb_hist::HistogramBank;

use crate::config::AnalysisConfig;
use crate::event::EventView;
use crate::higgs::reconstruct;
use crate::normalize::normalize;
use crate::pairing::nearest_b_jets;
use crate::registry::JetCollectionRegistry;
use crate::selection::{Veto, check_leptons};

/// Selected leptons (collection).
pub const LEPTONS: &str = "Leptons";
/// The two leading leptons (pair).
pub const LEPTON_PAIR: &str = "LeptonPair";
/// Missing transverse momentum (single).
pub const MISSING_MOMENTUM: &str = "MissingMomentum";
/// Higgs candidate wide jet (single).
pub const HIGGS: &str = "Higgs";
/// The two leading b-tagged narrow jets matched to the Higgs candidate (pair).
pub const HIGGS_TRACK_JETS: &str = "HiggsTrackJets";
/// Leading lepton and its minimal-`ΔR` b-tagged track jet (pair).
pub const MIN_DELTA_R_LEPTON_TRACK_JET_B: &str = "MinDeltaRLeptonTrackJetB";
/// Leading lepton and the b-tagged track jet minimising their mass (pair).
pub const MIN_MASS_LEPTON_TRACK_JET_B: &str = "MinMassLeptonTrackJetB";

/// Event counts per selection outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cutflow {
    /// Events vetoed for having no lepton.
    pub no_leptons: u64,
    /// Events vetoed by the dilepton mass window.
    pub dilepton_mass_window: u64,
    /// Events passing the selection.
    pub accepted: u64,
    /// Accepted events with a Higgs candidate.
    pub higgs_candidates: u64,
}

impl Cutflow {
    fn record_veto(&mut self, veto: Veto) {
        match veto {
            Veto::NoLeptons => self.no_leptons += 1,
            Veto::DileptonMassWindow { .. } => self.dilepton_mass_window += 1,
        }
    }

    /// Events vetoed for any reason.
    pub fn vetoed(&self) -> u64 {
        self.no_leptons + self.dilepton_mass_window
    }

    /// Add another cutflow (from a partial run) into this one.
    pub fn merge(&mut self, other: &Cutflow) {
        self.no_leptons += other.no_leptons;
        self.dilepton_mass_window += other.dilepton_mass_window;
        self.accepted += other.accepted;
        self.higgs_candidates += other.higgs_candidates;
    }
}

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOutcome {
    /// Skipped without any fill.
    Vetoed(Veto),
    /// Filled.
    Accepted {
        /// A Higgs candidate was found and filled.
        higgs: bool,
    },
}

/// Per-event boosted H→bb analysis.
#[derive(Debug, Clone)]
pub struct BoostedHbb {
    config: AnalysisConfig,
    registry: JetCollectionRegistry,
    bank: HistogramBank,
    tally: WeightTally,
    cutflow: Cutflow,
}

impl BoostedHbb {
    /// Validate `config` and book every histogram collection.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let registry = JetCollectionRegistry::new(config.collections.clone())?;
        let mut bank = HistogramBank::new(config.histograms.clone());

        bank.book_collection(LEPTONS)?;
        bank.book_pair(LEPTON_PAIR)?;
        bank.book_single(MISSING_MOMENTUM)?;
        registry.book(&mut bank)?;
        bank.book_single(HIGGS)?;
        bank.book_pair(HIGGS_TRACK_JETS)?;
        bank.book_pair(MIN_DELTA_R_LEPTON_TRACK_JET_B)?;
        bank.book_pair(MIN_MASS_LEPTON_TRACK_JET_B)?;
        log::debug!(
            "booked {} histogram collections for {} jet collections",
            bank.len(),
            registry.len()
        );

        Ok(Self {
            config,
            registry,
            bank,
            tally: WeightTally::default(),
            cutflow: Cutflow::default(),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Histograms filled so far.
    pub fn bank(&self) -> &HistogramBank {
        &self.bank
    }

    /// Weights of every event seen, vetoed ones included.
    pub fn tally(&self) -> &WeightTally {
        &self.tally
    }

    /// Selection outcome counts.
    pub fn cutflow(&self) -> &Cutflow {
        &self.cutflow
    }

    /// Process one event.
    ///
    /// Vetoes are reported through the outcome; errors are only returned for
    /// bookkeeping failures, which leave the bank in an unspecified state.
    pub fn analyze<E>(&mut self, event: &E) -> Result<EventOutcome>
    where
        E: EventView + ?Sized,
    {
        let weight = event.weight();
        self.tally.record(weight);

        let leptons = event.leptons();
        if let Some(veto) = check_leptons(&self.config.selection, &leptons) {
            log::debug!("event {} vetoed: {veto}", self.tally.n_events);
            self.cutflow.record_veto(veto);
            return Ok(EventOutcome::Vetoed(veto));
        }
        self.cutflow.accepted += 1;

        self.bank.fill_collection(LEPTONS, &leptons, weight)?;
        if let [first, second, ..] = leptons.as_slice() {
            self.bank.fill_pair(LEPTON_PAIR, first, second, weight)?;
        }
        self.bank.fill_single(MISSING_MOMENTUM, &event.missing_momentum(), weight)?;

        let jets = self.registry.fill(event, &mut self.bank, weight)?;
        let collection = |name: &str| jets.get(name).map(Vec::as_slice).unwrap_or(&[]);

        let higgs = reconstruct(
            collection(&self.config.higgs.wide_collection),
            collection(&self.config.higgs.narrow_collection),
            &self.config.higgs,
        );
        if let Some(candidate) = &higgs {
            log::trace!(
                "higgs candidate: m={:.1} pt={:.1} matched={}",
                candidate.jet.momentum.mass(),
                candidate.jet.momentum.pt(),
                candidate.n_matched
            );
            self.cutflow.higgs_candidates += 1;
            self.bank.fill_single(HIGGS, &candidate.jet, weight)?;
            let (leading, subleading) = (&candidate.leading, &candidate.subleading);
            self.bank.fill_pair(HIGGS_TRACK_JETS, leading, subleading, weight)?;
        }

        let paired = collection(&self.config.pairing.collection);
        let nearest = leptons.first().and_then(|l| nearest_b_jets(l, paired).map(|n| (l, n)));
        if let Some((lepton, nearest)) = nearest {
            let bank = &mut self.bank;
            bank.fill_pair(MIN_DELTA_R_LEPTON_TRACK_JET_B, lepton, nearest.min_delta_r, weight)?;
            bank.fill_pair(MIN_MASS_LEPTON_TRACK_JET_B, lepton, nearest.min_mass, weight)?;
        }

        Ok(EventOutcome::Accepted { higgs: higgs.is_some() })
    }

    /// Sum a partial run into this one.
    ///
    /// Both must use the same configuration. On error `self` is unchanged.
    pub fn merge(&mut self, other: &BoostedHbb) -> Result<()> {
        if self.config != other.config {
            return Err(Error::IncompatibleMerge(
                "partial runs use different configurations".into(),
            ));
        }
        self.bank.merge(&other.bank)?;
        self.tally.merge(&other.tally);
        self.cutflow.merge(&other.cutflow);
        Ok(())
    }

    /// Unnormalised output, suitable for merging with other partial runs.
    pub fn into_output(self, cross_section: f64) -> RunOutput {
        RunOutput { cross_section, tally: self.tally, cutflow: self.cutflow, bank: self.bank }
    }

    /// Normalise the bank to `cross_section` and return the run output.
    pub fn finalize(self, cross_section: f64) -> Result<RunOutput> {
        let mut output = self.into_output(cross_section);
        output.normalize()?;
        Ok(output)
    }
}

/// Serialisable result of a (partial) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Cross-section the bank is (or will be) normalised to.
    pub cross_section: f64,
    /// Weights of every event seen.
    pub tally: WeightTally,
    /// Selection outcome counts.
    pub cutflow: Cutflow,
    /// Histograms.
    pub bank: HistogramBank,
}

impl RunOutput {
    /// True once the bank has been scaled to the cross-section.
    pub fn is_normalized(&self) -> bool {
        self.bank.norm_factor().is_some()
    }

    /// Scale the bank by `cross_section / sum_w`, returning the factor.
    pub fn normalize(&mut self) -> Result<f64> {
        normalize(&mut self.bank, self.cross_section, &self.tally)
    }

    /// Sum another unnormalised partial output into this one.
    pub fn merge(&mut self, other: &RunOutput) -> Result<()> {
        let scale = self.cross_section.abs().max(other.cross_section.abs()).max(1.0);
        if (self.cross_section - other.cross_section).abs() > 1e-12 * scale {
            return Err(Error::IncompatibleMerge(format!(
                "cross-sections differ: {} vs {}",
                self.cross_section, other.cross_section
            )));
        }
        self.bank.merge(&other.bank)?;
        self.tally.merge(&other.tally);
        self.cutflow.merge(&other.cutflow);
        Ok(())
    }

    /// Read an output written by [`RunOutput::write_json`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
