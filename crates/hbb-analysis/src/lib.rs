//! # hbb-analysis
//!
//! Per-event boosted H→bb analysis: lepton selection, jet collection
//! registry, Higgs candidate reconstruction, nearest lepton/b-jet pairing and
//! cross-section normalisation of the resulting histogram bank.
//!
//! ## Example
//!
//! ```
//! use hbb_analysis::{AnalysisConfig, BoostedHbb, EventRecord};
//! use hbb_core::{FourMomentum, Particle};
//!
//! let mut analysis = BoostedHbb::new(AnalysisConfig::default()).unwrap();
//! let lepton = Particle::new(11, FourMomentum::from_pt_eta_phi_m(40.0, 0.2, 1.0, 0.0));
//! analysis.analyze(&EventRecord::new(1.0).lepton(lepton)).unwrap();
//! let output = analysis.finalize(2.5).unwrap();
//! assert_eq!(output.bank.norm_factor(), Some(2.5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod event;
pub mod higgs;
pub mod normalize;
pub mod pairing;
pub mod parallel;
pub mod registry;
pub mod selection;

pub use analysis::{BoostedHbb, Cutflow, EventOutcome, RunOutput};
pub use config::{AnalysisConfig, HiggsConfig, PairingConfig, SelectionConfig, default_collections};
pub use event::{EventRecord, EventView, read_json_lines};
pub use higgs::{HiggsCandidate, reconstruct};
pub use normalize::{norm_factor, normalize};
pub use pairing::{NearestBJets, nearest_b_jets};
pub use parallel::{DEFAULT_CHUNK_SIZE, process_parallel, process_sequential};
pub use registry::{EventJets, JetCollectionRegistry, JetCollectionSpec, ParticleSource};
pub use selection::{Veto, check_leptons};
