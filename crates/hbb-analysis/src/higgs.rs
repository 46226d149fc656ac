//! Boosted Higgs candidate reconstruction.
//!
//! A wide jet is the candidate when its mass sits inside the Higgs window and
//! at least two b-tagged narrow jets lie within `max_delta_r` of it. Wide
//! jets are scanned in descending pT and the first one that qualifies wins,
//! which makes it the highest-pT qualifying jet.

use hbb_core::{Jet, Kinematics, delta_r};

use crate::config::HiggsConfig;

/// A reconstructed Higgs candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct HiggsCandidate {
    /// The wide jet taken as the Higgs.
    pub jet: Jet,
    /// Leading matched b-tagged narrow jet.
    pub leading: Jet,
    /// Subleading matched b-tagged narrow jet.
    pub subleading: Jet,
    /// Total number of matched narrow jets (at least two).
    pub n_matched: usize,
}

fn in_mass_window(jet: &Jet, config: &HiggsConfig) -> bool {
    (jet.mass() - config.target_mass).abs() <= config.mass_window
}

/// b-tagged narrow jets within `max_delta_r` of `wide`, in input order.
pub fn matched_narrow_jets<'a>(
    wide: &Jet,
    narrow: &'a [Jet],
    config: &HiggsConfig,
) -> Vec<&'a Jet> {
    narrow
        .iter()
        .filter(|j| delta_r(wide, *j) <= config.max_delta_r && j.is_b_tagged())
        .collect()
}

/// Scan pT-ordered `wide` jets for the first Higgs candidate.
///
/// A wide jet that passes the mass window but has too few matches does not
/// end the scan.
pub fn reconstruct(wide: &[Jet], narrow: &[Jet], config: &HiggsConfig) -> Option<HiggsCandidate> {
    debug_assert!(wide.windows(2).all(|w| w[0].pt() >= w[1].pt()), "wide jets not pT-ordered");
    for jet in wide {
        if !in_mass_window(jet, config) {
            continue;
        }
        let matched = matched_narrow_jets(jet, narrow, config);
        if matched.len() < config.min_matched.max(2) {
            continue;
        }
        if let [leading, subleading, ..] = matched.as_slice() {
            return Some(HiggsCandidate {
                jet: jet.clone(),
                leading: (*leading).clone(),
                subleading: (*subleading).clone(),
                n_matched: matched.len(),
            });
        }
    }
    None
}
