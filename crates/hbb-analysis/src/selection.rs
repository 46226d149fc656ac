//! Event-level lepton selection.

use std::fmt;

use hbb_core::{Kinematics, Particle, pair_mass};

use crate::config::SelectionConfig;

/// Why an event was skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Veto {
    /// No selected lepton.
    NoLeptons,
    /// The two leading leptons are outside the dilepton mass window.
    DileptonMassWindow {
        /// Invariant mass of the two leading leptons.
        mass: f64,
    },
}

impl fmt::Display for Veto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Veto::NoLeptons => write!(f, "no leptons"),
            Veto::DileptonMassWindow { mass } => {
                write!(f, "dilepton mass {mass:.2} outside window")
            }
        }
    }
}

/// Apply the lepton cuts to a pT-ordered lepton list.
///
/// Returns the reason to skip the event, or `None` if it passes. The two
/// cuts are independent: at least one lepton is required, and when two or
/// more are present the leading pair must sit inside the dilepton window.
pub fn check_leptons(config: &SelectionConfig, leptons: &[Particle]) -> Option<Veto> {
    if leptons.is_empty() {
        return Some(Veto::NoLeptons);
    }
    if let [first, second, ..] = leptons {
        let mass = pair_mass(first, second);
        if (mass - config.dilepton_mass).abs() > config.dilepton_window {
            return Some(Veto::DileptonMassWindow { mass });
        }
    }
    debug_assert!(leptons.windows(2).all(|w| w[0].pt() >= w[1].pt()), "leptons not pT-ordered");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbb_core::FourMomentum;

    /// Back-to-back massless leptons with invariant mass `m`.
    fn dilepton(m: f64) -> Vec<Particle> {
        let e = m / 2.0;
        vec![
            Particle::new(11, FourMomentum::new(e, 0.0, 0.0, e)),
            Particle::new(-11, FourMomentum::new(-e, 0.0, 0.0, e)),
        ]
    }

    #[test]
    fn no_leptons_vetoes() {
        assert_eq!(check_leptons(&SelectionConfig::default(), &[]), Some(Veto::NoLeptons));
    }

    #[test]
    fn single_lepton_passes() {
        let leptons = vec![Particle::new(13, FourMomentum::new(30.0, 0.0, 0.0, 30.0))];
        assert_eq!(check_leptons(&SelectionConfig::default(), &leptons), None);
    }

    #[test]
    fn dilepton_window_is_inclusive() {
        let cfg = SelectionConfig::default();
        assert_eq!(check_leptons(&cfg, &dilepton(91.2)), None);
        // Exactly 15 away from 90 on either side.
        assert_eq!(pair_mass(&dilepton(105.0)[0], &dilepton(105.0)[1]), 105.0);
        assert_eq!(check_leptons(&cfg, &dilepton(105.0)), None);
        assert_eq!(pair_mass(&dilepton(75.0)[0], &dilepton(75.0)[1]), 75.0);
        assert_eq!(check_leptons(&cfg, &dilepton(75.0)), None);
        assert!(matches!(
            check_leptons(&cfg, &dilepton(106.0)),
            Some(Veto::DileptonMassWindow { .. })
        ));
        assert!(matches!(
            check_leptons(&cfg, &dilepton(60.0)),
            Some(Veto::DileptonMassWindow { .. })
        ));
    }

    #[test]
    fn custom_window() {
        let cfg = SelectionConfig { dilepton_mass: 91.0, dilepton_window: 5.0 };
        assert!(check_leptons(&cfg, &dilepton(98.0)).is_some());
    }
}
