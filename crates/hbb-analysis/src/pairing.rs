//! Nearest lepton / b-jet pairing.

use hbb_core::{Jet, Kinematics, delta_r, pair_mass};

/// The b-tagged jets closest to a reference object under two metrics.
///
/// The two reductions are independent and may select different jets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestBJets<'a> {
    /// Jet with the smallest `ΔR` to the reference.
    pub min_delta_r: &'a Jet,
    /// `ΔR` of that jet.
    pub delta_r: f64,
    /// Jet giving the smallest invariant mass with the reference.
    pub min_mass: &'a Jet,
    /// Invariant mass of the reference and that jet.
    pub mass: f64,
}

/// Find the minimal-`ΔR` and minimal-mass b-tagged partners of `reference`.
///
/// Untagged jets are skipped. Ties keep the first jet in input order.
/// Returns `None` when no jet is b-tagged.
pub fn nearest_b_jets<'a, R>(reference: &R, jets: &'a [Jet]) -> Option<NearestBJets<'a>>
where
    R: Kinematics + ?Sized,
{
    let mut best: Option<NearestBJets<'a>> = None;
    for jet in jets.iter().filter(|j| j.is_b_tagged()) {
        let dr = delta_r(reference, jet);
        let mass = pair_mass(reference, jet);
        match best.as_mut() {
            None => {
                best = Some(NearestBJets { min_delta_r: jet, delta_r: dr, min_mass: jet, mass });
            }
            Some(b) => {
                if dr < b.delta_r {
                    b.min_delta_r = jet;
                    b.delta_r = dr;
                }
                if mass < b.mass {
                    b.min_mass = jet;
                    b.mass = mass;
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbb_core::{FourMomentum, Particle};

    fn lepton() -> Particle {
        Particle::new(11, FourMomentum::from_pt_eta_phi_m(60.0, 0.0, 0.0, 0.0))
    }

    fn bjet(pt: f64, eta: f64, phi: f64) -> Jet {
        let p = FourMomentum::from_pt_eta_phi_m(pt, eta, phi, 5.0);
        Jet::with_b_tags(p, vec![Particle::new(511, p)])
    }

    #[test]
    fn no_tagged_jets_gives_none() {
        let jets = vec![Jet::new(FourMomentum::from_pt_eta_phi_m(50.0, 0.0, 0.1, 5.0))];
        assert!(nearest_b_jets(&lepton(), &jets).is_none());
        assert!(nearest_b_jets(&lepton(), &[]).is_none());
    }

    #[test]
    fn single_candidate_wins_both() {
        let jets = vec![bjet(80.0, 1.0, 2.0)];
        let n = nearest_b_jets(&lepton(), &jets).unwrap();
        assert!(std::ptr::eq(n.min_delta_r, &jets[0]));
        assert!(std::ptr::eq(n.min_mass, &jets[0]));
    }

    #[test]
    fn reductions_are_independent() {
        // Close but hard jet vs. soft jet further away: the soft one gives the lower mass.
        let jets = vec![bjet(400.0, 0.3, 0.0), bjet(26.0, 0.6, 0.0)];
        let n = nearest_b_jets(&lepton(), &jets).unwrap();
        assert!(std::ptr::eq(n.min_delta_r, &jets[0]));
        assert!(std::ptr::eq(n.min_mass, &jets[1]));
        assert!(n.mass < pair_mass(&lepton(), &jets[0]));
    }

    #[test]
    fn untagged_jets_are_ignored() {
        let untagged = Jet::new(FourMomentum::from_pt_eta_phi_m(30.0, 0.0, 0.05, 5.0));
        let jets = vec![untagged, bjet(80.0, 1.0, 1.0)];
        let n = nearest_b_jets(&lepton(), &jets).unwrap();
        assert!(std::ptr::eq(n.min_delta_r, &jets[1]));
        assert!(std::ptr::eq(n.min_mass, &jets[1]));
    }

    #[test]
    fn ties_keep_first_in_input_order() {
        // Mirror images in pz around a central lepton: identical ΔR and pair mass.
        let mirrored = |pz: f64| {
            let p = FourMomentum::new(40.0, 30.0, pz, 60.0);
            Jet::with_b_tags(p, vec![Particle::new(511, p)])
        };
        let jets = vec![mirrored(25.0), mirrored(-25.0)];
        let n = nearest_b_jets(&lepton(), &jets).unwrap();
        assert_eq!(n.delta_r, delta_r(&lepton(), &jets[1]));
        assert!(std::ptr::eq(n.min_delta_r, &jets[0]));
        assert!(std::ptr::eq(n.min_mass, &jets[0]));

        let swapped = vec![jets[1].clone(), jets[0].clone()];
        let n = nearest_b_jets(&lepton(), &swapped).unwrap();
        assert!(std::ptr::eq(n.min_delta_r, &swapped[0]));
        assert!(std::ptr::eq(n.min_mass, &swapped[0]));
    }

    #[test]
    fn minimising_object_is_tracked_not_only_value() {
        let jets = vec![bjet(90.0, 2.0, 2.0), bjet(70.0, 0.1, 0.1), bjet(60.0, 1.0, 1.0)];
        let n = nearest_b_jets(&lepton(), &jets).unwrap();
        assert!(std::ptr::eq(n.min_delta_r, &jets[1]));
        assert!((n.delta_r - delta_r(&lepton(), &jets[1])).abs() < 1e-12);
    }
}
