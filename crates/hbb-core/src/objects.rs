//! Reconstructed physics objects: leptons and jets.

use serde::{Deserialize, Serialize};

use crate::kinematics::{FourMomentum, Kinematics};

/// A final-state particle (leptons, b-hadron tags).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// PDG particle id. Informational only; the analysis never branches on it.
    #[serde(default)]
    pub pid: i32,
    /// Four-momentum.
    pub momentum: FourMomentum,
}

impl Particle {
    /// Create a particle.
    pub fn new(pid: i32, momentum: FourMomentum) -> Self {
        Self { pid, momentum }
    }
}

impl Kinematics for Particle {
    fn momentum(&self) -> FourMomentum {
        self.momentum
    }
}

/// A clustered jet with the b-hadrons ghost-associated to it by the clusterer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    /// Four-momentum.
    pub momentum: FourMomentum,
    /// Tagging b-hadrons; assigned at construction and never mutated.
    #[serde(default)]
    pub b_tags: Vec<Particle>,
}

impl Jet {
    /// Create an untagged jet.
    pub fn new(momentum: FourMomentum) -> Self {
        Self { momentum, b_tags: Vec::new() }
    }

    /// Create a jet carrying the given b-tags.
    pub fn with_b_tags(momentum: FourMomentum, b_tags: Vec<Particle>) -> Self {
        Self { momentum, b_tags }
    }

    /// True when at least one b-hadron is associated to the jet.
    #[inline]
    pub fn is_b_tagged(&self) -> bool {
        !self.b_tags.is_empty()
    }
}

impl Kinematics for Jet {
    fn momentum(&self) -> FourMomentum {
        self.momentum
    }
}

/// Sort objects by descending transverse momentum (stable).
pub fn sort_by_pt<T: Kinematics>(objects: &mut [T]) {
    objects.sort_by(|a, b| b.pt().total_cmp(&a.pt()));
}

/// Keep jets strictly above `min_pt`, ordered by descending transverse momentum.
pub fn jets_by_pt(jets: &[Jet], min_pt: f64) -> Vec<Jet> {
    let mut out: Vec<Jet> = jets.iter().filter(|j| j.pt() > min_pt).cloned().collect();
    sort_by_pt(&mut out);
    out
}

/// b-tagged subset of `jets`, preserving order.
pub fn b_tagged(jets: &[Jet]) -> Vec<Jet> {
    jets.iter().filter(|j| j.is_b_tagged()).cloned().collect()
}
