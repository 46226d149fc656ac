//! Four-momentum model and the kinematics capability trait
//!
//! Every physics object handed to the aggregation layer only needs to expose
//! its four-momentum: histogram filling, matching and pairing are written
//! against [`Kinematics`] and never against concrete object kinds.

use std::f64::consts::{PI, TAU};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Cartesian four-momentum `(px, py, pz, E)`.
///
/// Derived quantities (`pt`, `eta`, `phi`, `mass`) are pure functions of the
/// stored components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FourMomentum {
    /// x component of the momentum.
    pub px: f64,
    /// y component of the momentum.
    pub py: f64,
    /// z (beam axis) component of the momentum.
    pub pz: f64,
    /// Energy.
    pub e: f64,
}

impl FourMomentum {
    /// Create a four-momentum from Cartesian components.
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Create a four-momentum from `(pt, eta, phi, mass)`.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (px * px + py * py + pz * pz + mass * mass).sqrt();
        Self { px, py, pz, e }
    }

    /// Transverse recoil against a visible system: `(-px, -py, 0, pT)`.
    ///
    /// This is the missing-momentum pseudo-object: massless, purely
    /// transverse, with non-negative energy.
    pub fn missing_transverse(visible: &FourMomentum) -> Self {
        let px = -visible.px;
        let py = -visible.py;
        Self { px, py, pz: 0.0, e: px.hypot(py) }
    }

    /// Squared transverse momentum.
    #[inline]
    pub fn pt2(&self) -> f64 {
        self.px * self.px + self.py * self.py
    }

    /// Transverse momentum.
    #[inline]
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Squared three-momentum magnitude.
    #[inline]
    pub fn p2(&self) -> f64 {
        self.pt2() + self.pz * self.pz
    }

    /// Energy.
    #[inline]
    pub fn energy(&self) -> f64 {
        self.e
    }

    /// Invariant mass squared `E² - |p|²`. Can be negative off-shell.
    #[inline]
    pub fn mass2(&self) -> f64 {
        self.e * self.e - self.p2()
    }

    /// Signed invariant mass: `sign(m²) * sqrt(|m²|)`.
    ///
    /// Never NaN for finite components; space-like combinations come out
    /// negative instead of failing.
    #[inline]
    pub fn mass(&self) -> f64 {
        let m2 = self.mass2();
        m2.signum() * m2.abs().sqrt()
    }

    /// Pseudorapidity `asinh(pz / pt)`.
    ///
    /// Objects along the beam axis (`pt == 0`) map to `±inf` following the
    /// sign of `pz`, and to `0` at rest.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt > 0.0 {
            (self.pz / pt).asinh()
        } else if self.pz > 0.0 {
            f64::INFINITY
        } else if self.pz < 0.0 {
            f64::NEG_INFINITY
        } else {
            0.0
        }
    }

    /// Azimuthal angle in `[0, 2π)`.
    pub fn phi(&self) -> f64 {
        let phi = self.py.atan2(self.px);
        if phi < 0.0 { phi + TAU } else { phi }
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
            e: self.e + rhs.e,
        }
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: FourMomentum) {
        *self = *self + rhs;
    }
}

impl Sum for FourMomentum {
    fn sum<I: Iterator<Item = FourMomentum>>(iter: I) -> Self {
        iter.fold(FourMomentum::default(), Add::add)
    }
}

/// Anything that carries a four-momentum.
///
/// Implementors only provide [`Kinematics::momentum`]; the derived
/// quantities are computed from it.
pub trait Kinematics {
    /// The object's four-momentum.
    fn momentum(&self) -> FourMomentum;

    /// Transverse momentum.
    fn pt(&self) -> f64 {
        self.momentum().pt()
    }

    /// Pseudorapidity.
    fn eta(&self) -> f64 {
        self.momentum().eta()
    }

    /// Azimuthal angle in `[0, 2π)`.
    fn phi(&self) -> f64 {
        self.momentum().phi()
    }

    /// Signed invariant mass.
    fn mass(&self) -> f64 {
        self.momentum().mass()
    }

    /// Energy.
    fn energy(&self) -> f64 {
        self.momentum().energy()
    }
}

impl Kinematics for FourMomentum {
    fn momentum(&self) -> FourMomentum {
        *self
    }
}

impl<T: Kinematics + ?Sized> Kinematics for &T {
    fn momentum(&self) -> FourMomentum {
        (**self).momentum()
    }
}

/// Azimuthal separation folded into `[0, π]`.
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let d = (phi1 - phi2).abs() % TAU;
    if d > PI { TAU - d } else { d }
}

/// Angular separation `ΔR = sqrt(Δη² + Δφ²)` in the pseudorapidity–azimuth plane.
pub fn delta_r<A, B>(a: &A, b: &B) -> f64
where
    A: Kinematics + ?Sized,
    B: Kinematics + ?Sized,
{
    let pa = a.momentum();
    let pb = b.momentum();
    let deta = pa.eta() - pb.eta();
    let dphi = delta_phi(pa.phi(), pb.phi());
    deta.hypot(dphi)
}

/// Invariant mass of the two-object system.
pub fn pair_mass<A, B>(a: &A, b: &B) -> f64
where
    A: Kinematics + ?Sized,
    B: Kinematics + ?Sized,
{
    (a.momentum() + b.momentum()).mass()
}
