//! # hbb-core
//!
//! Shared building blocks for the boosted H→bb analysis: the four-momentum
//! model and [`Kinematics`] capability trait, reconstructed physics objects,
//! run bookkeeping and the common error type.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kinematics;
pub mod objects;
pub mod types;

pub use error::{Error, Result};
pub use kinematics::{FourMomentum, Kinematics, delta_phi, delta_r, pair_mass};
pub use objects::{Jet, Particle, b_tagged, jets_by_pt, sort_by_pt};
pub use types::WeightTally;
