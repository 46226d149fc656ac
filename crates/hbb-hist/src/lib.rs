//! # hbb-hist
//!
//! Weighted histogram accumulators and the named-collection histogram bank
//! the analysis fills.
//!
//! ## Example
//!
//! ```
//! use hbb_core::FourMomentum;
//! use hbb_hist::HistogramBank;
//!
//! let mut bank = HistogramBank::default();
//! bank.book_single("Higgs").unwrap();
//! let higgs = FourMomentum::from_pt_eta_phi_m(400.0, 0.3, 1.2, 125.0);
//! bank.fill_single("Higgs", &higgs, 1.0).unwrap();
//! assert_eq!(bank.get("Higgs").unwrap().four_mom().pt.entries, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod axis;
pub mod bank;
pub mod histogram;

pub use axis::{Axis, AxisSpec, BinLocation, FlowPolicy};
pub use bank::{
    Booking, BookingKind, FourMomHistos, HistogramBank, HistogramSchema, LabelConfig, PairHistos,
};
pub use histogram::{Histo1D, Histo2D};
