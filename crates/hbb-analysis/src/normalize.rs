//! Cross-section normalisation of a finished bank.

use hbb_core::{Error, Result, WeightTally};
use hbb_hist::HistogramBank;

/// `cross_section / sum_w`, rejecting a sum of weights that cannot be divided by.
///
/// A sum is unusable when it is zero, subnormal or non-finite, or when it is
/// indistinguishable from rounding noise on the run's weights
/// (`|Σw| <= ε · n · sqrt(Σw²)`), as happens when mixed-sign weights cancel.
pub fn norm_factor(cross_section: f64, tally: &WeightTally) -> Result<f64> {
    if !cross_section.is_finite() {
        return Err(Error::Normalization(format!("non-finite cross-section {cross_section}")));
    }
    let sum_w = tally.sum_w;
    if !sum_w.is_normal() {
        return Err(Error::Normalization(format!(
            "sum of weights {sum_w} is zero, subnormal or non-finite"
        )));
    }
    let noise = f64::EPSILON * tally.n_events as f64 * tally.sum_w2.sqrt();
    if sum_w.abs() <= noise {
        return Err(Error::Normalization(format!(
            "sum of weights {sum_w} over {} events is below the rounding scale {noise:e}",
            tally.n_events
        )));
    }
    Ok(cross_section / sum_w)
}

/// Scale every histogram in `bank` to `cross_section` using the run's tally.
///
/// Returns the applied factor.
pub fn normalize(bank: &mut HistogramBank, cross_section: f64, tally: &WeightTally) -> Result<f64> {
    let factor = norm_factor(cross_section, tally)?;
    log::info!(
        "normalizing {} collections: xs={cross_section} sum_w={} factor={factor}",
        bank.len(),
        tally.sum_w
    );
    bank.normalize(factor)?;
    Ok(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hbb_core::FourMomentum;

    fn tally(weights: &[f64]) -> WeightTally {
        let mut t = WeightTally::default();
        weights.iter().for_each(|&w| t.record(w));
        t
    }

    #[test]
    fn factor_is_xs_over_sum_w() {
        assert_relative_eq!(norm_factor(10.0, &tally(&[1.0, 1.0])).unwrap(), 5.0);
        assert_relative_eq!(norm_factor(3.0, &tally(&[-1.5])).unwrap(), -2.0);
        assert_relative_eq!(norm_factor(1.0, &tally(&[2.0, -1.0, 0.5])).unwrap(), 1.0 / 1.5);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        for sum_w in [0.0, -0.0, f64::MIN_POSITIVE / 2.0, f64::NAN, f64::INFINITY] {
            let t = WeightTally { n_events: 1, sum_w, sum_w2: 1.0 };
            assert!(matches!(norm_factor(1.0, &t), Err(Error::Normalization(_))), "{sum_w}");
        }
        assert!(matches!(norm_factor(1.0, &WeightTally::default()), Err(Error::Normalization(_))));
        assert!(matches!(norm_factor(f64::NAN, &tally(&[1.0])), Err(Error::Normalization(_))));
    }

    #[test]
    fn cancelling_weights_are_rejected() {
        let t = tally(&[0.1, 0.2, -0.3]);
        assert!(t.sum_w != 0.0);
        assert!(matches!(norm_factor(1.0, &t), Err(Error::Normalization(_))));

        let mut bank = HistogramBank::default();
        bank.book_single("S").unwrap();
        assert!(normalize(&mut bank, 1.0, &t).is_err());
        assert_eq!(bank.norm_factor(), None);
    }

    #[test]
    fn every_bin_is_scaled() {
        let mut bank = HistogramBank::default();
        bank.book_pair("P").unwrap();
        let mut tally = WeightTally::default();
        for _ in 0..2 {
            tally.record(1.0);
            let a = FourMomentum::from_pt_eta_phi_m(100.0, 0.0, 0.0, 0.0);
            let b = FourMomentum::from_pt_eta_phi_m(80.0, 0.5, 1.0, 0.0);
            bank.fill_pair("P", &a, &b, 1.0).unwrap();
        }
        let before = bank.clone();

        let factor = normalize(&mut bank, 10.0, &tally).unwrap();
        assert_relative_eq!(factor, 5.0);
        assert_eq!(bank.norm_factor(), Some(5.0));

        let (old, new) = (before.get("P").unwrap(), bank.get("P").unwrap());
        for (h0, h1) in old.histos_1d().into_iter().zip(new.histos_1d()) {
            for (a, b) in h0.sumw.iter().zip(&h1.sumw) {
                assert_relative_eq!(*b, 5.0 * a);
            }
            for (a, b) in h0.sumw2.iter().zip(&h1.sumw2) {
                assert_relative_eq!(*b, 25.0 * a);
            }
        }
        for (h0, h1) in old.histos_2d().into_iter().zip(new.histos_2d()) {
            assert_relative_eq!(h1.integral(), 5.0 * h0.integral());
        }
    }

    #[test]
    fn failed_normalization_leaves_bank_untouched() {
        let mut bank = HistogramBank::default();
        bank.book_single("S").unwrap();
        assert!(normalize(&mut bank, 1.0, &WeightTally::default()).is_err());
        assert_eq!(bank.norm_factor(), None);
    }
}
