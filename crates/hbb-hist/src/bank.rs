//! Named-collection histogram bank.
//!
//! Every collection name maps to a fixed-field [`Booking`] record, so once a
//! name is booked all of its distributions exist by construction. Three
//! booking shapes share one four-momentum schema:
//!
//! | shape | histograms |
//! |---|---|
//! | single | `pt`, `eta`, `m`, `m_pt` |
//! | collection | single + `n` |
//! | pair | single (of the summed momentum) + `dr`, `dr_pt`, `pt_pt` |
//!
//! Histogram names are `<collection>_<key>`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hbb_core::{Error, FourMomentum, Kinematics, Result, delta_r};

use crate::axis::{Axis, AxisSpec, FlowPolicy};
use crate::histogram::{Histo1D, Histo2D};

/// Axis titles used when booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Transverse momentum label.
    pub pt: String,
    /// Pseudorapidity label.
    pub eta: String,
    /// Mass label.
    pub mass: String,
    /// Angular separation label.
    pub delta_r: String,
    /// Multiplicity label.
    pub multiplicity: String,
    /// Unit appended to momentum and mass axes.
    pub momentum_unit: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            pt: "$p_T$".into(),
            eta: "$\\eta$".into(),
            mass: "mass".into(),
            delta_r: "$\\Delta R$".into(),
            multiplicity: "multiplicity".into(),
            momentum_unit: "GeV".into(),
        }
    }
}

impl LabelConfig {
    fn with_unit(&self, label: &str) -> String {
        if self.momentum_unit.is_empty() {
            label.to_string()
        } else {
            format!("{label} [{}]", self.momentum_unit)
        }
    }
}

/// Binning and labels shared by every booked collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramSchema {
    /// Transverse momentum binning.
    pub pt: AxisSpec,
    /// Pseudorapidity binning.
    pub eta: AxisSpec,
    /// Mass binning.
    pub mass: AxisSpec,
    /// Angular separation binning.
    pub delta_r: AxisSpec,
    /// Multiplicity binning.
    pub multiplicity: AxisSpec,
    /// Under/overflow policy for every histogram.
    pub flow_policy: FlowPolicy,
    /// Axis titles.
    pub labels: LabelConfig,
}

impl Default for HistogramSchema {
    fn default() -> Self {
        Self {
            pt: AxisSpec::new(50, 0.0, 2000.0),
            eta: AxisSpec::new(50, -5.0, 5.0),
            mass: AxisSpec::new(50, 0.0, 500.0),
            delta_r: AxisSpec::new(50, 0.0, 5.0),
            multiplicity: AxisSpec::new(10, 0.0, 10.0),
            flow_policy: FlowPolicy::Drop,
            labels: LabelConfig::default(),
        }
    }
}

impl HistogramSchema {
    /// Check that every binning request yields a valid axis.
    pub fn validate(&self) -> Result<()> {
        for (what, spec) in [
            ("pt", &self.pt),
            ("eta", &self.eta),
            ("mass", &self.mass),
            ("delta_r", &self.delta_r),
            ("multiplicity", &self.multiplicity),
        ] {
            Axis::uniform(spec)
                .map_err(|e| Error::Validation(format!("invalid {what} binning: {e}")))?;
        }
        Ok(())
    }

    fn book_1d(&self, name: String, spec: &AxisSpec, x_label: String) -> Result<Histo1D> {
        let y_label = format!("events / {:.2}", spec.bin_width());
        let title = x_label.clone();
        Ok(Histo1D::new(name, Axis::uniform(spec)?, self.flow_policy)
            .with_labels(title, x_label, y_label))
    }

    fn book_2d(
        &self,
        name: String,
        (x_spec, x_label): (&AxisSpec, String),
        (y_spec, y_label): (&AxisSpec, String),
    ) -> Result<Histo2D> {
        let z_label =
            format!("events / {:.2} / {:.2}", x_spec.bin_width(), y_spec.bin_width());
        let title = format!("{y_label} vs {x_label}");
        Ok(Histo2D::new(name, Axis::uniform(x_spec)?, Axis::uniform(y_spec)?, self.flow_policy)
            .with_labels(title, x_label, y_label, z_label))
    }
}

fn hist_name(collection: &str, key: &str) -> String {
    format!("{collection}_{key}")
}

/// Distributions every booking carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FourMomHistos {
    /// Transverse momentum.
    pub pt: Histo1D,
    /// Pseudorapidity.
    pub eta: Histo1D,
    /// Mass.
    pub m: Histo1D,
    /// Mass (y) against transverse momentum (x).
    pub m_pt: Histo2D,
}

impl FourMomHistos {
    fn book(name: &str, schema: &HistogramSchema) -> Result<Self> {
        let labels = &schema.labels;
        let pt_label = labels.with_unit(&labels.pt);
        let mass_label = labels.with_unit(&labels.mass);
        Ok(Self {
            pt: schema.book_1d(hist_name(name, "pt"), &schema.pt, pt_label.clone())?,
            eta: schema.book_1d(hist_name(name, "eta"), &schema.eta, labels.eta.clone())?,
            m: schema.book_1d(hist_name(name, "m"), &schema.mass, mass_label.clone())?,
            m_pt: schema.book_2d(
                hist_name(name, "m_pt"),
                (&schema.pt, pt_label),
                (&schema.mass, mass_label),
            )?,
        })
    }

    fn fill(&mut self, p: &FourMomentum, weight: f64) {
        let (pt, mass) = (p.pt(), p.mass());
        self.pt.fill(pt, weight);
        self.eta.fill(p.eta(), weight);
        self.m.fill(mass, weight);
        self.m_pt.fill(pt, mass, weight);
    }

    fn merge(&mut self, other: &FourMomHistos) -> Result<()> {
        self.pt.merge(&other.pt)?;
        self.eta.merge(&other.eta)?;
        self.m.merge(&other.m)?;
        self.m_pt.merge(&other.m_pt)
    }
}

/// Extra distributions of a two-object booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairHistos {
    /// Angular separation of the constituents.
    pub dr: Histo1D,
    /// Separation (y) against the transverse momentum of the pair (x).
    pub dr_pt: Histo2D,
    /// Second constituent's transverse momentum (y) against the first's (x).
    pub pt_pt: Histo2D,
}

impl PairHistos {
    fn book(name: &str, schema: &HistogramSchema) -> Result<Self> {
        let labels = &schema.labels;
        let pt_label = labels.with_unit(&labels.pt);
        Ok(Self {
            dr: schema.book_1d(hist_name(name, "dr"), &schema.delta_r, labels.delta_r.clone())?,
            dr_pt: schema.book_2d(
                hist_name(name, "dr_pt"),
                (&schema.pt, pt_label.clone()),
                (&schema.delta_r, labels.delta_r.clone()),
            )?,
            pt_pt: schema.book_2d(
                hist_name(name, "pt_pt"),
                (&schema.pt, format!("{pt_label} (1)")),
                (&schema.pt, format!("{pt_label} (2)")),
            )?,
        })
    }

    fn merge(&mut self, other: &PairHistos) -> Result<()> {
        self.dr.merge(&other.dr)?;
        self.dr_pt.merge(&other.dr_pt)?;
        self.pt_pt.merge(&other.pt_pt)
    }
}

/// Shape a collection was booked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingKind {
    /// One object per fill.
    Single,
    /// A sequence of objects per fill, with a multiplicity histogram.
    Collection,
    /// Two objects per fill.
    Pair,
}

impl BookingKind {
    /// Human-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            BookingKind::Single => "single",
            BookingKind::Collection => "collection",
            BookingKind::Pair => "pair",
        }
    }
}

/// The histograms booked under one collection name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Booking {
    /// Single-object booking.
    Single(FourMomHistos),
    /// Collection booking.
    Collection {
        /// Per-object distributions.
        four_mom: FourMomHistos,
        /// Objects per fill.
        n: Histo1D,
    },
    /// Pair booking.
    Pair {
        /// Distributions of the summed momentum.
        four_mom: FourMomHistos,
        /// Constituent distributions.
        pair: PairHistos,
    },
}

impl Booking {
    fn book(kind: BookingKind, name: &str, schema: &HistogramSchema) -> Result<Self> {
        let four_mom = FourMomHistos::book(name, schema)?;
        Ok(match kind {
            BookingKind::Single => Booking::Single(four_mom),
            BookingKind::Collection => {
                let labels = &schema.labels;
                let n = schema.book_1d(
                    hist_name(name, "n"),
                    &schema.multiplicity,
                    labels.multiplicity.clone(),
                )?;
                Booking::Collection { four_mom, n }
            }
            BookingKind::Pair => {
                Booking::Pair { four_mom, pair: PairHistos::book(name, schema)? }
            }
        })
    }

    /// Shape of this booking.
    pub fn kind(&self) -> BookingKind {
        match self {
            Booking::Single(_) => BookingKind::Single,
            Booking::Collection { .. } => BookingKind::Collection,
            Booking::Pair { .. } => BookingKind::Pair,
        }
    }

    /// The four-momentum distributions shared by every shape.
    pub fn four_mom(&self) -> &FourMomHistos {
        match self {
            Booking::Single(h) => h,
            Booking::Collection { four_mom, .. } | Booking::Pair { four_mom, .. } => four_mom,
        }
    }

    fn four_mom_mut(&mut self) -> &mut FourMomHistos {
        match self {
            Booking::Single(h) => h,
            Booking::Collection { four_mom, .. } | Booking::Pair { four_mom, .. } => four_mom,
        }
    }

    /// Multiplicity histogram of a collection booking.
    pub fn multiplicity(&self) -> Option<&Histo1D> {
        match self {
            Booking::Collection { n, .. } => Some(n),
            _ => None,
        }
    }

    /// Constituent histograms of a pair booking.
    pub fn pair(&self) -> Option<&PairHistos> {
        match self {
            Booking::Pair { pair, .. } => Some(pair),
            _ => None,
        }
    }

    /// Every 1D histogram of the booking.
    pub fn histos_1d(&self) -> Vec<&Histo1D> {
        let fm = self.four_mom();
        let mut out = vec![&fm.pt, &fm.eta, &fm.m];
        match self {
            Booking::Single(_) => {}
            Booking::Collection { n, .. } => out.push(n),
            Booking::Pair { pair, .. } => out.push(&pair.dr),
        }
        out
    }

    /// Every 2D histogram of the booking.
    pub fn histos_2d(&self) -> Vec<&Histo2D> {
        let mut out = vec![&self.four_mom().m_pt];
        if let Booking::Pair { pair, .. } = self {
            out.push(&pair.dr_pt);
            out.push(&pair.pt_pt);
        }
        out
    }

    fn scale(&mut self, factor: f64) {
        let fm = self.four_mom_mut();
        fm.pt.scale(factor);
        fm.eta.scale(factor);
        fm.m.scale(factor);
        fm.m_pt.scale(factor);
        match self {
            Booking::Single(_) => {}
            Booking::Collection { n, .. } => n.scale(factor),
            Booking::Pair { pair, .. } => {
                pair.dr.scale(factor);
                pair.dr_pt.scale(factor);
                pair.pt_pt.scale(factor);
            }
        }
    }

    fn merge(&mut self, other: &Booking) -> Result<()> {
        match (self, other) {
            (Booking::Single(a), Booking::Single(b)) => a.merge(b),
            (
                Booking::Collection { four_mom: fa, n: na },
                Booking::Collection { four_mom: fb, n: nb },
            ) => {
                fa.merge(fb)?;
                na.merge(nb)
            }
            (
                Booking::Pair { four_mom: fa, pair: pa },
                Booking::Pair { four_mom: fb, pair: pb },
            ) => {
                fa.merge(fb)?;
                pa.merge(pb)
            }
            (a, b) => Err(Error::IncompatibleMerge(format!(
                "booked as {} on one side and {} on the other",
                a.kind().as_str(),
                b.kind().as_str()
            ))),
        }
    }
}

/// Histogram bank keyed by collection name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBank {
    schema: HistogramSchema,
    collections: BTreeMap<String, Booking>,
    norm_factor: Option<f64>,
}

impl Default for HistogramBank {
    fn default() -> Self {
        Self::new(HistogramSchema::default())
    }
}

impl HistogramBank {
    /// Create an empty bank. Binning is validated when the first collection is booked.
    pub fn new(schema: HistogramSchema) -> Self {
        Self { schema, collections: BTreeMap::new(), norm_factor: None }
    }

    /// Schema used for every booking.
    pub fn schema(&self) -> &HistogramSchema {
        &self.schema
    }

    /// Book `pt`, `eta`, `m` and `m_pt` for a single object per fill.
    pub fn book_single(&mut self, name: &str) -> Result<bool> {
        self.book(name, BookingKind::Single)
    }

    /// Book the single-object histograms plus the multiplicity `n`.
    pub fn book_collection(&mut self, name: &str) -> Result<bool> {
        self.book(name, BookingKind::Collection)
    }

    /// Book the single-object histograms (of the summed momentum) plus `dr`, `dr_pt` and `pt_pt`.
    pub fn book_pair(&mut self, name: &str) -> Result<bool> {
        self.book(name, BookingKind::Pair)
    }

    /// Book `name` with the given shape.
    ///
    /// Returns `Ok(true)` when new histograms were created and `Ok(false)`
    /// when `name` was already booked with the same shape (existing
    /// contents are left untouched). Re-booking with another shape fails.
    pub fn book(&mut self, name: &str, kind: BookingKind) -> Result<bool> {
        if name.is_empty() {
            return Err(Error::Validation("collection name must not be empty".into()));
        }
        if let Some(existing) = self.collections.get(name) {
            if existing.kind() == kind {
                log::debug!("{name} already booked as {}; keeping contents", kind.as_str());
                return Ok(false);
            }
            return Err(Error::BookingMismatch {
                name: name.to_string(),
                booked: existing.kind().as_str(),
                requested: kind.as_str(),
            });
        }
        log::debug!("booking {name} histograms ({})", kind.as_str());
        let booking = Booking::book(kind, name, &self.schema)?;
        self.collections.insert(name.to_string(), booking);
        Ok(true)
    }

    fn booking_mut(&mut self, name: &str, requested: BookingKind) -> Result<&mut Booking> {
        if self.norm_factor.is_some() {
            return Err(Error::Validation(format!(
                "cannot fill '{name}': bank is already normalized"
            )));
        }
        let booking = self
            .collections
            .get_mut(name)
            .ok_or_else(|| Error::UnbookedCollection(name.to_string()))?;
        let booked = booking.kind();
        let compatible = booked == requested || requested == BookingKind::Single;
        if !compatible {
            return Err(Error::BookingMismatch {
                name: name.to_string(),
                booked: booked.as_str(),
                requested: requested.as_str(),
            });
        }
        Ok(booking)
    }

    /// Record one weighted object into the single-object histograms of `name`.
    ///
    /// Works on every booking shape.
    pub fn fill_single<K>(&mut self, name: &str, object: &K, weight: f64) -> Result<()>
    where
        K: Kinematics + ?Sized,
    {
        log::trace!("filling {name} histograms");
        let booking = self.booking_mut(name, BookingKind::Single)?;
        booking.four_mom_mut().fill(&object.momentum(), weight);
        Ok(())
    }

    /// Record a pair: the summed momentum into the single-object histograms,
    /// then the separation and constituent correlations.
    pub fn fill_pair<A, B>(&mut self, name: &str, first: &A, second: &B, weight: f64) -> Result<()>
    where
        A: Kinematics + ?Sized,
        B: Kinematics + ?Sized,
    {
        log::trace!("filling {name} pair histograms");
        let booking = self.booking_mut(name, BookingKind::Pair)?;
        let (p1, p2) = (first.momentum(), second.momentum());
        let sum = p1 + p2;
        let dr = delta_r(&p1, &p2);
        booking.four_mom_mut().fill(&sum, weight);
        if let Booking::Pair { pair, .. } = booking {
            pair.dr.fill(dr, weight);
            pair.dr_pt.fill(sum.pt(), dr, weight);
            pair.pt_pt.fill(p1.pt(), p2.pt(), weight);
        }
        Ok(())
    }

    /// Record the number of objects, then every object as a single fill.
    pub fn fill_collection<K: Kinematics>(
        &mut self,
        name: &str,
        objects: &[K],
        weight: f64,
    ) -> Result<()> {
        log::trace!("filling {name} collection histograms ({} objects)", objects.len());
        let booking = self.booking_mut(name, BookingKind::Collection)?;
        if let Booking::Collection { four_mom, n } = booking {
            n.fill(objects.len() as f64, weight);
            for object in objects {
                four_mom.fill(&object.momentum(), weight);
            }
        }
        Ok(())
    }

    /// Histograms booked under `name`.
    pub fn get(&self, name: &str) -> Option<&Booking> {
        self.collections.get(name)
    }

    /// True if `name` has been booked.
    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Booked collection names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Iterate over `(name, booking)` pairs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Booking)> {
        self.collections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of booked collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// True if nothing has been booked.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Normalisation factor applied by [`HistogramBank::normalize`], if any.
    pub fn norm_factor(&self) -> Option<f64> {
        self.norm_factor
    }

    /// Scale every booked histogram by `factor`, exactly once per bank.
    pub fn normalize(&mut self, factor: f64) -> Result<()> {
        if let Some(previous) = self.norm_factor {
            return Err(Error::Normalization(format!(
                "bank already normalized (factor {previous})"
            )));
        }
        if !factor.is_finite() {
            return Err(Error::Normalization(format!("non-finite scale factor {factor}")));
        }
        for booking in self.collections.values_mut() {
            booking.scale(factor);
        }
        self.norm_factor = Some(factor);
        Ok(())
    }

    /// Sum the contents of a partial bank into this one.
    ///
    /// Both banks must hold the same collections with the same shapes and
    /// binning, and neither may be normalized yet. On error `self` is left
    /// unchanged.
    pub fn merge(&mut self, other: &HistogramBank) -> Result<()> {
        if self.norm_factor.is_some() || other.norm_factor.is_some() {
            return Err(Error::IncompatibleMerge(
                "normalized banks cannot be merged; merge partial banks first".into(),
            ));
        }
        if self.schema != other.schema {
            return Err(Error::IncompatibleMerge("banks use different schemas".into()));
        }
        if !self.collections.keys().eq(other.collections.keys()) {
            return Err(Error::IncompatibleMerge("banks book different collections".into()));
        }
        let mut merged = self.collections.clone();
        for (name, booking) in merged.iter_mut() {
            let theirs = &other.collections[name];
            booking
                .merge(theirs)
                .map_err(|e| Error::IncompatibleMerge(format!("collection '{name}': {e}")))?;
        }
        self.collections = merged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hbb_core::{FourMomentum, Jet, Particle};

    fn obj(pt: f64, eta: f64, phi: f64, m: f64) -> FourMomentum {
        FourMomentum::from_pt_eta_phi_m(pt, eta, phi, m)
    }

    #[test]
    fn book_creates_fixed_schema() {
        let mut bank = HistogramBank::default();
        assert!(bank.book_single("Higgs").unwrap());
        assert!(bank.book_collection("Leptons").unwrap());
        assert!(bank.book_pair("LeptonPair").unwrap());

        let single = bank.get("Higgs").unwrap();
        assert_eq!(single.histos_1d().len(), 3);
        assert_eq!(single.histos_2d().len(), 1);
        assert_eq!(single.four_mom().pt.name, "Higgs_pt");
        assert_eq!(single.four_mom().m_pt.name, "Higgs_m_pt");

        let coll = bank.get("Leptons").unwrap();
        assert_eq!(coll.multiplicity().unwrap().name, "Leptons_n");
        assert_eq!(coll.multiplicity().unwrap().n_bins(), 10);

        let pair = bank.get("LeptonPair").unwrap();
        assert_eq!(pair.histos_1d().len(), 4);
        assert_eq!(pair.histos_2d().len(), 3);
        assert_eq!(pair.pair().unwrap().pt_pt.name, "LeptonPair_pt_pt");
    }

    #[test]
    fn labels_come_from_config() {
        let schema = HistogramSchema {
            labels: LabelConfig {
                pt: "pT".into(),
                momentum_unit: "TeV".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut bank = HistogramBank::new(schema);
        bank.book_single("J").unwrap();
        let pt = &bank.get("J").unwrap().four_mom().pt;
        assert_eq!(pt.x_label, "pT [TeV]");
        assert_eq!(pt.y_label, "events / 40.00");
    }

    #[test]
    fn rebooking_same_shape_keeps_contents() {
        let mut bank = HistogramBank::default();
        bank.book_single("Higgs").unwrap();
        bank.fill_single("Higgs", &obj(300.0, 0.5, 1.0, 120.0), 2.0).unwrap();
        assert!(!bank.book_single("Higgs").unwrap());
        assert_eq!(bank.len(), 1);
        assert_relative_eq!(bank.get("Higgs").unwrap().four_mom().pt.integral(), 2.0);
    }

    #[test]
    fn rebooking_other_shape_fails() {
        let mut bank = HistogramBank::default();
        bank.book_single("Higgs").unwrap();
        let err = bank.book_pair("Higgs").unwrap_err();
        assert!(matches!(err, Error::BookingMismatch { booked: "single", .. }));
    }

    #[test]
    fn unbooked_fill_is_an_error() {
        let mut bank = HistogramBank::default();
        let err = bank.fill_single("Nope", &obj(10.0, 0.0, 0.0, 0.0), 1.0).unwrap_err();
        assert!(matches!(err, Error::UnbookedCollection(ref n) if n == "Nope"));
        let jets: Vec<Jet> = Vec::new();
        assert!(bank.fill_collection("Nope", &jets, 1.0).is_err());
    }

    #[test]
    fn fill_shape_mismatch_leaves_bank_untouched() {
        let mut bank = HistogramBank::default();
        bank.book_single("Higgs").unwrap();
        let a = obj(100.0, 0.0, 0.0, 0.0);
        let err = bank.fill_pair("Higgs", &a, &a, 1.0).unwrap_err();
        assert!(matches!(err, Error::BookingMismatch { .. }));
        assert_eq!(bank.get("Higgs").unwrap().four_mom().pt.entries, 0);
    }

    #[test]
    fn fill_collection_counts_and_fills_each() {
        let mut bank = HistogramBank::default();
        bank.book_collection("Jets").unwrap();
        let jets = vec![
            Jet::new(obj(300.0, 0.1, 0.0, 10.0)),
            Jet::new(obj(200.0, 0.2, 1.0, 10.0)),
            Jet::new(obj(100.0, 0.3, 2.0, 10.0)),
        ];
        bank.fill_collection("Jets", &jets, 0.5).unwrap();
        let b = bank.get("Jets").unwrap();
        let n = b.multiplicity().unwrap();
        assert_relative_eq!(n.bin_content(3), 0.5);
        assert_relative_eq!(n.integral(), 0.5);
        assert_relative_eq!(b.four_mom().pt.integral(), 1.5);
        assert_eq!(b.four_mom().eta.entries, 3);
    }

    #[test]
    fn fill_empty_collection_only_counts() {
        let mut bank = HistogramBank::default();
        bank.book_collection("Jets").unwrap();
        bank.fill_collection::<Jet>("Jets", &[], 1.0).unwrap();
        let b = bank.get("Jets").unwrap();
        assert_relative_eq!(b.multiplicity().unwrap().bin_content(0), 1.0);
        assert_eq!(b.four_mom().pt.entries, 0);
    }

    #[test]
    fn fill_pair_uses_summed_momentum() {
        let mut bank = HistogramBank::default();
        bank.book_pair("LeptonPair").unwrap();
        let l1 = Particle::new(11, FourMomentum::new(45.0, 0.0, 0.0, 45.0));
        let l2 = Particle::new(-11, FourMomentum::new(0.0, 45.0, 0.0, 45.0));
        bank.fill_pair("LeptonPair", &l1, &l2, 1.0).unwrap();
        let b = bank.get("LeptonPair").unwrap();
        // pT of the sum is 45*sqrt(2) ~ 63.6 -> bin 1 of 40 GeV bins
        assert_relative_eq!(b.four_mom().pt.bin_content(1), 1.0);
        let pair = b.pair().unwrap();
        // dR = pi/2 ~ 1.571 -> bin 15 of 0.1 bins
        assert_relative_eq!(pair.dr.bin_content(15), 1.0);
        assert_relative_eq!(pair.pt_pt.bin_content(1, 1), 1.0);
        assert_relative_eq!(pair.dr_pt.integral(), 1.0);
    }

    #[test]
    fn normalize_scales_everything_once() {
        let mut bank = HistogramBank::default();
        bank.book_pair("P").unwrap();
        bank.book_collection("C").unwrap();
        let a = obj(100.0, 0.0, 0.0, 10.0);
        let b = obj(80.0, 0.5, 0.5, 10.0);
        bank.fill_pair("P", &a, &b, 1.0).unwrap();
        bank.fill_collection("C", &[a, b], 1.0).unwrap();
        bank.normalize(5.0).unwrap();
        for (_, booking) in bank.iter() {
            for h in booking.histos_1d() {
                let expected = if h.name == "C_pt" || h.name == "C_eta" || h.name == "C_m" {
                    10.0
                } else {
                    5.0
                };
                assert_relative_eq!(h.integral(), expected);
            }
            for h in booking.histos_2d() {
                let expected = if h.name == "C_m_pt" { 10.0 } else { 5.0 };
                assert_relative_eq!(h.integral() + h.out_of_range, expected);
            }
        }
        assert!(matches!(bank.normalize(5.0), Err(Error::Normalization(_))));
        assert!(bank.fill_single("P", &a, 1.0).is_err());
    }

    #[test]
    fn merge_requires_same_bookings() {
        let mut a = HistogramBank::default();
        a.book_single("X").unwrap();
        let mut b = HistogramBank::default();
        b.book_single("Y").unwrap();
        assert!(matches!(a.merge(&b), Err(Error::IncompatibleMerge(_))));

        let mut c = HistogramBank::default();
        c.book_pair("X").unwrap();
        assert!(matches!(a.merge(&c), Err(Error::IncompatibleMerge(_))));
    }

    #[test]
    fn invalid_schema_fails_at_booking() {
        let schema = HistogramSchema { pt: AxisSpec::new(0, 0.0, 1.0), ..Default::default() };
        assert!(schema.validate().is_err());
        let mut bank = HistogramBank::new(schema);
        assert!(bank.book_single("X").is_err());
        assert!(bank.is_empty());
    }
}
