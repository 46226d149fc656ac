//! Event-parallel processing with per-worker partial banks.
//!
//! Each chunk of events is analysed by its own [`BoostedHbb`]; the partial
//! results are merged in chunk order so the outcome does not depend on
//! scheduling.

use rayon::prelude::*;

use hbb_core::Result;

use crate::analysis::BoostedHbb;
use crate::config::AnalysisConfig;
use crate::event::EventView;

/// Default number of events per worker chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Analyse `events` on the current rayon pool and merge the partial runs.
///
/// The returned analysis is unnormalised; call [`BoostedHbb::finalize`] once.
pub fn process_parallel<E>(
    config: &AnalysisConfig,
    events: &[E],
    chunk_size: usize,
) -> Result<BoostedHbb>
where
    E: EventView + Sync,
{
    let template = BoostedHbb::new(config.clone())?;
    let chunk_size = chunk_size.max(1);
    log::debug!(
        "processing {} events in chunks of {chunk_size} on {} threads",
        events.len(),
        rayon::current_num_threads()
    );

    let partials: Vec<BoostedHbb> = events
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut partial = template.clone();
            for event in chunk {
                partial.analyze(event)?;
            }
            Ok(partial)
        })
        .collect::<Result<_>>()?;

    let mut merged = template;
    for partial in &partials {
        merged.merge(partial)?;
    }
    Ok(merged)
}

/// Analyse `events` one after another on the calling thread.
pub fn process_sequential<E>(config: &AnalysisConfig, events: &[E]) -> Result<BoostedHbb>
where
    E: EventView,
{
    let mut analysis = BoostedHbb::new(config.clone())?;
    for event in events {
        analysis.analyze(event)?;
    }
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbb_core::{FourMomentum, Particle};

    use crate::event::EventRecord;

    fn events(n: usize) -> Vec<EventRecord> {
        (0..n)
            .map(|i| {
                let mut ev = EventRecord::new(if i % 3 == 0 { -0.5 } else { 1.0 });
                if i % 4 != 0 {
                    let pt = 20.0 + i as f64;
                    ev = ev.lepton(Particle::new(
                        11,
                        FourMomentum::from_pt_eta_phi_m(pt, 0.1 * (i % 7) as f64, 0.3, 0.0),
                    ));
                }
                ev
            })
            .collect()
    }

    #[test]
    fn empty_input_gives_empty_run() {
        let run = process_parallel::<EventRecord>(&AnalysisConfig::default(), &[], 8).unwrap();
        assert_eq!(run.tally().n_events, 0);
    }

    #[test]
    fn parallel_counts_match_sequential() {
        let evs = events(37);
        let cfg = AnalysisConfig::default();
        let par = process_parallel(&cfg, &evs, 5).unwrap();
        let seq = process_sequential(&cfg, &evs).unwrap();
        assert_eq!(par.tally().n_events, 37);
        assert_eq!(par.cutflow(), seq.cutflow());
        assert!((par.tally().sum_w - seq.tally().sum_w).abs() < 1e-12);

        let (p, s) = (par.bank().get("Leptons").unwrap(), seq.bank().get("Leptons").unwrap());
        for (hp, hs) in p.histos_1d().into_iter().zip(s.histos_1d()) {
            assert_eq!(hp.entries, hs.entries);
            for (a, b) in hp.sumw.iter().zip(&hs.sumw) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let evs = events(3);
        let run = process_parallel(&AnalysisConfig::default(), &evs, 0).unwrap();
        assert_eq!(run.tally().n_events, 3);
    }
}
