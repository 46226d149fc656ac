//! `boostedhbb run` / `merge` / `config-template`.

use anyhow::{Context, Result};
use hbb_analysis::{
    AnalysisConfig, BoostedHbb, EventRecord, RunOutput, process_parallel, read_json_lines,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading analysis config");
            AnalysisConfig::from_path(path)
                .with_context(|| format!("invalid analysis config {}", path.display()))
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn open_events(path: &Path) -> Result<BufReader<File>> {
    let file =
        File::open(path).with_context(|| format!("cannot open events {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn write_text(output: Option<&PathBuf>, text: &str) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, text)?;
    } else {
        println!("{text}");
    }
    Ok(())
}

fn write_output(output: Option<&PathBuf>, result: &RunOutput) -> Result<()> {
    write_text(output, &result.to_json()?)
}

fn log_summary(result: &RunOutput) {
    tracing::info!(
        events = result.tally.n_events,
        sum_w = result.tally.sum_w,
        effective_entries = ?result.tally.effective_entries(),
        accepted = result.cutflow.accepted,
        vetoed = result.cutflow.vetoed(),
        higgs = result.cutflow.higgs_candidates,
        norm_factor = ?result.bank.norm_factor(),
        "run summary"
    );
}

pub fn cmd_run(
    events: &Path,
    config: Option<&PathBuf>,
    cross_section: f64,
    threads: usize,
    chunk_size: usize,
    no_normalize: bool,
    output: Option<&PathBuf>,
) -> Result<()> {
    let config = load_config(config)?;
    tracing::info!(path = %events.display(), threads, "reading events");
    let reader = open_events(events)?;

    let analysis = if threads == 1 {
        let mut analysis = BoostedHbb::new(config)?;
        for event in read_json_lines(reader) {
            analysis.analyze(&event?)?;
        }
        analysis
    } else {
        if threads > 0 {
            // Best-effort; if a global pool already exists, keep going.
            let _ = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global();
        }
        let records: Vec<EventRecord> =
            read_json_lines(reader).collect::<hbb_core::Result<_>>()?;
        tracing::debug!(events = records.len(), "events loaded");
        process_parallel(&config, &records, chunk_size)?
    };

    let result = if no_normalize {
        analysis.into_output(cross_section)
    } else {
        analysis.finalize(cross_section).context("cannot normalise histograms")?
    };
    log_summary(&result);
    write_output(output, &result)
}

pub fn cmd_merge(inputs: &[PathBuf], no_normalize: bool, output: Option<&PathBuf>) -> Result<()> {
    let (first, rest) = inputs.split_first().context("no partial outputs given")?;
    let read = |path: &PathBuf| {
        tracing::info!(path = %path.display(), "reading partial output");
        RunOutput::from_path(path).with_context(|| format!("cannot read {}", path.display()))
    };

    let mut merged = read(first)?;
    for path in rest {
        let part = read(path)?;
        merged.merge(&part).with_context(|| format!("cannot merge {}", path.display()))?;
    }
    if !no_normalize {
        let factor = merged.normalize().context("cannot normalise merged histograms")?;
        tracing::debug!(factor, "merged bank normalised");
    }
    log_summary(&merged);
    write_output(output, &merged)
}

pub fn cmd_config_template(output: Option<&PathBuf>) -> Result<()> {
    let yaml = AnalysisConfig::default().to_yaml()?;
    write_text(output, yaml.trim_end())
}
