//! Seed sweeps: many independent fights of one config, summarized.

use std::io;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::pool::WorkerPool;
use crate::combat::{simulate_fight_with_seed, FightConfig};

const Z_95: f64 = 1.96;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSample {
    pub seed: u64,
    pub total_damage: i64,
    pub dps: f64,
    pub crit_hits: u32,
    pub main_rounds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    pub runs: usize,
    pub base_seed: u64,
    pub mean_dps: f64,
    pub std_dev_dps: f64,
    pub min_dps: f64,
    pub max_dps: f64,
    pub dps_95_ci: [f64; 2],
    pub mean_crit_hits: f64,
    pub samples: Vec<SweepSample>,
}

/// Run `runs` fights with seeds `base_seed + i` (wrapping). Samples keep seed order.
pub fn run_sweep(
    config: &FightConfig,
    runs: usize,
    base_seed: u64,
    pool: &WorkerPool,
) -> SweepSummary {
    let samples: Vec<SweepSample> = pool.install(|| {
        (0..runs)
            .into_par_iter()
            .map(|i| {
                let seed = base_seed.wrapping_add(i as u64);
                let report = simulate_fight_with_seed(config, seed);
                SweepSample {
                    seed,
                    total_damage: report.total_damage,
                    dps: report.dps(),
                    crit_hits: report.crit_hits,
                    main_rounds: report.weapon1.rounds,
                }
            })
            .collect()
    });
    tracing::debug!(runs, base_seed, "sweep complete");
    summarize(samples, base_seed)
}

fn summarize(samples: Vec<SweepSample>, base_seed: u64) -> SweepSummary {
    let n = samples.len();
    if n == 0 {
        return SweepSummary {
            runs: 0,
            base_seed,
            mean_dps: 0.0,
            std_dev_dps: 0.0,
            min_dps: 0.0,
            max_dps: 0.0,
            dps_95_ci: [0.0, 0.0],
            mean_crit_hits: 0.0,
            samples,
        };
    }

    let count = n as f64;
    let mean = samples.iter().map(|s| s.dps).sum::<f64>() / count;
    let variance = if n > 1 {
        samples.iter().map(|s| (s.dps - mean).powi(2)).sum::<f64>() / (count - 1.0)
    } else {
        0.0
    };
    let std_dev = variance.sqrt();
    let half_width = Z_95 * std_dev / count.sqrt();
    let min = samples.iter().map(|s| s.dps).fold(f64::INFINITY, f64::min);
    let max = samples.iter().map(|s| s.dps).fold(f64::NEG_INFINITY, f64::max);
    let mean_crits = samples.iter().map(|s| f64::from(s.crit_hits)).sum::<f64>() / count;

    SweepSummary {
        runs: n,
        base_seed,
        mean_dps: mean,
        std_dev_dps: std_dev,
        min_dps: min,
        max_dps: max,
        dps_95_ci: [mean - half_width, mean + half_width],
        mean_crit_hits: mean_crits,
        samples,
    }
}

/// Write samples as CSV with a header row.
pub fn write_samples<W: io::Write>(writer: W, samples: &[SweepSample]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for sample in samples {
        out.serialize(sample)?;
    }
    out.flush()?;
    Ok(())
}

pub fn export_samples_csv(path: impl AsRef<Path>, samples: &[SweepSample]) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path.as_ref())?;
    write_samples(file, samples)
}
