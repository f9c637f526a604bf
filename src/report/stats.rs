use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Summary of one slot's hit magnitudes. Every field is `None` for an empty sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStatistics {
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub mode: Option<i32>,
}

impl HitStatistics {
    pub fn from_hits(hits: &[i32]) -> Self {
        if hits.is_empty() {
            return Self::default();
        }

        let sum: i64 = hits.iter().map(|&h| i64::from(h)).sum();
        let mean = sum as f64 / hits.len() as f64;

        let mut sorted = hits.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 1 {
            f64::from(sorted[mid])
        } else {
            (f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0
        };

        Self {
            min: sorted.first().copied(),
            max: sorted.last().copied(),
            mean: Some(mean),
            median: Some(median),
            mode: mode(hits),
        }
    }
}

/// First value, in sequence order, to reach the highest count.
fn mode(hits: &[i32]) -> Option<i32> {
    let mut counts: HashMap<i32, u32> = HashMap::new();
    let mut best = None;
    let mut best_count = 0;
    for &hit in hits {
        let count = counts.entry(hit).or_insert(0);
        *count += 1;
        if *count > best_count {
            best_count = *count;
            best = Some(hit);
        }
    }
    best
}
