//! Crossover estimation between sequential and parallel receipt statistics
//!
//! For every delay tier the sequential and parallel means are compared at
//! each dataset size. The first size where they match is an exact crossover;
//! the first sign change between neighbouring sizes is linearly interpolated.

use crate::model::{BenchmarkRow, Boundary, CrossoverKind, CrossoverRow};
use std::collections::{BTreeMap, HashMap};

/// Aggregators treated as the sequential pipeline, in order of preference
pub const SEQUENTIAL_CANDIDATES: [&str; 2] = [
    "StatisticsMicroBenchmarks.receiptStatisticsSequential",
    "ReceiptStatisticsBenchmark.sequentialStream",
];

/// Aggregators treated as the parallel pipeline, in order of preference
pub const PARALLEL_CANDIDATES: [&str; 2] = [
    "StatisticsMicroBenchmarks.receiptStatisticsParallel",
    "ReceiptStatisticsBenchmark.parallelStream",
];

const EPSILON: f64 = 1e-6;

/// Estimate one crossover row per delay tier present in `rows`
pub fn estimate_crossovers(rows: &[BenchmarkRow]) -> BTreeMap<u64, CrossoverRow> {
    let mut by_delay: BTreeMap<u64, BTreeMap<u64, HashMap<String, f64>>> = BTreeMap::new();
    for row in rows {
        by_delay
            .entry(row.delay_millis)
            .or_default()
            .entry(row.dataset_size)
            .or_default()
            .insert(row.aggregator.to_string(), row.mean_millis);
    }

    by_delay
        .into_iter()
        .map(|(delay_millis, by_size)| {
            let boundaries: Vec<Boundary> = by_size
                .iter()
                .filter_map(|(&dataset_size, means)| {
                    Some(Boundary {
                        dataset_size,
                        sequential_millis: first_present(means, &SEQUENTIAL_CANDIDATES)?,
                        parallel_millis: first_present(means, &PARALLEL_CANDIDATES)?,
                    })
                })
                .collect();
            (delay_millis, estimate(delay_millis, &boundaries))
        })
        .collect()
}

fn first_present(means: &HashMap<String, f64>, candidates: &[&str]) -> Option<f64> {
    candidates.iter().find_map(|key| means.get(*key).copied())
}

/// Find the crossover among boundaries sorted by dataset size
pub fn estimate(delay_millis: u64, boundaries: &[Boundary]) -> CrossoverRow {
    let none = |lower: Option<Boundary>, upper: Option<Boundary>, note: &str| CrossoverRow {
        delay_millis,
        kind: CrossoverKind::None,
        estimated_dataset_size: None,
        lower,
        upper,
        note: note.to_string(),
    };

    if boundaries.is_empty() {
        return none(None, None, "no data");
    }

    let comparable: Vec<Boundary> = boundaries
        .iter()
        .copied()
        .filter(|b| b.sequential_millis.is_finite() && b.parallel_millis.is_finite())
        .collect();

    for pair in comparable.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if current.diff().abs() < EPSILON {
            return exact(delay_millis, current);
        }
        if previous.diff().abs() < EPSILON {
            return exact(delay_millis, previous);
        }
        if previous.diff().signum() != current.diff().signum() {
            return interpolated(delay_millis, previous, current);
        }
    }

    let (Some(&first), Some(&last)) = (comparable.first(), comparable.last()) else {
        return none(None, None, "insufficient data");
    };

    let trend = if first.diff() < 0.0 && last.diff() < 0.0 {
        "sequential faster across tested range"
    } else if first.diff() > 0.0 && last.diff() > 0.0 {
        "parallel faster across tested range"
    } else {
        "no crossover detected"
    };
    none(Some(first), Some(last), trend)
}

fn exact(delay_millis: u64, boundary: Boundary) -> CrossoverRow {
    CrossoverRow {
        delay_millis,
        kind: CrossoverKind::Exact,
        estimated_dataset_size: Some(boundary.dataset_size as f64),
        lower: Some(boundary),
        upper: Some(boundary),
        note: "exact match at measured dataset size".to_string(),
    }
}

fn interpolated(delay_millis: u64, lower: Boundary, upper: Boundary) -> CrossoverRow {
    let lower_size = lower.dataset_size as f64;
    let range = upper.dataset_size as f64 - lower_size;
    let estimate = if range <= 0.0 {
        lower_size
    } else {
        let fraction = lower.diff().abs() / (lower.diff().abs() + upper.diff().abs());
        lower_size + fraction * range
    };

    CrossoverRow {
        delay_millis,
        kind: CrossoverKind::Interpolated,
        estimated_dataset_size: Some(estimate),
        lower: Some(lower),
        upper: Some(upper),
        note: "linear interpolation between neighbouring dataset sizes".to_string(),
    }
}
