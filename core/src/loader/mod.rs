//! Loaders for benchmark result files
//!
//! - summary CSV: `delayMillis,datasetSize,aggregator,meanMillis,errorMillis,unit`
//! - crossover CSV: one annotation row per delay tier (optional input)
//! - lab1 JSON: `{"Class.method": [t0, t1, t2], ...}`, one timing per dataset size
//! - lab1 wide CSV: `Dataset,Receipts,Iterative,Stream,Custom`

use crate::error::{Error, Result};
use crate::model::{AggregatorId, BenchmarkRow, Boundary, CrossoverKind, CrossoverRow};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File};
use std::path::Path;


/// Columns the summary CSV must provide
pub const SUMMARY_COLUMNS: [&str; 6] = [
    "delayMillis",
    "datasetSize",
    "aggregator",
    "meanMillis",
    "errorMillis",
    "unit",
];

/// Columns the lab1 wide CSV must provide
pub const WIDE_COLUMNS: [&str; 5] = ["Dataset", "Receipts", "Iterative", "Stream", "Custom"];

/// Dataset sizes measured by the lab1 benchmark, in JSON list order
pub const LEGACY_SIZES: [u64; 3] = [5_000, 25_000, 250_000];

/// Header lookup for a CSV file
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_string(), idx))
            .collect();
        Self { index }
    }

    /// Names from `required` not present in the header, sorted
    fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.index.contains_key(**name))
            .map(|name| name.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Trimmed cell value; `None` when the column is absent or the cell blank
    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.index
            .get(name)
            .and_then(|&idx| record.get(idx))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

fn open_csv(path: &Path) -> Result<(csv::Reader<File>, Columns)> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;
    let columns = Columns::new(reader.headers()?);
    Ok((reader, columns))
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|pos| pos.line()).unwrap_or(0)
}

/// Parse a non-negative integer; floats such as `10.5` are truncated to `10`
pub(crate) fn parse_integral(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Ok(v) = value.parse::<u64>() {
        return Some(v);
    }
    let v: f64 = value.parse().ok()?;
    (v.is_finite() && v > -1.0).then(|| v.trunc() as u64)
}

fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Load the summary CSV written by the JMH summary launcher
///
/// Fails when the file is missing, when required columns are absent (the
/// error names every missing column), or when a row lacks a numeric delay,
/// dataset size or mean.
pub fn load_summary(path: &Path) -> Result<Vec<BenchmarkRow>> {
    let (mut reader, columns) = open_csv(path)?;

    let missing = columns.missing(&SUMMARY_COLUMNS);
    if !missing.is_empty() {
        return Err(Error::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    let invalid = |line: u64, reason: String| Error::InvalidRow {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record_line(&record);

        let delay_millis = columns
            .get(&record, "delayMillis")
            .and_then(parse_integral)
            .ok_or_else(|| invalid(line, "delayMillis is not a non-negative integer".into()))?;
        let dataset_size = columns
            .get(&record, "datasetSize")
            .and_then(parse_integral)
            .ok_or_else(|| invalid(line, "datasetSize is not a non-negative integer".into()))?;
        let aggregator = columns
            .get(&record, "aggregator")
            .map(AggregatorId::parse)
            .ok_or_else(|| invalid(line, "aggregator is empty".into()))?;
        let mean_millis = columns
            .get(&record, "meanMillis")
            .and_then(parse_float)
            .ok_or_else(|| invalid(line, "meanMillis is not a number".into()))?;
        let error_millis = match columns.get(&record, "errorMillis") {
            Some(value) => parse_float(value)
                .ok_or_else(|| invalid(line, "errorMillis is not a number".into()))?,
            None => 0.0,
        };
        let unit = columns.get(&record, "unit").unwrap_or_default().to_string();

        rows.push(BenchmarkRow {
            delay_millis,
            dataset_size,
            aggregator,
            mean_millis,
            error_millis,
            unit,
        });
    }

    tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load the optional crossover CSV, keyed by delay tier
///
/// A missing or empty file yields an empty map. Rows without a numeric
/// `delayMillis` are skipped.
pub fn load_crossover(path: &Path) -> Result<BTreeMap<u64, CrossoverRow>> {
    if !path.exists() {
        tracing::debug!("No crossover file at {}", path.display());
        return Ok(BTreeMap::new());
    }
    let (mut reader, columns) = open_csv(path)?;

    let mut crossover = BTreeMap::new();
    for record in reader.records() {
        let record = record?;
        let Some(delay_millis) = columns.get(&record, "delayMillis").and_then(parse_integral) else {
            tracing::debug!(
                line = record_line(&record),
                "Skipping crossover row without numeric delayMillis"
            );
            continue;
        };

        let boundary = |prefix: &str| -> Option<Boundary> {
            Some(Boundary {
                dataset_size: columns
                    .get(&record, &format!("{prefix}DatasetSize"))
                    .and_then(parse_integral)?,
                sequential_millis: columns
                    .get(&record, &format!("{prefix}SequentialMillis"))
                    .and_then(parse_float)?,
                parallel_millis: columns
                    .get(&record, &format!("{prefix}ParallelMillis"))
                    .and_then(parse_float)?,
            })
        };

        let row = CrossoverRow {
            delay_millis,
            kind: CrossoverKind::parse(columns.get(&record, "type").unwrap_or_default()),
            estimated_dataset_size: columns
                .get(&record, "estimatedDatasetSize")
                .and_then(parse_float)
                .filter(|v| v.is_finite()),
            lower: boundary("lower"),
            upper: boundary("upper"),
            note: columns.get(&record, "note").unwrap_or_default().to_string(),
        };
        crossover.insert(delay_millis, row);
    }

    tracing::info!(
        "Loaded crossover info for {} delay tiers from {}",
        crossover.len(),
        path.display()
    );
    Ok(crossover)
}

/// Load a lab1 `benchmark_results.json`
///
/// Every metric must list exactly one timing per entry in `sizes`. The rows
/// carry delay 0, no error margin and unit `ms`.
pub fn load_legacy_json(path: &Path, sizes: &[u64]) -> Result<Vec<BenchmarkRow>> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let metrics: BTreeMap<String, Vec<f64>> = serde_json::from_str(&content)?;

    let mut rows = Vec::with_capacity(metrics.len() * sizes.len());
    for (metric, timings) in metrics {
        if timings.len() != sizes.len() {
            return Err(Error::InvalidRow {
                path: path.to_path_buf(),
                line: 0,
                reason: format!(
                    "metric {} has {} timings, expected {}",
                    metric,
                    timings.len(),
                    sizes.len()
                ),
            });
        }
        let aggregator = AggregatorId::parse(&metric);
        for (&dataset_size, &mean_millis) in sizes.iter().zip(&timings) {
            rows.push(BenchmarkRow {
                delay_millis: 0,
                dataset_size,
                aggregator: aggregator.clone(),
                mean_millis,
                error_millis: 0.0,
                unit: "ms".to_string(),
            });
        }
    }

    tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load a lab1 wide CSV (`Dataset,Receipts,Iterative,Stream,Custom`)
///
/// Each line becomes three rows whose class is the dataset label and whose
/// method is the timing column name.
pub fn load_wide_csv(path: &Path) -> Result<Vec<BenchmarkRow>> {
    let (mut reader, columns) = open_csv(path)?;

    let missing = columns.missing(&WIDE_COLUMNS);
    if !missing.is_empty() {
        return Err(Error::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record_line(&record);
        let invalid = |reason: String| Error::InvalidRow {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let dataset = columns
            .get(&record, "Dataset")
            .ok_or_else(|| invalid("Dataset is empty".into()))?;
        let dataset_size = columns
            .get(&record, "Receipts")
            .and_then(parse_integral)
            .ok_or_else(|| invalid("Receipts is not a non-negative integer".into()))?;

        for method in &WIDE_COLUMNS[2..] {
            let mean_millis = columns
                .get(&record, method)
                .and_then(parse_float)
                .ok_or_else(|| invalid(format!("{method} is not a number")))?;
            rows.push(BenchmarkRow {
                delay_millis: 0,
                dataset_size,
                aggregator: AggregatorId::new(dataset, *method),
                mean_millis,
                error_millis: 0.0,
                unit: "ms".to_string(),
            });
        }
    }

    tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
