//! CSV export of summary and crossover tables
//!
//! Both formats are the ones read back by [`crate::loader`].

use crate::error::Result;
use crate::model::{BenchmarkRow, Boundary, CrossoverRow};
use csv::Writer;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Header of the crossover CSV
pub const CROSSOVER_HEADER: [&str; 10] = [
    "delayMillis",
    "type",
    "estimatedDatasetSize",
    "lowerDatasetSize",
    "lowerSequentialMillis",
    "lowerParallelMillis",
    "upperDatasetSize",
    "upperSequentialMillis",
    "upperParallelMillis",
    "note",
];

/// Format a decimal with at most six fractional digits and no trailing zeros
fn format_decimal(value: f64) -> String {
    let text = format!("{:.6}", value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Write rows in the summary CSV format, ordered by delay, size and aggregator
pub fn write_summary<W: Write>(writer: W, rows: &[BenchmarkRow]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(crate::loader::SUMMARY_COLUMNS)?;

    let mut sorted: Vec<&BenchmarkRow> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        (a.delay_millis, a.dataset_size, &a.aggregator)
            .cmp(&(b.delay_millis, b.dataset_size, &b.aggregator))
    });

    for row in sorted {
        wtr.write_record(&[
            row.delay_millis.to_string(),
            row.dataset_size.to_string(),
            row.aggregator.to_string(),
            format!("{:.6}", row.mean_millis),
            format!("{:.6}", row.error_millis),
            row.unit.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write a summary CSV file, creating parent directories
pub fn write_summary_csv(path: &Path, rows: &[BenchmarkRow]) -> Result<()> {
    write_summary(create(path)?, rows)?;
    tracing::info!("Wrote {} summary rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write crossover rows, one per delay tier
pub fn write_crossover<W: Write>(writer: W, crossover: &BTreeMap<u64, CrossoverRow>) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(CROSSOVER_HEADER)?;

    let boundary_fields = |boundary: Option<Boundary>| -> [String; 3] {
        match boundary {
            Some(b) => [
                b.dataset_size.to_string(),
                format_decimal(b.sequential_millis),
                format_decimal(b.parallel_millis),
            ],
            None => Default::default(),
        }
    };

    for row in crossover.values() {
        let [lower_size, lower_seq, lower_par] = boundary_fields(row.lower);
        let [upper_size, upper_seq, upper_par] = boundary_fields(row.upper);
        wtr.write_record(&[
            row.delay_millis.to_string(),
            row.kind.as_str().to_string(),
            row.estimated_dataset_size
                .map(format_decimal)
                .unwrap_or_default(),
            lower_size,
            lower_seq,
            lower_par,
            upper_size,
            upper_seq,
            upper_par,
            row.note.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write a crossover CSV file, creating parent directories
pub fn write_crossover_csv(path: &Path, crossover: &BTreeMap<u64, CrossoverRow>) -> Result<()> {
    write_crossover(create(path)?, crossover)?;
    tracing::info!(
        "Wrote crossover info for {} delay tiers to {}",
        crossover.len(),
        path.display()
    );
    Ok(())
}
