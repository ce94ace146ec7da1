//! Pivot long-format benchmark rows into per-chart series
//!
//! Rows are grouped by delay tier, then by benchmark class, and each group is
//! pivoted into one row per dataset size and one column per configured method.

use crate::config::{ClassSeries, PlotConfig};
use crate::error::{Error, Result};
use crate::model::BenchmarkRow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};


/// One pivot cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Mean execution time
    pub mean_millis: f64,
    /// Confidence interval half-width
    pub error_millis: f64,
}

/// One bar series: a configured method and its cells, aligned with
/// [`ChartGroup::dataset_sizes`]
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Benchmark method
    pub method: String,
    /// Legend label
    pub label: String,
    /// One entry per dataset size; `None` where the method was not measured
    pub cells: Vec<Option<Cell>>,
}

/// Everything needed to draw one grouped bar chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGroup {
    /// Delay tier
    pub delay_millis: u64,
    /// Benchmark class
    pub class: String,
    /// Dataset sizes, ascending
    pub dataset_sizes: Vec<u64>,
    /// Series in configured order
    pub series: Vec<Series>,
}

impl ChartGroup {
    /// Chart title
    pub fn title(&self) -> String {
        format!("{} (delay = {} ms)", self.class, self.delay_millis)
    }

    /// Class name with dots replaced, for file names
    pub fn safe_class(&self) -> String {
        self.class.replace('.', "_")
    }

    /// Smallest and largest positive bar extents, including error margins
    ///
    /// The lower end uses `mean - error` when that stays positive, otherwise
    /// the mean itself. Returns `None` when no cell has a positive mean.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let cells = self
            .series
            .iter()
            .flat_map(|s| s.cells.iter().flatten())
            .filter(|c| c.mean_millis.is_finite() && c.mean_millis > 0.0);

        let mut range: Option<(f64, f64)> = None;
        for cell in cells {
            let error = cell.error_millis.max(0.0);
            let low = if cell.mean_millis - error > 0.0 {
                cell.mean_millis - error
            } else {
                cell.mean_millis
            };
            let high = cell.mean_millis + error;
            range = Some(match range {
                Some((lo, hi)) => (lo.min(low), hi.max(high)),
                None => (low, high),
            });
        }
        range
    }
}

/// How chart groups are titled and named on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Labeling {
    /// Lab2 summaries: one chart per delay tier and class
    #[default]
    DelayTier,
    /// Lab1 results have no delay tier; charts are named by dataset or metric group
    Dataset,
}

impl Labeling {
    /// Chart title for `group`
    pub fn title(self, group: &ChartGroup) -> String {
        match self {
            Self::DelayTier => group.title(),
            Self::Dataset => format!(
                "Benchmark: {} dataset (log scale, lower is better)",
                group.class
            ),
        }
    }

    /// PNG file name for `group`
    pub fn file_name(self, group: &ChartGroup, prefix: &str) -> String {
        match self {
            Self::DelayTier => format!(
                "{}-{}-delay-{}.png",
                prefix,
                group.safe_class(),
                group.delay_millis
            ),
            Self::Dataset => format!("{}-{}.png", prefix, group.safe_class()),
        }
    }
}

/// Group and pivot rows into chart groups
///
/// Groups are ordered by delay tier ascending, then by the class order in
/// `config`. A class without rows in a delay tier, or whose rows match no
/// configured method, yields no group.
pub fn reshape(rows: &[BenchmarkRow], config: &PlotConfig) -> Result<Vec<ChartGroup>> {
    let mut by_delay: BTreeMap<u64, HashMap<&str, Vec<&BenchmarkRow>>> = BTreeMap::new();
    for row in rows {
        by_delay
            .entry(row.delay_millis)
            .or_default()
            .entry(row.aggregator.class.as_str())
            .or_default()
            .push(row);
    }

    let unconfigured: BTreeSet<&str> = rows
        .iter()
        .map(|r| r.aggregator.class.as_str())
        .filter(|class| config.series_for(class).is_none())
        .collect();
    for class in &unconfigured {
        tracing::warn!("No series configured for class {}, skipping", class);
    }

    let mut groups = Vec::new();
    for (delay_millis, classes) in &by_delay {
        for class in &config.classes {
            let Some(class_rows) = classes.get(class.class.as_str()) else {
                tracing::debug!(
                    delay_millis = *delay_millis,
                    class = %class.class,
                    "No rows for class in delay tier"
                );
                continue;
            };

            match pivot(*delay_millis, class, class_rows)? {
                Some(group) => groups.push(group),
                None => tracing::debug!(
                    delay_millis = *delay_millis,
                    class = %class.class,
                    "No configured series present"
                ),
            }
        }
    }

    Ok(groups)
}

fn pivot(
    delay_millis: u64,
    class: &ClassSeries,
    rows: &[&BenchmarkRow],
) -> Result<Option<ChartGroup>> {
    let dataset_sizes: Vec<u64> = rows
        .iter()
        .map(|r| r.dataset_size)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut table: HashMap<(&str, u64), Cell> = HashMap::new();
    for row in rows {
        let key = (row.aggregator.method.as_str(), row.dataset_size);
        let cell = Cell {
            mean_millis: row.mean_millis,
            error_millis: row.error_millis,
        };
        if table.insert(key, cell).is_some() {
            return Err(Error::DuplicateMeasurement {
                delay_millis,
                aggregator: row.aggregator.to_string(),
                dataset_size: row.dataset_size,
            });
        }
    }

    let present: HashSet<&str> = table.keys().map(|(method, _)| *method).collect();
    let series: Vec<Series> = class
        .series
        .iter()
        .filter(|spec| present.contains(spec.method.as_str()))
        .map(|spec| Series {
            method: spec.method.clone(),
            label: spec.label.clone(),
            cells: dataset_sizes
                .iter()
                .map(|&size| table.get(&(spec.method.as_str(), size)).copied())
                .collect(),
        })
        .collect();

    if series.is_empty() {
        return Ok(None);
    }

    Ok(Some(ChartGroup {
        delay_millis,
        class: class.class.clone(),
        dataset_sizes,
        series,
    }))
}

/// Distinct benchmark classes in first-seen order
pub fn classes_in_order(rows: &[BenchmarkRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|r| r.aggregator.class.as_str())
        .filter(|class| seen.insert(*class))
        .map(str::to_string)
        .collect()
}
