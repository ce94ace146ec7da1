//! Benchmark measurement and crossover records

use crate::format::group_thousands;
use std::fmt;

/// Benchmark identifier split into class and method
///
/// Parsed from the JMH label `Class.method`; the split happens at the last
/// dot so that `pkg.Class.method` keeps `pkg.Class` as the class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregatorId {
    /// Benchmark class, e.g. `ReceiptStatisticsBenchmark`
    pub class: String,
    /// Benchmark method, e.g. `parallelStream`
    pub method: String,
}

impl AggregatorId {
    /// Create an identifier from its parts
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Parse a `Class.method` label
    ///
    /// A label without a dot is used as both class and method.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        match label.rsplit_once('.') {
            Some((class, method)) => Self::new(class, method),
            None => Self::new(label, label),
        }
    }
}

impl fmt::Display for AggregatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class == self.method {
            write!(f, "{}", self.class)
        } else {
            write!(f, "{}.{}", self.class, self.method)
        }
    }
}

/// One measurement from the summary table
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRow {
    /// Simulated per-item delay in milliseconds
    pub delay_millis: u64,
    /// Number of receipts in the dataset
    pub dataset_size: u64,
    /// Benchmark that produced the measurement
    pub aggregator: AggregatorId,
    /// Mean execution time
    pub mean_millis: f64,
    /// Half-width of the 95% confidence interval
    pub error_millis: f64,
    /// Score unit as reported by JMH, e.g. `ms/op`
    pub unit: String,
}

/// How a crossover point was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverKind {
    /// Both pipelines measured equal at a dataset size
    Exact,
    /// Linear interpolation between neighbouring sizes
    Interpolated,
    /// No crossover within the measured range
    None,
}

impl CrossoverKind {
    /// Parse the `type` column; anything unrecognised is `None`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Self::Exact,
            "interpolated" => Self::Interpolated,
            _ => Self::None,
        }
    }

    /// Lower-case name as written to CSV
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Interpolated => "interpolated",
            Self::None => "none",
        }
    }
}

/// Sequential and parallel timings at one dataset size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    /// Dataset size of the measurement
    pub dataset_size: u64,
    /// Sequential pipeline mean
    pub sequential_millis: f64,
    /// Parallel pipeline mean
    pub parallel_millis: f64,
}

impl Boundary {
    /// Sequential minus parallel; negative when sequential is faster
    pub fn diff(&self) -> f64 {
        self.sequential_millis - self.parallel_millis
    }
}

/// Per-delay crossover annotation
#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverRow {
    /// Delay tier the annotation belongs to
    pub delay_millis: u64,
    /// How the crossover was found
    pub kind: CrossoverKind,
    /// Estimated dataset size of the crossover
    pub estimated_dataset_size: Option<f64>,
    /// Measurement at or below the crossover
    pub lower: Option<Boundary>,
    /// Measurement at or above the crossover
    pub upper: Option<Boundary>,
    /// Free-form explanation
    pub note: String,
}

impl CrossoverRow {
    /// Human readable crossover text shown in the chart annotation
    pub fn description(&self) -> String {
        match self.kind {
            CrossoverKind::Exact | CrossoverKind::Interpolated => match self.estimated_dataset_size {
                Some(estimate) if estimate.is_finite() => {
                    let approx = estimate.round().max(0.0) as u64;
                    format!("≈ {} receipts", group_thousands(approx, ','))
                }
                _ => "within measured range".to_string(),
            },
            CrossoverKind::None => {
                let note = self.note.trim();
                if note.is_empty() {
                    "no crossover within measured range".to_string()
                } else {
                    note.to_string()
                }
            }
        }
    }
}
