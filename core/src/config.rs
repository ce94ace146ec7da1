//! Plot configuration: which benchmark classes get a chart and which
//! methods become bar series

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A single bar series within a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSpec {
    /// Benchmark method name as it appears after the last dot
    pub method: String,
    /// Legend label
    pub label: String,
}

impl SeriesSpec {
    /// Create a series spec
    pub fn new(method: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            label: label.into(),
        }
    }
}

/// Series plotted for one benchmark class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSeries {
    /// Benchmark class name
    pub class: String,
    /// Series in legend order
    pub series: Vec<SeriesSpec>,
}

impl ClassSeries {
    /// Create a class entry from `(method, label)` pairs
    pub fn new(class: impl Into<String>, series: &[(&str, &str)]) -> Self {
        Self {
            class: class.into(),
            series: series
                .iter()
                .map(|(method, label)| SeriesSpec::new(*method, *label))
                .collect(),
        }
    }
}

/// Plot configuration
///
/// Classes are charted in the order listed here; series within a class keep
/// their listed order in the legend and bar offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Charted classes
    pub classes: Vec<ClassSeries>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            classes: vec![
                ClassSeries::new(
                    "ReceiptStatisticsBenchmark",
                    &[
                        ("sequentialStream", "ReceiptStats: Sequential"),
                        ("parallelStream", "ReceiptStats: Parallel"),
                        ("parallelStreamWithCustomSpliterator", "ReceiptStats: Spliterator"),
                    ],
                ),
                ClassSeries::new(
                    "StatisticsMicroBenchmarks",
                    &[
                        ("totalRevenueCircle", "TotalRevenue: Loop"),
                        ("totalRevenueStream", "TotalRevenue: Stream"),
                        ("totalRevenueCollector", "TotalRevenue: Collector"),
                        ("topItemsCircle", "TopItems: Loop"),
                        ("topItemsStream", "TopItems: Stream"),
                        ("topItemsCollector", "TopItems: Collector"),
                        ("itemAverageSequential", "ItemAverage: Sequential"),
                        ("itemAverageParallel", "ItemAverage: Parallel"),
                        ("receiptStatisticsSequential", "ReceiptStats (Micro): Sequential"),
                        ("receiptStatisticsParallel", "ReceiptStats (Micro): Parallel"),
                        ("receiptStatisticsSpliterator", "ReceiptStats (Micro): Spliterator"),
                    ],
                ),
            ],
        }
    }
}

impl PlotConfig {
    /// Configuration for the single-run lab1 results file
    pub fn legacy() -> Self {
        Self {
            classes: vec![
                ClassSeries::new(
                    "TotalRevenue",
                    &[
                        ("circleAggregate", "circle"),
                        ("streamAggregate", "stream"),
                        ("customCollectorAggregate", "customCollector"),
                    ],
                ),
                ClassSeries::new(
                    "TopItemsByQuantity",
                    &[
                        ("circle", "circle"),
                        ("stream", "stream"),
                        ("collector", "customCollector"),
                    ],
                ),
                ClassSeries::new(
                    "ItemAverageReceipt",
                    &[
                        ("circle", "circle"),
                        ("stream", "stream"),
                        ("collector", "customCollector"),
                    ],
                ),
                ClassSeries::new(
                    "ReceiptStatistics",
                    &[
                        ("circle", "circle"),
                        ("stream", "stream"),
                        ("collector", "customCollector"),
                    ],
                ),
            ],
        }
    }

    /// Configuration for the wide lab1 table, one class per dataset label
    pub fn wide<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: labels
                .into_iter()
                .map(|label| {
                    ClassSeries::new(
                        label,
                        &[
                            ("Iterative", "Iterative"),
                            ("Stream", "Stream"),
                            ("Custom", "Custom collector"),
                        ],
                    )
                })
                .collect(),
        }
    }

    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Look up the series configured for a class
    pub fn series_for(&self, class: &str) -> Option<&[SeriesSpec]> {
        self.classes
            .iter()
            .find(|c| c.class == class)
            .map(|c| c.series.as_slice())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(Error::Config("at least one class must be configured".into()));
        }

        let mut seen_classes = HashSet::new();
        for class in &self.classes {
            if class.class.trim().is_empty() {
                return Err(Error::Config("class name must not be empty".into()));
            }
            if !seen_classes.insert(class.class.as_str()) {
                return Err(Error::Config(format!("duplicate class: {}", class.class)));
            }

            let mut seen_methods = HashSet::new();
            for series in &class.series {
                if series.method.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "empty method name in class {}",
                        class.class
                    )));
                }
                if !seen_methods.insert(series.method.as_str()) {
                    return Err(Error::Config(format!(
                        "duplicate method {} in class {}",
                        series.method, class.class
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = PlotConfig::default();
        assert_eq!(config.classes.len(), 2);
        assert_eq!(config.classes[0].class, "ReceiptStatisticsBenchmark");
        assert_eq!(config.classes[0].series.len(), 3);
        assert_eq!(config.classes[1].series.len(), 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(PlotConfig::legacy().validate().is_ok());
        assert!(PlotConfig::wide(["Simple", "Complex"]).validate().is_ok());
    }

    #[test]
    fn test_series_for() {
        let config = PlotConfig::default();
        let series = config.series_for("ReceiptStatisticsBenchmark").unwrap();
        assert_eq!(series[1].method, "parallelStream");
        assert_eq!(series[1].label, "ReceiptStats: Parallel");
        assert!(config.series_for("Unknown").is_none());
    }

    #[test]
    fn test_validation_empty() {
        let config = PlotConfig { classes: vec![] };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_duplicate_class() {
        let config = PlotConfig {
            classes: vec![
                ClassSeries::new("A", &[("x", "X")]),
                ClassSeries::new("A", &[("y", "Y")]),
            ],
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validation_duplicate_method() {
        let config = PlotConfig {
            classes: vec![ClassSeries::new("A", &[("x", "X"), ("x", "X again")])],
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"classes":[{{"class":"Bench","series":[{{"method":"fast","label":"Fast"}}]}}]}}"#
        )
        .unwrap();

        let config = PlotConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.classes.len(), 1);
        assert_eq!(config.series_for("Bench").unwrap()[0].label, "Fast");
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"classes":[]}}"#).unwrap();
        assert!(matches!(
            PlotConfig::from_json_file(file.path()),
            Err(Error::Config(_))
        ));
    }
}
