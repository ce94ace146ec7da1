//! bench-charts-core: data model and table reshaping for benchmark charts
//!
//! This crate provides everything short of drawing:
//!
//! - Summary, crossover and lab1 result loaders
//! - Plot configuration (which classes and methods are charted)
//! - Pivoting rows into per-delay, per-class chart groups
//! - Crossover estimation and CSV export
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod crossover;
pub mod error;
pub mod export;
pub mod format;
pub mod loader;
pub mod model;
pub mod reshape;

pub use config::{ClassSeries, PlotConfig, SeriesSpec};
pub use crossover::estimate_crossovers;
pub use error::*;
pub use export::{write_crossover_csv, write_summary_csv};
pub use loader::{load_crossover, load_legacy_json, load_summary, load_wide_csv};
pub use model::*;
pub use reshape::{reshape, Cell, ChartGroup, Labeling, Series};
