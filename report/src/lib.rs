//! Report rendering for benchmark chart groups
//!
//! This crate provides renderers for:
//!
//! - PNG grouped bar charts (log scale, error bars, crossover annotation)
//! - Plain-text tables on a terminal

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chart;
pub mod terminal;

pub use chart::{ChartOptions, PngRenderer};
pub use terminal::TerminalRenderer;

use anyhow::Result;
use bench_charts_core::{ChartGroup, CrossoverRow};
use std::path::PathBuf;

/// Something that can present one chart group
pub trait Renderer {
    /// Render a group, annotated with the crossover info of its delay tier
    ///
    /// Returns the path of the written file, if the renderer writes one.
    fn render(
        &mut self,
        group: &ChartGroup,
        crossover: Option<&CrossoverRow>,
    ) -> Result<Option<PathBuf>>;
}
