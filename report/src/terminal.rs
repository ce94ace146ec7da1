//! Plain-text rendering of chart groups
//!
//! Used when charts are not saved: there is no window to show them in, so the
//! pivot table behind each chart is printed instead.

use crate::Renderer;
use anyhow::Result;
use bench_charts_core::format::{format_measurement, group_thousands};
use bench_charts_core::{ChartGroup, CrossoverRow, Labeling};
use std::io::{self, Write};
use std::path::PathBuf;

const SIZE_HEADER: &str = "Receipts count";

/// Writes one table per chart group
pub struct TerminalRenderer<W: Write> {
    out: W,
    labeling: Labeling,
}

impl TerminalRenderer<io::Stdout> {
    /// Renderer printing to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    /// Renderer writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            labeling: Labeling::DelayTier,
        }
    }

    /// Use `labeling` for table titles
    pub fn with_labeling(mut self, labeling: Labeling) -> Self {
        self.labeling = labeling;
        self
    }

    /// Consume the renderer and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_table(&mut self, group: &ChartGroup, crossover: Option<&CrossoverRow>) -> io::Result<()> {
        let size_labels: Vec<String> = group
            .dataset_sizes
            .iter()
            .map(|&size| group_thousands(size, ' '))
            .collect();

        let columns: Vec<Vec<String>> = group
            .series
            .iter()
            .map(|series| {
                series
                    .cells
                    .iter()
                    .map(|cell| match cell {
                        Some(c) => format_measurement(c.mean_millis, c.error_millis),
                        None => "-".to_string(),
                    })
                    .collect()
            })
            .collect();

        let size_width = size_labels
            .iter()
            .map(|s| s.chars().count())
            .chain(std::iter::once(SIZE_HEADER.len()))
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = group
            .series
            .iter()
            .zip(&columns)
            .map(|(series, cells)| {
                cells
                    .iter()
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(series.label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        writeln!(self.out, "{}", "=".repeat(70))?;
        writeln!(self.out, "   {}", self.labeling.title(group))?;
        writeln!(self.out, "{}", "=".repeat(70))?;

        write!(self.out, "{:>width$}", SIZE_HEADER, width = size_width)?;
        for (series, &width) in group.series.iter().zip(&widths) {
            write!(self.out, "  {:>width$}", series.label, width = width)?;
        }
        writeln!(self.out)?;

        for (row, size) in size_labels.iter().enumerate() {
            write!(self.out, "{:>width$}", size, width = size_width)?;
            for (cells, &width) in columns.iter().zip(&widths) {
                write!(self.out, "  {:>width$}", cells[row], width = width)?;
            }
            writeln!(self.out)?;
        }

        if let Some(info) = crossover {
            writeln!(self.out)?;
            writeln!(self.out, "Crossover: {}", info.description())?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(
        &mut self,
        group: &ChartGroup,
        crossover: Option<&CrossoverRow>,
    ) -> Result<Option<PathBuf>> {
        self.write_table(group, crossover)?;
        Ok(None)
    }
}
