//! Grouped bar charts on a logarithmic axis

use crate::Renderer;
use anyhow::{Context, Result};
use bench_charts_core::format::{format_tick, group_thousands};
use bench_charts_core::{ChartGroup, CrossoverRow, Labeling};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

// Font sizes, tuned for the default 1800x1080 canvas
const TITLE_FONT_SIZE: u32 = 44;
const AXIS_LABEL_FONT_SIZE: u32 = 30;
const TICK_LABEL_FONT_SIZE: u32 = 24;
const LEGEND_FONT_SIZE: u32 = 24;
const ANNOTATION_FONT_SIZE: u32 = 26;

/// Fraction of each dataset slot covered by its bars
const GROUP_WIDTH: f64 = 0.8;

const PALETTE: [RGBColor; 12] = [
    RGBColor(78, 121, 167),
    RGBColor(242, 142, 43),
    RGBColor(225, 87, 89),
    RGBColor(118, 183, 178),
    RGBColor(89, 161, 79),
    RGBColor(237, 201, 72),
    RGBColor(176, 122, 161),
    RGBColor(255, 157, 167),
    RGBColor(156, 117, 95),
    RGBColor(186, 176, 172),
    RGBColor(31, 119, 180),
    RGBColor(148, 103, 189),
];

fn series_color(idx: usize) -> RGBColor {
    PALETTE[idx % PALETTE.len()]
}

/// Canvas size and file naming
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// File name prefix, e.g. `lab2-benchmark`
    pub prefix: String,
    /// Title and file naming scheme
    pub labeling: Labeling,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1800,
            height: 1080,
            prefix: "lab2-benchmark".to_string(),
            labeling: Labeling::DelayTier,
        }
    }
}

/// Log axis bounds: half the smallest bar extent to twice the largest
pub fn axis_range(group: &ChartGroup) -> (f64, f64) {
    match group.value_range() {
        Some((low, high)) => (low / 2.0, high * 2.0),
        None => (0.1, 10.0),
    }
}

/// Width of one bar for `series_count` series
pub fn bar_width(series_count: usize) -> f64 {
    GROUP_WIDTH / series_count.max(1) as f64
}

/// Horizontal offset of series `idx` from the centre of its dataset slot
pub fn bar_offset(idx: usize, series_count: usize) -> f64 {
    (idx as f64 - (series_count as f64 - 1.0) / 2.0) * bar_width(series_count)
}

/// Tick label for x position `x`: the dataset size when `x` sits on a slot,
/// otherwise empty
pub fn x_tick_label(sizes: &[u64], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() > 0.3 {
        return String::new();
    }
    sizes
        .get(idx as usize)
        .map(|&size| group_thousands(size, ' '))
        .unwrap_or_default()
}

/// Renders chart groups to PNG files
pub struct PngRenderer {
    output_dir: PathBuf,
    options: ChartOptions,
}

impl PngRenderer {
    /// Create a renderer writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>, options: ChartOptions) -> Self {
        Self {
            output_dir: output_dir.into(),
            options,
        }
    }

    /// File the chart for `group` is written to
    pub fn output_path(&self, group: &ChartGroup) -> PathBuf {
        self.output_dir
            .join(self.options.labeling.file_name(group, &self.options.prefix))
    }

    /// Draw one grouped bar chart to `path`
    pub fn draw(&self, group: &ChartGroup, crossover: Option<&CrossoverRow>, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (self.options.width, self.options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let (y_min, y_max) = axis_range(group);
        let slots = group.dataset_sizes.len();
        let sizes = &group.dataset_sizes;

        let mut chart = ChartBuilder::on(&root)
            .caption(self.options.labeling.title(group), ("sans-serif", TITLE_FONT_SIZE))
            .margin(20)
            .x_label_area_size(80)
            .y_label_area_size(120)
            .build_cartesian_2d(
                -0.5..(slots as f64 - 0.5),
                (y_min..y_max).log_scale(),
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(slots.max(1))
            .x_label_formatter(&|x| x_tick_label(sizes, *x))
            .y_label_formatter(&|y| format_tick(*y))
            .x_desc("Receipts count")
            .y_desc("Mean time, ms (log scale)")
            .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
            .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
            .draw()?;

        let count = group.series.len();
        let half = bar_width(count) / 2.0;

        for (idx, series) in group.series.iter().enumerate() {
            let color = series_color(idx);
            let offset = bar_offset(idx, count);

            // (x centre, mean, error) of every drawable bar
            let bars: Vec<(f64, f64, f64)> = series
                .cells
                .iter()
                .enumerate()
                .filter_map(|(slot, cell)| {
                    let cell = (*cell)?;
                    (cell.mean_millis.is_finite() && cell.mean_millis > 0.0)
                        .then(|| (slot as f64 + offset, cell.mean_millis, cell.error_millis))
                })
                .collect();

            chart
                .draw_series(bars.iter().map(|&(x, mean, _)| {
                    Rectangle::new([(x - half, y_min), (x + half, mean)], color.filled())
                }))?
                .label(series.label.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 8), (x + 24, y + 8)], color.filled()));

            chart.draw_series(
                bars.iter()
                    .filter(|&&(_, _, error)| error.is_finite() && error > 0.0)
                    .map(|&(x, mean, error)| {
                        ErrorBar::new_vertical(
                            x,
                            (mean - error).max(y_min),
                            mean,
                            mean + error,
                            BLACK.stroke_width(2),
                            12,
                        )
                    }),
            )?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", LEGEND_FONT_SIZE))
            .draw()?;

        if let Some(info) = crossover {
            let text = format!("Crossover: {}", info.description());
            let style = TextStyle::from(("sans-serif", ANNOTATION_FONT_SIZE).into_font());
            let (text_w, text_h) = root.estimate_text_size(&text, &style)?;

            let (base_x, base_y) = chart.plotting_area().get_base_pixel();
            let (area_w, _) = chart.plotting_area().dim_in_pixel();
            let pad = 10;
            let x0 = base_x + (area_w as f64 * 0.02) as i32;
            let y0 = base_y + pad;
            let corners = [
                (x0, y0),
                (x0 + text_w as i32 + 2 * pad, y0 + text_h as i32 + 2 * pad),
            ];

            root.draw(&Rectangle::new(corners, WHITE.mix(0.6).filled()))?;
            root.draw(&Rectangle::new(corners, BLACK.mix(0.4).stroke_width(1)))?;
            root.draw(&Text::new(text, (x0 + pad, y0 + pad), style))?;
        }

        root.present()?;
        Ok(())
    }
}

impl Renderer for PngRenderer {
    fn render(
        &mut self,
        group: &ChartGroup,
        crossover: Option<&CrossoverRow>,
    ) -> Result<Option<PathBuf>> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory: {}", self.output_dir.display())
        })?;

        let path = self.output_path(group);
        self.draw(group, crossover, &path)
            .with_context(|| format!("Failed to draw chart: {}", path.display()))?;

        tracing::info!(
            delay_millis = group.delay_millis,
            class = %group.class,
            "Saved chart to {}",
            path.display()
        );
        Ok(Some(path))
    }
}
