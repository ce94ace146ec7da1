//! CLI argument parsing and command dispatch

use anyhow::{Context, Result};
use bench_charts_core::loader::LEGACY_SIZES;
use bench_charts_core::reshape::classes_in_order;
use bench_charts_core::{
    estimate_crossovers, load_crossover, load_legacy_json, load_summary, load_wide_csv, reshape,
    write_crossover_csv, write_summary_csv, BenchmarkRow, ChartGroup, CrossoverRow, Labeling,
    PlotConfig,
};
use bench_charts_report::{ChartOptions, PngRenderer, Renderer, TerminalRenderer};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_SUMMARY: &str = "target/reports/lab2-benchmark-summary.csv";
const DEFAULT_CROSSOVER: &str = "target/reports/lab2-benchmark-crossover.csv";

/// Bench Charts - grouped bar charts from benchmark summaries
#[derive(Parser, Debug)]
#[command(name = "bench-charts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chart a lab2 summary CSV, one chart per delay tier and class
    Plot(PlotArgs),
    /// Estimate crossover points from a summary CSV
    Crossover(CrossoverArgs),
    /// Chart lab1 results (JSON or wide CSV)
    Legacy(LegacyArgs),
}

/// Image output shared by the charting commands
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Save PNG files instead of printing tables
    #[arg(long)]
    pub save: bool,

    /// Directory for saved charts
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value = "1800")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "1080")]
    pub height: u32,
}

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Summary CSV produced by the benchmark run
    #[arg(short, long, env = "BENCH_SUMMARY", default_value = DEFAULT_SUMMARY)]
    pub summary: PathBuf,

    /// Crossover CSV (optional, missing file means no annotations)
    #[arg(short = 'x', long, default_value = DEFAULT_CROSSOVER)]
    pub crossover: PathBuf,

    /// Estimate crossover points from the summary when the crossover file is missing
    #[arg(long)]
    pub derive_crossover: bool,

    /// JSON plot configuration (classes and series to chart)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File name prefix for saved charts
    #[arg(long, default_value = "lab2-benchmark")]
    pub prefix: String,

    #[command(flatten)]
    pub image: SaveArgs,
}

#[derive(Args, Debug)]
pub struct CrossoverArgs {
    /// Summary CSV produced by the benchmark run
    #[arg(short, long, env = "BENCH_SUMMARY", default_value = DEFAULT_SUMMARY)]
    pub summary: PathBuf,

    /// Crossover CSV to write
    #[arg(short, long, default_value = DEFAULT_CROSSOVER)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct LegacyArgs {
    /// benchmark_results.json, or a wide CSV (selected by the .csv extension)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Dataset sizes of the JSON timing lists
    #[arg(long, value_delimiter = ',', default_values_t = LEGACY_SIZES)]
    pub sizes: Vec<u64>,

    /// Write the results as a summary CSV instead of charting them
    #[arg(long)]
    pub convert: Option<PathBuf>,

    /// File name prefix for saved charts
    #[arg(long, default_value = "lab1-benchmark")]
    pub prefix: String,

    #[command(flatten)]
    pub image: SaveArgs,
}

impl Cli {
    /// Run the selected command
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Plot(args) => run_plot(args),
            Commands::Crossover(args) => run_crossover(args),
            Commands::Legacy(args) => run_legacy(args),
        }
    }

    /// Default log filter directive
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

fn run_plot(args: &PlotArgs) -> Result<()> {
    let (groups, crossover) = plot_groups(args)?;

    let output_dir = args
        .image
        .output
        .clone()
        .unwrap_or_else(|| parent_dir(&args.summary));
    let mut renderer = renderer_for(&args.image, output_dir, &args.prefix, Labeling::DelayTier);
    present(renderer.as_mut(), &groups, &crossover)
}

/// Load the summary and its crossover info and reshape it into chart groups
fn plot_groups(args: &PlotArgs) -> Result<(Vec<ChartGroup>, BTreeMap<u64, CrossoverRow>)> {
    let rows = load_summary(&args.summary)
        .with_context(|| format!("Failed to load summary: {}", args.summary.display()))?;

    let mut crossover = load_crossover(&args.crossover)
        .with_context(|| format!("Failed to load crossover info: {}", args.crossover.display()))?;
    if crossover.is_empty() && args.derive_crossover {
        tracing::info!("No crossover info in {}, estimating from summary", args.crossover.display());
        crossover = estimate_crossovers(&rows);
    }

    let config = match &args.config {
        Some(path) => PlotConfig::from_json_file(path)
            .with_context(|| format!("Failed to load plot config: {}", path.display()))?,
        None => PlotConfig::default(),
    };

    let groups = reshape(&rows, &config).context("Failed to reshape summary")?;
    tracing::info!(
        "Loaded {} rows into {} chart groups",
        rows.len(),
        groups.len()
    );
    Ok((groups, crossover))
}

fn run_crossover(args: &CrossoverArgs) -> Result<()> {
    let rows = load_summary(&args.summary)
        .with_context(|| format!("Failed to load summary: {}", args.summary.display()))?;

    let crossover = estimate_crossovers(&rows);
    write_crossover_csv(&args.output, &crossover)
        .with_context(|| format!("Failed to write crossover CSV to: {}", args.output.display()))?;

    for row in crossover.values() {
        println!("  delay {:>5} ms: {}", row.delay_millis, row.description());
    }
    println!("✓ Crossover CSV exported to: {}", args.output.display());
    Ok(())
}

fn run_legacy(args: &LegacyArgs) -> Result<()> {
    let (rows, config) = legacy_rows(args)?;

    if let Some(path) = &args.convert {
        write_summary_csv(path, &rows)
            .with_context(|| format!("Failed to write summary CSV to: {}", path.display()))?;
        println!("✓ Summary CSV exported to: {}", path.display());
        return Ok(());
    }

    let groups = reshape(&rows, &config).context("Failed to reshape results")?;
    let output_dir = args
        .image
        .output
        .clone()
        .unwrap_or_else(|| parent_dir(&args.input));
    let mut renderer = renderer_for(&args.image, output_dir, &args.prefix, Labeling::Dataset);
    present(renderer.as_mut(), &groups, &BTreeMap::new())
}

/// Lab1 rows with the plot config matching their format
fn legacy_rows(args: &LegacyArgs) -> Result<(Vec<BenchmarkRow>, PlotConfig)> {
    let is_wide = args
        .input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_wide {
        let rows = load_wide_csv(&args.input)
            .with_context(|| format!("Failed to load wide CSV: {}", args.input.display()))?;
        let config = PlotConfig::wide(classes_in_order(&rows));
        Ok((rows, config))
    } else {
        let rows = load_legacy_json(&args.input, &args.sizes)
            .with_context(|| format!("Failed to load results: {}", args.input.display()))?;
        Ok((rows, PlotConfig::legacy()))
    }
}

/// Directory containing `path`, or the current directory
fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// PNG files with `--save`, stdout tables otherwise
fn renderer_for(
    image: &SaveArgs,
    output_dir: PathBuf,
    prefix: &str,
    labeling: Labeling,
) -> Box<dyn Renderer> {
    if image.save {
        let options = ChartOptions {
            width: image.width,
            height: image.height,
            prefix: prefix.to_string(),
            labeling,
        };
        Box::new(PngRenderer::new(output_dir, options))
    } else {
        Box::new(TerminalRenderer::stdout().with_labeling(labeling))
    }
}

fn present(
    renderer: &mut dyn Renderer,
    groups: &[ChartGroup],
    crossover: &BTreeMap<u64, CrossoverRow>,
) -> Result<()> {
    if groups.is_empty() {
        println!("No data to chart.");
        return Ok(());
    }

    for path in render_all(renderer, groups, crossover)? {
        println!("✓ Saved chart: {}", path.display());
    }
    Ok(())
}

/// Render every group with its delay tier's crossover info, collecting written files
pub fn render_all(
    renderer: &mut dyn Renderer,
    groups: &[ChartGroup],
    crossover: &BTreeMap<u64, CrossoverRow>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for group in groups {
        if let Some(path) = renderer.render(group, crossover.get(&group.delay_millis))? {
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SUMMARY: &str = "delayMillis,datasetSize,aggregator,meanMillis,errorMillis,unit\n\
        0,5000,ReceiptStatisticsBenchmark.sequentialStream,1.0,0.1,ms/op\n\
        0,5000,ReceiptStatisticsBenchmark.parallelStream,3.0,0.2,ms/op\n\
        0,25000,ReceiptStatisticsBenchmark.sequentialStream,10.0,0.5,ms/op\n\
        0,25000,ReceiptStatisticsBenchmark.parallelStream,4.0,0.3,ms/op\n";

    fn plot_args(flags: &[&str]) -> PlotArgs {
        let argv = ["bench-charts", "plot"].iter().chain(flags);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Plot(args) => args,
            other => panic!("expected plot command, got {:?}", other),
        }
    }

    fn legacy_args(flags: &[&str]) -> LegacyArgs {
        let argv = ["bench-charts", "legacy"].iter().chain(flags);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Legacy(args) => args,
            other => panic!("expected legacy command, got {:?}", other),
        }
    }

    fn tables(groups: &[ChartGroup], crossover: &BTreeMap<u64, CrossoverRow>, labeling: Labeling) -> String {
        let mut renderer = TerminalRenderer::new(Vec::new()).with_labeling(labeling);
        present(&mut renderer, groups, crossover).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_plot_defaults() {
        let cli = Cli::try_parse_from(["bench-charts", "plot"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(cli.log_level(), "info");

        let Commands::Plot(args) = cli.command else {
            panic!("expected plot command");
        };
        assert_eq!(args.summary, PathBuf::from(DEFAULT_SUMMARY));
        assert_eq!(args.crossover, PathBuf::from(DEFAULT_CROSSOVER));
        assert_eq!(args.prefix, "lab2-benchmark");
        assert!(!args.image.save);
        assert!(args.image.output.is_none());
        assert_eq!((args.image.width, args.image.height), (1800, 1080));
    }

    #[test]
    fn test_plot_flags() {
        let cli = Cli::try_parse_from([
            "bench-charts",
            "plot",
            "--summary",
            "in.csv",
            "--save",
            "--output",
            "charts",
            "--width",
            "800",
            "--derive-crossover",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), "debug");

        let Commands::Plot(args) = cli.command else {
            panic!("expected plot command");
        };
        assert_eq!(args.summary, PathBuf::from("in.csv"));
        assert!(args.image.save);
        assert!(args.derive_crossover);
        assert_eq!(args.image.output, Some(PathBuf::from("charts")));
        assert_eq!(args.image.width, 800);
    }

    #[test]
    fn test_legacy_sizes() {
        let cli = Cli::try_parse_from([
            "bench-charts",
            "legacy",
            "--input",
            "results.json",
            "--sizes",
            "100,200",
        ])
        .unwrap();

        let Commands::Legacy(args) = cli.command else {
            panic!("expected legacy command");
        };
        assert_eq!(args.sizes, vec![100, 200]);
        assert_eq!(args.prefix, "lab1-benchmark");

        let args = legacy_args(&["--input", "results.json"]);
        assert_eq!(args.sizes, LEGACY_SIZES.to_vec());
    }

    #[test]
    fn test_legacy_requires_input() {
        assert!(Cli::try_parse_from(["bench-charts", "legacy"]).is_err());
        assert!(Cli::try_parse_from(["bench-charts"]).is_err());
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("a/b/summary.csv")), PathBuf::from("a/b"));
        assert_eq!(parent_dir(Path::new("summary.csv")), PathBuf::from("."));
    }

    #[test]
    fn test_crossover_command_writes_csv() {
        let dir = tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let output = dir.path().join("out").join("crossover.csv");
        fs::write(&summary, SUMMARY).unwrap();

        let cli = Cli::try_parse_from([
            "bench-charts",
            "crossover",
            "--summary",
            summary.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        cli.run().unwrap();

        let crossover = load_crossover(&output).unwrap();
        assert_eq!(crossover.len(), 1);
        assert_eq!(crossover[&0].description(), "≈ 10,000 receipts");
    }

    #[test]
    fn test_plot_missing_summary_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.csv");

        let cli = Cli::try_parse_from([
            "bench-charts",
            "plot",
            "--summary",
            missing.to_str().unwrap(),
        ])
        .unwrap();
        let err = cli.run().unwrap_err();
        assert!(format!("{err:#}").contains("file not found"));
    }

    #[test]
    fn test_legacy_convert() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("benchmark_results.json");
        let output = dir.path().join("summary.csv");
        fs::write(
            &input,
            r#"{"TotalRevenue.circleAggregate": [1.5, 2.5, 3.5]}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "bench-charts",
            "legacy",
            "--input",
            input.to_str().unwrap(),
            "--convert",
            output.to_str().unwrap(),
        ])
        .unwrap();
        cli.run().unwrap();

        let rows = load_summary(&output).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].dataset_size, 250000);
        assert_eq!(rows[2].mean_millis, 3.5);
    }

    #[test]
    fn test_render_all_collects_paths() {
        struct Recorder(Vec<(u64, bool)>);

        impl Renderer for Recorder {
            fn render(
                &mut self,
                group: &ChartGroup,
                crossover: Option<&CrossoverRow>,
            ) -> Result<Option<PathBuf>> {
                self.0.push((group.delay_millis, crossover.is_some()));
                Ok(Some(PathBuf::from(format!("{}.png", group.delay_millis))))
            }
        }

        let dir = tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        fs::write(&summary, SUMMARY).unwrap();
        let rows = load_summary(&summary).unwrap();
        let groups = reshape(&rows, &PlotConfig::default()).unwrap();
        let crossover = estimate_crossovers(&rows);

        let mut recorder = Recorder(Vec::new());
        let written = render_all(&mut recorder, &groups, &crossover).unwrap();
        assert_eq!(written, vec![PathBuf::from("0.png")]);
        assert_eq!(recorder.0, vec![(0, true)]);
    }

    #[test]
    fn test_plot_derives_crossover_when_file_missing() {
        let dir = tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let absent = dir.path().join("crossover.csv");
        fs::write(&summary, SUMMARY).unwrap();
        let summary = summary.to_str().unwrap();
        let absent = absent.to_str().unwrap();

        let args = plot_args(&["--summary", summary, "--crossover", absent, "--derive-crossover"]);
        let (groups, crossover) = plot_groups(&args).unwrap();
        assert_eq!(crossover[&0].description(), "≈ 10,000 receipts");

        let text = tables(&groups, &crossover, Labeling::DelayTier);
        assert!(text.contains("ReceiptStatisticsBenchmark (delay = 0 ms)"));
        assert!(text.contains("Crossover: ≈ 10,000 receipts"));

        // Without the flag a missing file means no annotation
        let args = plot_args(&["--summary", summary, "--crossover", absent]);
        let (groups, crossover) = plot_groups(&args).unwrap();
        assert!(crossover.is_empty());
        assert!(!tables(&groups, &crossover, Labeling::DelayTier).contains("Crossover"));
    }

    #[test]
    fn test_plot_saves_png() {
        let dir = tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let absent = dir.path().join("crossover.csv");
        let out = dir.path().join("out");
        fs::write(&summary, SUMMARY).unwrap();

        let cli = Cli::try_parse_from([
            "bench-charts",
            "plot",
            "--summary",
            summary.to_str().unwrap(),
            "--crossover",
            absent.to_str().unwrap(),
            "--derive-crossover",
            "--save",
            "--output",
            out.to_str().unwrap(),
        ])
        .unwrap();
        cli.run().unwrap();

        let png = out.join("lab2-benchmark-ReceiptStatisticsBenchmark-delay-0.png");
        assert!(png.exists());
        assert!(fs::metadata(&png).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_config_override() {
        let dir = tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let config = dir.path().join("plot.json");
        fs::write(&summary, SUMMARY).unwrap();
        fs::write(
            &config,
            r#"{"classes": [{"class": "ReceiptStatisticsBenchmark",
                "series": [{"method": "parallelStream", "label": "Par"}]}]}"#,
        )
        .unwrap();

        let args = plot_args(&[
            "--summary",
            summary.to_str().unwrap(),
            "--crossover",
            dir.path().join("none.csv").to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ]);
        let (groups, _) = plot_groups(&args).unwrap();

        assert_eq!(groups.len(), 1);
        let labels: Vec<&str> = groups[0].series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Par"]);
        assert_eq!(groups[0].dataset_sizes, vec![5000, 25000]);
    }

    #[test]
    fn test_plot_invalid_config_fails() {
        let dir = tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let config = dir.path().join("plot.json");
        fs::write(&summary, SUMMARY).unwrap();
        fs::write(&config, r#"{"classes": []}"#).unwrap();

        let args = plot_args(&[
            "--summary",
            summary.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ]);
        let err = plot_groups(&args).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load plot config"));
    }

    const WIDE: &str = "Dataset,Receipts,Iterative,Stream,Custom\n\
        Simple,5000,45,62,59\n\
        Complex,5000,90,70,60\n";

    #[test]
    fn test_legacy_wide_csv_convert() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("lab1.CSV");
        let output = dir.path().join("summary.csv");
        fs::write(&input, WIDE).unwrap();

        let cli = Cli::try_parse_from([
            "bench-charts",
            "legacy",
            "--input",
            input.to_str().unwrap(),
            "--convert",
            output.to_str().unwrap(),
        ])
        .unwrap();
        cli.run().unwrap();

        let rows = load_summary(&output).unwrap();
        let ids: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.aggregator.class.as_str(), r.aggregator.method.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("Complex", "Custom"),
                ("Complex", "Iterative"),
                ("Complex", "Stream"),
                ("Simple", "Custom"),
                ("Simple", "Iterative"),
                ("Simple", "Stream"),
            ]
        );
        assert!(rows.iter().all(|r| r.delay_millis == 0 && r.dataset_size == 5000));
    }

    #[test]
    fn test_legacy_wide_csv_tables() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("lab1.csv");
        fs::write(&input, WIDE).unwrap();

        let args = legacy_args(&["--input", input.to_str().unwrap()]);
        let (rows, config) = legacy_rows(&args).unwrap();
        let groups = reshape(&rows, &config).unwrap();

        // File order, not alphabetical
        let classes: Vec<&str> = groups.iter().map(|g| g.class.as_str()).collect();
        assert_eq!(classes, vec!["Simple", "Complex"]);

        let text = tables(&groups, &BTreeMap::new(), Labeling::Dataset);
        assert!(text.contains("Benchmark: Simple dataset"));
        assert!(text.contains("Custom collector"));
        assert!(!text.contains("delay ="));
    }
}
