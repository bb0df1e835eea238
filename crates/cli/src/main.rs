//! Ridgeline CLI - drainage divide stability from a DEM

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ridgeline_algorithms::divide::{
    divide_stability, Advisory, BaseLevelKind, Stage, StabilityObserver, StabilityParams,
};
use ridgeline_algorithms::hydrology::{flow_direction, priority_flood, PriorityFloodParams};
use ridgeline_core::io::{read_geotiff, write_geojson};
use ridgeline_core::{Raster, CRS};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "ridgeline")]
#[command(author, version, about = "Drainage divide stability analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Compute divide-stability metrics and export channel segments
    Stability(StabilityArgs),
}

#[derive(clap::Args)]
struct StabilityArgs {
    /// Input DEM (GeoTIFF)
    input: PathBuf,

    /// Output name; writes <OUT>.geojson and <OUT>_heads.geojson
    #[arg(short, long, default_value = "divide_stability")]
    out: PathBuf,

    /// JSON file with run parameters; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum drainage area of a channel (map units squared) [default: 1e6]
    #[arg(long)]
    min_channel_area: Option<f64>,

    /// Local relief window radius (map units) [default: 500]
    #[arg(long)]
    relief_radius: Option<f64>,

    /// Chi reference drainage area [default: 1]
    #[arg(long)]
    reference_area: Option<f64>,

    /// Chi reference concavity [default: 0.5]
    #[arg(long)]
    reference_concavity: Option<f64>,

    /// Base-level control: elevation, drain_area, max_out_elevation, min_out_drain_area
    #[arg(short, long, value_parser = parse_base_level)]
    base_level_control: Option<BaseLevelKind>,

    /// Elevation floor for --base-level-control elevation
    #[arg(long)]
    min_elevation: Option<f64>,

    /// Drainage area ceiling for --base-level-control drain_area
    #[arg(long)]
    max_drainage_area: Option<f64>,

    /// Length of exported channel segments (map units) [default: 10 cells]
    #[arg(long)]
    segment_length: Option<f64>,

    /// Priority-Flood gradient enforced across filled depressions
    #[arg(long, default_value = "1e-5")]
    fill_epsilon: f64,

    /// EPSG code to assign when the DEM carries none
    #[arg(long)]
    epsg: Option<u32>,
}

impl StabilityArgs {
    /// Parameters from the config file (or defaults), overridden by flags
    fn params(&self) -> Result<StabilityParams> {
        let mut params = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => StabilityParams::default(),
        };

        if let Some(v) = self.min_channel_area {
            params.min_channel_area = v;
        }
        if let Some(v) = self.relief_radius {
            params.relief_radius = v;
        }
        if let Some(v) = self.reference_area {
            params.reference_area = v;
        }
        if let Some(v) = self.reference_concavity {
            params.reference_concavity = v;
        }
        if self.base_level_control.is_some() {
            params.base_level_control = self.base_level_control;
        }
        if self.min_elevation.is_some() {
            params.min_elevation = self.min_elevation;
        }
        if self.max_drainage_area.is_some() {
            params.max_drainage_area = self.max_drainage_area;
        }
        if self.segment_length.is_some() {
            params.segment_length = self.segment_length;
        }
        Ok(params)
    }
}

fn parse_base_level(s: &str) -> std::result::Result<BaseLevelKind, String> {
    s.parse().map_err(|e: ridgeline_core::Error| e.to_string())
}

// ─── Progress ───────────────────────────────────────────────────────────

/// Shows a spinner per pipeline stage and logs advisories as warnings
#[derive(Default)]
struct ProgressObserver {
    spinner: Option<ProgressBar>,
    started: Option<Instant>,
}

impl StabilityObserver for ProgressObserver {
    fn stage_started(&mut self, stage: Stage) {
        debug!("{stage}");
        self.spinner = Some(spinner(&format!("{stage}...")));
        self.started = Some(Instant::now());
    }

    fn stage_finished(&mut self, stage: Stage) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
        if let Some(start) = self.started.take() {
            debug!("{stage}: {:.2?}", start.elapsed());
        }
    }

    fn advisory(&mut self, advisory: &Advisory) {
        warn!("{advisory}");
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set the default tracing subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn read_dem(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

/// `<out>.geojson` and `<out>_heads.geojson`. Only a trailing `.geojson`
/// is stripped from `out`; any other dots belong to the name.
fn output_paths(out: &Path) -> (PathBuf, PathBuf) {
    let name = out
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "divide_stability".to_string());
    let stem = name.strip_suffix(".geojson").unwrap_or(&name);
    let dir = out.parent().unwrap_or_else(|| Path::new(""));
    (
        dir.join(format!("{stem}.geojson")),
        dir.join(format!("{stem}_heads.geojson")),
    )
}

fn done(name: &str, path: &Path, elapsed: Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Commands ───────────────────────────────────────────────────────────

fn info(input: &Path) -> Result<()> {
    let raster = read_dem(input)?;
    let (rows, cols) = raster.shape();
    let bounds = raster.transform().bounds(cols, rows);
    let stats = raster.statistics();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
    println!("Cell size: {}", raster.cell_size());
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    if let Some(crs) = raster.crs() {
        println!("CRS: {}", crs);
    }
    if let Some(nodata) = raster.nodata() {
        println!("NoData: {}", nodata);
    }
    println!("\nStatistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    println!(
        "  Valid cells: {} ({:.1}%)",
        stats.valid_count,
        100.0 * stats.valid_count as f64 / raster.len() as f64
    );
    Ok(())
}

fn stability(args: &StabilityArgs) -> Result<()> {
    // Configuration errors surface before the DEM is read
    let params = args.params()?;
    params.validate().context("Invalid parameters")?;

    let mut dem = read_dem(&args.input)?;
    if dem.crs().is_none()
        && let Some(code) = args.epsg
    {
        dem.set_crs(Some(CRS::from_epsg(code)));
    }

    let start = Instant::now();

    let pb = spinner("Conditioning DEM...");
    let filled = priority_flood(
        &dem,
        PriorityFloodParams {
            epsilon: args.fill_epsilon,
        },
    )
    .context("Depression filling failed")?;
    let fdir = flow_direction(&filled).context("Flow direction failed")?;
    pb.finish_and_clear();

    let mut observer = ProgressObserver::default();
    let result = divide_stability(&filled, &fdir, &params, &mut observer)
        .context("Divide stability analysis failed")?;

    info!(
        "Network: {} cells, {} outlets, {} channel heads",
        result.network.len(),
        result.network.outlets().len(),
        result.heads.len()
    );
    if let Some(threshold) = result.base_level_threshold {
        info!("Base level threshold: {threshold}");
    }

    let (segments_path, heads_path) = output_paths(&args.out);
    let pb = spinner("Writing output...");
    write_geojson(&result.segments, &segments_path)
        .with_context(|| format!("Failed to write {}", segments_path.display()))?;
    write_geojson(&result.head_features(), &heads_path)
        .with_context(|| format!("Failed to write {}", heads_path.display()))?;
    pb.finish_and_clear();

    let elapsed = start.elapsed();
    done("Channel segments", &segments_path, elapsed);
    println!("Channel heads saved to: {}", heads_path.display());
    if !result.advisories.is_empty() {
        println!("  Advisories: {}", result.advisories.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match &cli.command {
        Commands::Info { input } => info(input),
        Commands::Stability(args) => stability(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> StabilityArgs {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        match cli.command {
            Commands::Stability(args) => args,
            Commands::Info { .. } => panic!("expected stability"),
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&[
            "ridgeline",
            "stability",
            "dem.tif",
            "--relief-radius",
            "250",
            "-b",
            "max-out-elevation",
        ]);
        let params = args.params().unwrap();
        assert_eq!(params.relief_radius, 250.0);
        assert_eq!(params.min_channel_area, 1e6);
        assert_eq!(params.base_level_control, Some(BaseLevelKind::MaxOutElevation));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(Cli::try_parse_from(["ridgeline", "stability", "dem.tif", "-b", "sea"]).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(
            &path,
            r#"{ "base_level_control": "elevation", "min_elevation": 300.0, "relief_radius": 100.0 }"#,
        )
        .unwrap();
        let config = path.to_string_lossy().into_owned();
        let args = parse(&[
            "ridgeline",
            "stability",
            "dem.tif",
            "--config",
            &config,
            "--relief-radius",
            "50",
        ]);
        let params = args.params().unwrap();
        assert_eq!(params.min_elevation, Some(300.0));
        assert_eq!(params.relief_radius, 50.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_output_paths() {
        let (segments, heads) = output_paths(Path::new("out/basin"));
        assert_eq!(segments, PathBuf::from("out/basin.geojson"));
        assert_eq!(heads, PathBuf::from("out/basin_heads.geojson"));
    }

    #[test]
    fn test_output_paths_keep_dotted_names() {
        let (segments, heads) = output_paths(Path::new("runs/basin.v2"));
        assert_eq!(segments, PathBuf::from("runs/basin.v2.geojson"));
        assert_eq!(heads, PathBuf::from("runs/basin.v2_heads.geojson"));

        let (segments, heads) = output_paths(Path::new("runs/basin.geojson"));
        assert_eq!(segments, PathBuf::from("runs/basin.geojson"));
        assert_eq!(heads, PathBuf::from("runs/basin_heads.geojson"));
    }

    #[test]
    fn test_info_subcommand_parses() {
        let cli = Cli::try_parse_from(["ridgeline", "info", "dem.tif"]).unwrap();
        assert!(matches!(cli.command, Commands::Info { input } if input == Path::new("dem.tif")));
    }
}
