use clap::{Parser, Subcommand};
use cli::{ExtractionReport, compare_distributions, prepare_raster, timed_find};
use color_eyre::eyre::Result;
use contours::{ApproximationMethod, Distribution, ExtractionConfig, RetrievalMode};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Settings that can come from a config file and be overridden per run
#[derive(clap::Args, Debug, Clone)]
struct ExtractArgs {
    /// Path to the input image
    #[arg(short, long)]
    input: PathBuf,
    /// TOML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Retrieval mode: external, list, ccomp or tree
    #[arg(long)]
    mode: Option<RetrievalMode>,
    /// Approximation method: none or simple
    #[arg(long)]
    method: Option<ApproximationMethod>,
    /// Horizontal offset added to every point
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<i32>,
    /// Vertical offset added to every point
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<i32>,
    /// Binarise the image with this cut-off first (any colour type is accepted then)
    #[arg(long)]
    threshold: Option<u8>,
    /// Upper bound on worker threads
    #[arg(long)]
    max_workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract contours and their hierarchy from an image
    Extract {
        #[command(flatten)]
        args: ExtractArgs,
        /// Work distribution: sequential, data_parallel or adaptive
        #[arg(long)]
        distribution: Option<Distribution>,
        /// Write contours and hierarchy as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write contours as GeoJSON polygons
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Write a run summary as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run every distribution on the same image and compare timings
    Compare {
        #[command(flatten)]
        args: ExtractArgs,
    },
    /// Print the JSON schema of the configuration file
    Schema,
    /// List retrieval modes and approximation methods
    Modes,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { args, distribution, output, geojson, report } => {
            let mut config = load_config(&args)?;
            if let Some(distribution) = distribution {
                config.distribution = distribution;
            }
            extract(&args.input, &config, output.as_deref(), geojson.as_deref(), report.as_deref())?;
        }
        Commands::Compare { args } => {
            let config = load_config(&args)?;
            compare(&args.input, &config)?;
        }
        Commands::Schema => {
            let schema = ExtractionConfig::schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Modes => {
            println!("Retrieval modes:");
            for mode in RetrievalMode::iter() {
                println!("  {:<10} {}", mode.to_string(), mode.description());
            }
            println!("Approximation methods:");
            for method in ApproximationMethod::iter() {
                println!("  {:<10} {}", method.to_string(), method.description());
            }
        }
    }

    Ok(())
}

fn load_config(args: &ExtractArgs) -> Result<ExtractionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            ExtractionConfig::from_file(path)?
        }
        None => ExtractionConfig::default(),
    };

    if let Some(mode) = args.mode {
        config.retrieval = mode;
    }
    if let Some(method) = args.method {
        config.approximation = method;
    }
    if let Some(dx) = args.offset_x {
        config.offset[0] = dx;
    }
    if let Some(dy) = args.offset_y {
        config.offset[1] = dy;
    }
    if args.threshold.is_some() {
        config.threshold = args.threshold;
    }
    if args.max_workers.is_some() {
        config.max_workers = args.max_workers;
    }

    Ok(config)
}

fn extract(
    input: &Path,
    config: &ExtractionConfig,
    output: Option<&Path>,
    geojson: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    let raster = prepare_raster(image::open(input)?, config)?;
    let finder = config.finder();
    info!("{}", finder.info());
    debug!("{}: {}", config.retrieval, config.retrieval.description());

    let (contours, elapsed) = timed_find(&finder, &raster)?;
    let report = ExtractionReport::new(&raster, &contours, elapsed);
    info!(
        "Found {} contours ({} points, {} top-level, max depth {}) in {:.2} ms",
        report.contour_count, report.point_count, report.root_count, report.max_depth, report.elapsed_ms
    );

    if contours.is_empty() {
        warn!("No foreground found in {:?}", input);
    }

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&contours)?)?;
        info!("Contours saved to {:?}", path);
    }
    if let Some(path) = geojson {
        contours.save_geojson(path)?;
        info!("GeoJSON saved to {:?}", path);
    }
    if let Some(path) = report_path {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!("Report saved to {:?}", path);
    }

    Ok(())
}

fn compare(input: &Path, config: &ExtractionConfig) -> Result<()> {
    let raster = prepare_raster(image::open(input)?, config)?;
    info!(
        "Comparing distributions on {}x{} raster ({} mode)",
        raster.width(),
        raster.height(),
        config.retrieval
    );

    for (distribution, elapsed) in compare_distributions(config, &raster)? {
        info!("{:>14}: {:.2} ms", distribution.to_string(), elapsed.as_secs_f64() * 1000.0);
    }
    info!("All distributions produced identical output");

    Ok(())
}
