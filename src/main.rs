//! EV Slides - Washington State electric vehicle adoption slideshow
//!
//! Fetches the public EV registration and county population datasets,
//! aggregates them and renders three slides: registrations per model
//! year, registrations stacked by vehicle type, and a county map of BEV
//! share of population.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, fetch or parse failure, write failure)

mod analysis;
mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod render;
mod report;
mod slides;

use analysis::RowLayout;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat, Step};
use config::{Config, CONFIG_FILE_NAME};
use fetch::DataFetcher;
use indicatif::{ProgressBar, ProgressStyle};
use models::{EvType, ReportMetadata};
use render::{county_shapes, Canvas};
use slides::{RenderedSlide, SlideDeck, SLIDE_COUNT};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Index of the county map slide.
const MAP_SLIDE: usize = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("evslides v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .evslides.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize dataset URLs, column layout, canvas and output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over the verbosity flags when set.
fn init_logging(args: &Args) {
    let level = args.log_level().to_string().to_lowercase();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, aggregate and write the slides or report. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let format = OutputFormat::from_name(&config.output.format).unwrap_or_else(|| {
        warn!(
            "Unknown output format '{}', using svg",
            config.output.format
        );
        OutputFormat::Svg
    });
    let output_dir = PathBuf::from(&config.output.directory);
    let canvas = Canvas::new(config.canvas.width, config.canvas.height);
    let layout = RowLayout::from(&config.layout);

    let fetcher = DataFetcher::new(config.sources.clone())?;
    let mut deck = SlideDeck::new(canvas);

    if !args.quiet {
        println!("📥 Fetching datasets...");
        println!("   Population: {}", config.sources.population_url);
        println!("   Registrations: {}", config.sources.registrations_url);
    }

    let spinner = create_spinner(args.quiet, "Loading registrations and population...");
    let loaded = fetcher.load_datasets().await.and_then(|raw| {
        analysis::aggregate(&raw.population, &raw.registrations, &layout)
            .map(|datasets| (raw, datasets))
    });
    spinner.finish_and_clear();

    let (raw, datasets) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load datasets: {}", e);
            eprintln!("\n❌ Failed to load datasets: {}", e);
            if format == OutputFormat::Svg {
                // Slides keep their placeholder content.
                let written = write_slides(&output_dir, &deck.render_all())?;
                info!("Wrote {} placeholder slides", written.len());
            }
            return Ok(1);
        }
    };

    deck.load(&datasets);
    info!(
        "Loaded {} model years across {} counties",
        datasets.yearly.len(),
        datasets.bev_percentage_by_county.len()
    );

    match format {
        OutputFormat::Svg => {
            apply_view_state(&mut deck, &args);

            let target = target_slide(&args);
            if !args.single_slide() || target == MAP_SLIDE {
                load_boundaries(&fetcher, &mut deck, &config.sources.state_fips, args.quiet)
                    .await;
            }

            let rendered = if args.single_slide() {
                vec![navigate(&mut deck, &args)]
            } else {
                deck.render_all()
            };

            let written = write_slides(&output_dir, &rendered)?;
            if !args.quiet {
                println!("\n✅ Wrote {} slide(s):", written.len());
                for path in &written {
                    println!("   📄 {}", path.display());
                }
            }
        }
        OutputFormat::Markdown | OutputFormat::Json => {
            let metadata = ReportMetadata {
                generated_at: Utc::now(),
                population_url: config.sources.population_url.clone(),
                registrations_url: config.sources.registrations_url.clone(),
                population_records: raw.population.len(),
                registration_rows: raw.registrations.data.len(),
                duration_seconds: start_time.elapsed().as_secs_f64(),
            };
            let report = report::build_report(&datasets, metadata);

            let (content, file_name) = match format {
                OutputFormat::Json => (report::generate_json_report(&report)?, "ev_report.json"),
                _ => (report::generate_markdown_report(&report), "ev_report.md"),
            };

            std::fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
            let path = output_dir.join(file_name);
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;

            if !args.quiet {
                println!("\n✅ Report saved to: {}", path.display());
            }
        }
    }

    if !args.quiet {
        println!("\n📊 Summary:");
        println!(
            "   Registrations (PHEV + BEV): {}",
            datasets.recognized_registrations()
        );
        if let Some(peak) = analysis::peak_year(&datasets.yearly) {
            println!("   Peak model year: {} ({})", peak.year, peak.total());
        }
        println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    }

    Ok(0)
}

/// Apply the brush and layer toggles given on the command line.
fn apply_view_state(deck: &mut SlideDeck, args: &Args) {
    deck.brush(args.brush_selection());
    if args.reset_brush {
        deck.reset_brush();
    }

    let visibility = &mut deck.view_mut().visibility;
    if args.hide_phev {
        visibility.toggle(EvType::Phev);
    }
    if args.hide_bev {
        visibility.toggle(EvType::Bev);
    }
}

/// Slide the navigation steps end on.
fn target_slide(args: &Args) -> usize {
    args.navigate
        .iter()
        .fold(args.slide.unwrap_or(0), |index, step| match step {
            Step::Next => (index + 1) % SLIDE_COUNT,
            Step::Prev => (index + SLIDE_COUNT - 1) % SLIDE_COUNT,
        })
}

/// Go to the start slide and walk the navigation steps.
fn navigate(deck: &mut SlideDeck, args: &Args) -> RenderedSlide {
    let mut current = deck.go_to(args.slide.unwrap_or(0));
    for step in &args.navigate {
        current = match step {
            Step::Next => deck.next(),
            Step::Prev => deck.prev(),
        };
        debug!("Navigated {:?} to slide {}", step, current.index);
    }
    current
}

/// Fetch county outlines for the map. Failure leaves the map without shapes.
async fn load_boundaries(
    fetcher: &DataFetcher,
    deck: &mut SlideDeck,
    state_fips: &str,
    quiet: bool,
) {
    let spinner = create_spinner(quiet, "Loading county boundaries...");
    let result = fetcher.fetch_boundaries().await;
    spinner.finish_and_clear();

    match result {
        Ok(collection) => deck.set_boundaries(county_shapes(&collection, state_fips)),
        Err(e) => warn!("County boundaries unavailable, map drawn without shapes: {}", e),
    }
}

/// Write each slide as `slide-<index>.svg`.
fn write_slides(output_dir: &Path, slides: &[RenderedSlide]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    slides
        .iter()
        .map(|slide| {
            let path = output_dir.join(format!("slide-{}.svg", slide.index));
            std::fs::write(&path, slide.to_svg())
                .with_context(|| format!("Failed to write slide to {}", path.display()))?;
            debug!("Wrote {}", path.display());
            Ok(path)
        })
        .collect()
}

fn create_spinner(quiet: bool, message: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
