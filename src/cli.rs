//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// EV Slides - Washington State electric vehicle adoption slideshow
///
/// Fetches the public EV registration and county population datasets,
/// aggregates them and renders the three slides as SVG charts, or writes
/// the aggregated data as a Markdown/JSON report.
///
/// Examples:
///   evslides
///   evslides --slide 1 --hide-phev
///   evslides --slide 0 --brush 120,480
///   evslides --navigate next,next,prev
///   evslides --format markdown --output-dir reports
///   evslides --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .evslides.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the slides or report are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format (svg, markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Slide to start on (0 = bar chart, 1 = stacked, 2 = map)
    ///
    /// Without --slide or --navigate every slide is rendered.
    #[arg(short, long, value_name = "INDEX")]
    pub slide: Option<usize>,

    /// Navigation steps applied after the start slide (comma-separated)
    ///
    /// Example: --navigate next,next,prev
    #[arg(long, value_name = "STEPS", value_delimiter = ',')]
    pub navigate: Vec<Step>,

    /// Brush selection on the bar chart, in plot pixels (comma-separated)
    ///
    /// Example: --brush 120,480
    #[arg(long, value_name = "X0,X1", value_delimiter = ',')]
    pub brush: Option<Vec<f64>>,

    /// Press the bar chart's "Reset Filter" control after brushing
    #[arg(long)]
    pub reset_brush: bool,

    /// Hide the PHEV layer of the stacked chart
    #[arg(long)]
    pub hide_phev: bool,

    /// Hide the BEV layer of the stacked chart
    #[arg(long)]
    pub hide_bev: bool,

    /// Population dataset URL
    #[arg(long, value_name = "URL", env = "EVSLIDES_POPULATION_URL")]
    pub population_url: Option<String>,

    /// Registration dataset URL
    #[arg(long, value_name = "URL", env = "EVSLIDES_REGISTRATIONS_URL")]
    pub registrations_url: Option<String>,

    /// County boundary GeoJSON URL
    #[arg(long, value_name = "URL", env = "EVSLIDES_BOUNDARIES_URL")]
    pub boundaries_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .evslides.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One SVG document per slide (default)
    #[default]
    Svg,
    /// Markdown data report
    Markdown,
    /// JSON data report
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }

    /// Parse the format name used in the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// A slide navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    Next,
    Prev,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(slide) = self.slide {
            if slide >= crate::slides::SLIDE_COUNT {
                return Err(format!(
                    "Slide index must be between 0 and {}",
                    crate::slides::SLIDE_COUNT - 1
                ));
            }
        }

        for url in [
            &self.population_url,
            &self.registrations_url,
            &self.boundaries_url,
        ]
        .into_iter()
        .flatten()
        {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("URL must start with 'http://' or 'https://': {}", url));
            }
        }

        if let Some(ref brush) = self.brush {
            if brush.len() != 2 {
                return Err("Brush needs exactly two pixel positions".to_string());
            }
            if brush.iter().any(|px| !px.is_finite() || *px < 0.0) {
                return Err("Brush positions must be non-negative numbers".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Brush selection as an ordered pixel pair.
    pub fn brush_selection(&self) -> Option<(f64, f64)> {
        match self.brush.as_deref() {
            Some([a, b]) => Some((a.min(*b), a.max(*b))),
            _ => None,
        }
    }

    /// Whether a single navigated slide is requested rather than the whole deck.
    pub fn single_slide(&self) -> bool {
        self.slide.is_some() || !self.navigate.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            output_dir: None,
            format: None,
            slide: None,
            navigate: Vec::new(),
            brush: None,
            reset_brush: false,
            hide_phev: false,
            hide_bev: false,
            population_url: None,
            registrations_url: None,
            boundaries_url: None,
            timeout: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_defaults_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_slide_out_of_range() {
        let mut args = make_args();
        args.slide = Some(3);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.registrations_url = Some("ftp://example.org/rows.json".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_brush_selection_is_ordered() {
        let mut args = make_args();
        args.brush = Some(vec![400.0, 100.0]);
        assert_eq!(args.brush_selection(), Some((100.0, 400.0)));
    }

    #[test]
    fn test_parse_navigation_steps() {
        let args = Args::try_parse_from(["evslides", "--navigate", "next,prev,next"]).unwrap();
        assert_eq!(args.navigate, vec![Step::Next, Step::Prev, Step::Next]);
        assert!(args.single_slide());
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(OutputFormat::from_name("markdown"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_name("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("pdf"), None);
    }
}
