//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::{AggregationRequest, MAX_PAGES};
use crate::models::{Region, RegionFilter, Role, RoleFilter};
use clap::Parser;
use std::path::PathBuf;

/// SkillScope - skill demand analytics for UK tech job postings
///
/// Fetches job listings from a job search API, counts which technical
/// skills and education levels they ask for, and breaks them down by
/// UK nation. Markdown/JSON reports.
///
/// Examples:
///   skillscope
///   skillscope --pages 3 --role data-scientist --region scotland
///   skillscope --role all --format json --output skills.json
///   skillscope --role all --pages 2 --dry-run
///   skillscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Pages to fetch per role
    #[arg(
        short,
        long,
        default_value = "1",
        value_name = "COUNT",
        value_parser = clap::value_parser!(u32).range(1..=MAX_PAGES as i64)
    )]
    pub pages: u32,

    /// Job role to search for, or "all" for every role
    #[arg(long, default_value = "software-engineer", value_name = "ROLE")]
    pub role: RoleArg,

    /// UK nation to search in, or "all" for the whole UK
    #[arg(long, default_value = "all", value_name = "REGION")]
    pub region: RegionArg,

    /// Number of skills in the ranking
    #[arg(short, long, value_name = "N")]
    pub top: Option<usize>,

    /// Output file path for the report
    ///
    /// Default: from config or skill_report.md
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .skillscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Job search API endpoint URL
    #[arg(long, value_name = "URL", env = "SKILLSCOPE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API access key
    #[arg(long, value_name = "KEY", env = "RAPIDAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API host identifier
    #[arg(long, value_name = "HOST", env = "RAPIDAPI_HOST")]
    pub api_host: Option<String>,

    /// Per-request timeout in seconds
    ///
    /// A page that times out is skipped. Default: from config or 30s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of page requests in flight at once
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Count locations matching no region as England
    ///
    /// By default they are reported in a separate "unclassified" bucket.
    #[arg(long)]
    pub assume_england: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: print the queries that would be sent and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .skillscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format, including chart series
    Json,
}

/// Role filter accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RoleArg {
    All,
    SoftwareEngineer,
    DataScientist,
    DataEngineer,
    DevopsEngineer,
    FrontendDeveloper,
    BackendDeveloper,
}

impl From<RoleArg> for RoleFilter {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::All => RoleFilter::All,
            RoleArg::SoftwareEngineer => RoleFilter::Only(Role::SoftwareEngineer),
            RoleArg::DataScientist => RoleFilter::Only(Role::DataScientist),
            RoleArg::DataEngineer => RoleFilter::Only(Role::DataEngineer),
            RoleArg::DevopsEngineer => RoleFilter::Only(Role::DevopsEngineer),
            RoleArg::FrontendDeveloper => RoleFilter::Only(Role::FrontendDeveloper),
            RoleArg::BackendDeveloper => RoleFilter::Only(Role::BackendDeveloper),
        }
    }
}

/// Region filter accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RegionArg {
    All,
    England,
    Scotland,
    Wales,
    NorthernIreland,
}

impl From<RegionArg> for RegionFilter {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::All => RegionFilter::All,
            RegionArg::England => RegionFilter::Only(Region::England),
            RegionArg::Scotland => RegionFilter::Only(Region::Scotland),
            RegionArg::Wales => RegionFilter::Only(Region::Wales),
            RegionArg::NorthernIreland => RegionFilter::Only(Region::NorthernIreland),
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("Endpoint URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.top == Some(0) {
            return Err("Top must be at least 1".to_string());
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// The aggregation request described by the arguments.
    pub fn request(&self) -> AggregationRequest {
        AggregationRequest {
            pages: self.pages,
            roles: self.role.into(),
            region: self.region.into(),
        }
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args::parse_from(["skillscope"])
    }

    #[test]
    fn test_defaults() {
        let args = make_args();
        assert_eq!(args.pages, 1);
        assert_eq!(args.role, RoleArg::SoftwareEngineer);
        assert_eq!(args.region, RegionArg::All);
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_filters() {
        let args = Args::parse_from([
            "skillscope",
            "--pages",
            "3",
            "--role",
            "all",
            "--region",
            "northern-ireland",
        ]);

        let request = args.request();
        assert_eq!(request.pages, 3);
        assert_eq!(request.roles, RoleFilter::All);
        assert_eq!(request.region, RegionFilter::Only(Region::NorthernIreland));
    }

    #[test]
    fn test_pages_out_of_range() {
        assert!(Args::try_parse_from(["skillscope", "--pages", "0"]).is_err());
        assert!(Args::try_parse_from(["skillscope", "--pages", "51"]).is_err());
    }

    #[test]
    fn test_validation_invalid_endpoint() {
        let mut args = make_args();
        args.endpoint = Some("ftp://example.com".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.top = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.concurrency = Some(0);
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
}
