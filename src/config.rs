//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.skillscope.toml` files.

use crate::analysis::regions::{default_cities, default_fallbacks};
use crate::analysis::{RegionClassifier, RegionPattern, UnclassifiedPolicy, Vocabulary};
use crate::analysis::vocabulary::{DEFAULT_BLACKLIST, DEFAULT_SKILLS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".skillscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Search API settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Counting and ranking settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Location classification tables.
    #[serde(default)]
    pub regions: RegionsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of page requests in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_output() -> String {
    "skill_report.md".to_string()
}

fn default_concurrency() -> usize {
    4
}

/// Job search API settings. The access key is never read from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Search endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Host identifier sent with every request.
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// JSON key holding the list of job records.
    #[serde(default = "default_results_key")]
    pub results_key: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_host: default_api_host(),
            timeout_seconds: default_timeout(),
            results_key: default_results_key(),
        }
    }
}

fn default_endpoint() -> String {
    "https://jsearch.p.rapidapi.com/search".to_string()
}

fn default_api_host() -> String {
    "jsearch.p.rapidapi.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_results_key() -> String {
    "data".to_string()
}

/// Counting and ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of skills in the ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Skills to count, in tie-break order.
    #[serde(default = "default_skills")]
    pub skills: Vec<String>,

    /// Keywords that exclude a posting.
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,

    /// Handling of locations matching no region.
    #[serde(default)]
    pub unclassified: UnclassifiedPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            skills: default_skills(),
            blacklist: default_blacklist(),
            unclassified: UnclassifiedPolicy::default(),
        }
    }
}

fn default_top_n() -> usize {
    10
}

fn default_skills() -> Vec<String> {
    DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect()
}

fn default_blacklist() -> Vec<String> {
    DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect()
}

/// Location classification tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsConfig {
    /// City patterns, first match wins.
    #[serde(default = "default_cities")]
    pub cities: Vec<RegionPattern>,

    /// Broader patterns tried when no city matches.
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<RegionPattern>,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            cities: default_cities(),
            fallbacks: default_fallbacks(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.skillscope.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }

        if let Some(ref endpoint) = args.endpoint {
            self.source.endpoint = endpoint.clone();
        }
        if let Some(ref host) = args.api_host {
            self.source.api_host = host.clone();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(top) = args.top {
            self.analysis.top_n = top;
        }
        if args.assume_england {
            self.analysis.unclassified = UnclassifiedPolicy::AssumeEngland;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values after the CLI merge, with the same rules `Args::validate`
    /// applies to flags.
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.source.endpoint.trim();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            bail!(
                "source.endpoint must start with 'http://' or 'https://', got '{}'",
                self.source.endpoint
            );
        }

        if self.source.results_key.trim().is_empty() {
            bail!("source.results_key must not be blank");
        }

        if self.source.timeout_seconds == 0 {
            bail!("source.timeout_seconds must be at least 1");
        }

        if self.analysis.top_n == 0 {
            bail!("analysis.top_n must be at least 1");
        }

        if self.general.concurrency == 0 {
            bail!("general.concurrency must be at least 1");
        }

        if self.general.output.trim().is_empty() {
            bail!("general.output must not be blank");
        }

        Ok(())
    }

    /// Build the immutable lookup tables for the aggregator.
    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::new(
            self.analysis.skills.clone(),
            self.analysis.blacklist.clone(),
            RegionClassifier::new(
                self.regions.cities.clone(),
                self.regions.fallbacks.clone(),
                self.analysis.unclassified,
            ),
        )
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
