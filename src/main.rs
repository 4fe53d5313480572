//! SkillScope - skill demand analytics for UK tech job postings
//!
//! A CLI tool that fetches job listings from a job search API, counts
//! technical skills and education levels mentioned in them, and breaks
//! the postings down by UK nation.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, credentials, report write, etc.)
//!   2 - Fetching job listings failed; the report holds zeroed data

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod source;

use analysis::{Aggregator, AggregatorSettings};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::{AggregationOutcome, Report, ReportMetadata, SearchQuery};
use source::{JSearchClient, SearchClientConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config decides default verbosity, so load it before logging
    let (config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&args, &config) {
        eprintln!("Warning: {}", e);
    }

    info!("SkillScope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {}", config_source);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .skillscope.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize skills, blacklist, region tables, and more.");
    Ok(())
}

/// Initialize logging. `RUST_LOG` takes precedence over flags.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load configuration and merge CLI overrides. Also returns where it came from.
fn load_config(args: &Args) -> Result<(Config, String)> {
    let (mut config, source) = if let Some(ref config_path) = args.config {
        (
            Config::load(config_path)?,
            format!("loaded from {}", config_path.display()),
        )
    } else {
        match Config::load_default()? {
            Some(config) => (config, format!("loaded from {}", CONFIG_FILE)),
            None => (Config::default(), "defaults (no config file)".to_string()),
        }
    };

    config.merge_with_args(args);
    config
        .validate()
        .with_context(|| format!("Invalid configuration ({})", source))?;
    Ok((config, source))
}

/// Run the fetch and aggregation workflow. Returns exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let request = args.request();
    let queries = request.queries();

    // Handle --dry-run: list queries and exit
    if args.dry_run {
        return Ok(handle_dry_run(&queries));
    }

    let api_key = args
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .context("No API key configured. Set RAPIDAPI_KEY or pass --api-key")?;

    let client = JSearchClient::new(SearchClientConfig {
        endpoint: config.source.endpoint.clone(),
        api_key,
        api_host: config.source.api_host.clone(),
        timeout_seconds: config.source.timeout_seconds,
        results_key: config.source.results_key.clone(),
    })?;

    let settings = AggregatorSettings {
        top_n: config.analysis.top_n,
        concurrency: config.general.concurrency,
        request_timeout: Duration::from_secs(config.source.timeout_seconds),
    };

    println!("🔎 Fetching job listings...");
    println!("   Endpoint: {}", config.source.endpoint);
    println!(
        "   Roles: {} | Location: {} | Pages: {}",
        request.roles.roles().len(),
        request.region.query_text(),
        request.pages
    );
    println!("   Requests: {}", queries.len());
    println!("   Timeout: {}s per request", config.source.timeout_seconds);

    let mut aggregator = Aggregator::new(config.vocabulary(), settings);
    if !args.quiet {
        aggregator = aggregator.with_progress(progress_bar(queries.len()));
    }

    let outcome = aggregator.run(&client, &request).await;

    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        roles: request
            .roles
            .roles()
            .iter()
            .map(|r| r.query_text().to_string())
            .collect(),
        region: request.region.query_text().to_string(),
        pages: request.pages,
        requests: queries.len(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = Report::new(metadata, outcome);

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = output_path(&args, &config);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    print_summary(&report);

    match report.outcome {
        AggregationOutcome::Success { .. } => {
            println!(
                "\n✅ Analysis complete! Report saved to: {}",
                output_path.display()
            );
            Ok(0)
        }
        AggregationOutcome::Failed { ref reason, .. } => {
            warn!("Report written with zeroed data: {}", reason);
            eprintln!(
                "\n⛔ Fetching job listings failed: {}. Report saved to: {} (exit code 2).",
                reason,
                output_path.display()
            );
            Ok(2)
        }
    }
}

/// Handle --dry-run: print the queries that would be sent.
fn handle_dry_run(queries: &[SearchQuery]) -> i32 {
    println!("\n🔍 Dry run: {} request(s) would be sent:\n", queries.len());
    for query in queries {
        println!("     📄 {}", query);
    }
    println!("\n✅ Dry run complete. No requests were made.");
    0
}

/// Resolve the report path. JSON reports default to a `.json` extension.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    let path = PathBuf::from(&config.general.output);
    if args.output.is_none() && args.format == OutputFormat::Json {
        path.with_extension("json")
    } else {
        path
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Print the terminal summary.
fn print_summary(report: &Report) {
    let result = report.outcome.result();

    println!("\n📊 Skill Demand Summary:");
    println!(
        "   Jobs counted: {} (fetched {}, excluded {})",
        result.job_count, result.fetched_count, result.excluded_count
    );
    if let AggregationOutcome::Success { skipped_pages, .. } = &report.outcome {
        if *skipped_pages > 0 {
            println!("   Pages skipped (timeout): {}", skipped_pages);
        }
    }

    for (i, skill) in result.top_skills.iter().enumerate() {
        println!(
            "   {:>2}. {:<12} {:>4} jobs  {:>6.2}%",
            i + 1,
            skill.skill,
            skill.count,
            skill.percentage
        );
    }

    let education: Vec<String> = result
        .education
        .iter()
        .map(|e| format!("{} {:.2}%", e.level, e.percentage))
        .collect();
    println!("   Education: {}", education.join(" | "));

    let regions: Vec<String> = result
        .regions
        .iter()
        .map(|r| format!("{} {:.2}%", r.region.code(), r.percentage))
        .collect();
    println!(
        "   Regions: {} | Unclassified {:.2}%",
        regions.join(" | "),
        result.unclassified.percentage
    );
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);
}
