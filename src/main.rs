//! `eot-compare`: compare end-of-turn detectors on multilingual fixtures.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`HarnessConfig`] (explicit `--config` path or the platform
//!    default; a missing file yields defaults).
//! 3. Apply command-line overrides.
//! 4. Build predictor handles and register them with the engine.
//! 5. Run, render, and print or write the report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use eot_compare::config::{AppPaths, HarnessConfig, ReportFormat};
use eot_compare::eval::{samples_from_config, EvaluationEngine};
use eot_compare::predictor::build_handles;
use eot_compare::report::{self, ComparisonReport};

/// Compare end-of-turn detection models across languages.
///
/// Examples:
///   eot-compare                              # defaults, text table
///   eot-compare --language vi --format json  # Vietnamese only, JSON
///   eot-compare --write-default-config       # create harness.toml
#[derive(Parser, Debug)]
#[command(name = "eot-compare", version, about)]
struct Cli {
    /// Configuration file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Report format (overrides the config file)
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,

    /// Only evaluate these language tags (repeatable)
    #[arg(long = "language", value_name = "TAG")]
    languages: Vec<String>,

    /// Per-call timeout in milliseconds (0 disables)
    #[arg(long, value_name = "N")]
    timeout_ms: Option<u64>,

    /// Number of measurements in flight at once
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Write the report to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Also save the report under the platform reports directory
    #[arg(long)]
    save: bool,

    /// Omit the per-predictor summary
    #[arg(long)]
    no_summary: bool,

    /// Write the default configuration and exit
    #[arg(long)]
    write_default_config: bool,
}

fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => HarnessConfig::load().context("failed to load harness.toml")?,
    };

    if let Some(format) = cli.format {
        config.report.format = format;
    }
    if let Some(ms) = cli.timeout_ms {
        config.engine.timeout_ms = ms;
    }
    if let Some(n) = cli.concurrency {
        config.engine.concurrency = n.max(1);
    }
    if cli.no_summary {
        config.report.show_summary = false;
    }
    Ok(config)
}

fn write_report(path: &std::path::Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("report written to {}", path.display());
    Ok(())
}

fn saved_report_path(format: ReportFormat) -> PathBuf {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let ext = match format {
        ReportFormat::Text => "txt",
        ReportFormat::Json => "json",
    };
    AppPaths::new().reports_dir.join(format!("eot-report-{stamp}.{ext}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.write_default_config {
        let path = match &cli.config {
            Some(path) => {
                HarnessConfig::default().save_to(path)?;
                path.clone()
            }
            None => {
                HarnessConfig::default().save()?;
                AppPaths::new().settings_file
            }
        };
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // 2–3. Configuration
    let config = load_config(&cli)?;

    // 4. Predictors
    let mut engine = EvaluationEngine::new(config.engine.clone());
    for handle in build_handles(&config.predictors)? {
        engine.register(handle);
    }
    if !cli.languages.is_empty() {
        engine.restrict_to_languages(cli.languages.iter().cloned());
    }

    // 5. Run
    let samples = samples_from_config(&config.languages);
    let run = engine.run(&samples).await?;
    let errors = run.results().iter().filter(|r| r.error().is_some()).count();
    if errors > 0 {
        log::warn!("{errors} of {} measurement(s) failed", run.len());
    }

    let report = ComparisonReport::from_run(&run);
    let rendered = report::render(&report, config.report.format, config.report.show_summary)?;

    match &cli.output {
        Some(path) => write_report(path, &rendered)?,
        None => print!("{rendered}"),
    }
    if cli.save {
        write_report(&saved_report_path(config.report.format), &rendered)?;
    }
    Ok(())
}
