use anyhow::{Context, Result, anyhow};
use quality_core::{DataAssetName, Environment, Notifier, RunnerServices, ValidationRunner};
use quality_store::{LogNotifier, WebhookNotifier};
use quality_validator::{DataSet, DataSetEvaluator};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::OutputFormat;
use crate::commands::{load_settings, open_store};
use crate::output;

pub struct RunArgs {
    pub environment: Environment,
    pub suite: String,
    pub table: String,
    pub dt: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub select: Vec<String>,
    pub rename: Vec<String>,
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub format: OutputFormat,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref(), args.root.as_deref())?;
    let environment = settings.resolve_environment(args.environment);
    let asset = DataAssetName::checked(&args.table, &args.dt).context("Invalid asset name")?;
    info!("Running suite '{}' for {}", args.suite, asset);

    // Load
    let content = std::fs::read_to_string(&args.source)
        .with_context(|| format!("Failed to read batch: {}", args.source.display()))?;
    let loaded = DataSet::from_json(&content)
        .with_context(|| format!("Failed to parse batch: {}", args.source.display()))?;

    // Transform
    let batch = transform(loaded, &args.select, &args.rename)?;
    info!(rows = batch.len(), columns = batch.columns().len(), "Batch prepared");

    // Validate
    let store = open_store(&settings);
    let evaluator = DataSetEvaluator::new();
    let notifier = notifier(settings.webhook_url())?;
    let services = RunnerServices {
        evaluator: &evaluator,
        suites: &store,
        results: &store,
        notifier: notifier.as_ref(),
    };

    let mut runner = ValidationRunner::new(environment, asset, &batch, &args.suite, services);
    let passed = match runner.run() {
        Ok(passed) => passed,
        Err(e) => {
            if e.is_retryable() {
                warn!("Run '{}' failed on an external system and may be retried", runner.run_name());
            }
            return Err(anyhow::Error::new(e)
                .context(format!("Validation run '{}' did not complete", runner.run_name())));
        }
    };

    output::print_validation_result(runner.result()?, runner.result_location(), args.format)?;

    if !passed {
        warn!("Validation failed, skipping write to {}", args.destination.display());
        std::process::exit(1);
    }

    // Write, only after a pass verdict
    write_batch(&batch, &args.destination)?;
    output::print_success(&format!(
        "Wrote {} rows to {}",
        batch.len(),
        args.destination.display()
    ));
    Ok(())
}

fn transform(batch: DataSet, select: &[String], rename: &[String]) -> Result<DataSet> {
    let mut batch = if select.is_empty() {
        batch
    } else {
        batch.select(select).context("Failed to select columns")?
    };

    for pair in rename {
        let (from, to) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid rename '{pair}', expected old=new"))?;
        batch = batch
            .rename(from.trim(), to.trim())
            .with_context(|| format!("Failed to rename column '{from}'"))?;
    }

    Ok(batch)
}

fn notifier(webhook_url: Option<String>) -> Result<Box<dyn Notifier>> {
    match webhook_url {
        Some(url) => Ok(Box::new(
            WebhookNotifier::new(url).context("Failed to set up alert webhook")?,
        )),
        None => Ok(Box::new(LogNotifier)),
    }
}

fn write_batch(batch: &DataSet, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(destination, batch.to_json()?)
        .with_context(|| format!("Failed to write batch: {}", destination.display()))
}
