use anyhow::{Context, Result};
use quality_core::{Environment, SuiteStore};
use quality_parser::load_suite;
use std::path::Path;
use tracing::info;

use crate::commands::{load_settings, open_store};
use crate::output;

pub fn execute(
    definition: &Path,
    environment: Environment,
    config: Option<&Path>,
    root: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    info!("Publishing suite definition: {}", definition.display());

    // Build first so nothing is written for an invalid definition
    let suite = load_suite(definition).with_context(|| {
        format!("Failed to build suite from definition: {}", definition.display())
    })?;

    if dry_run {
        output::print_info("Dry run: suite document not persisted");
        println!("{}", suite.to_json()?);
        return Ok(());
    }

    let settings = load_settings(config, root)?;
    let environment = settings.resolve_environment(environment);
    let store = open_store(&settings);

    store
        .persist(environment, &suite)
        .with_context(|| format!("Failed to publish suite '{}'", suite.name()))?;

    output::print_success(&format!(
        "Published suite '{}' ({} rules) to {}",
        suite.name(),
        suite.len(),
        store.suite_uri(environment, suite.name())
    ));
    Ok(())
}
