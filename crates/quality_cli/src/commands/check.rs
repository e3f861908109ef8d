use anyhow::{Context, Result};
use quality_parser::load_suite;
use std::path::Path;
use tracing::info;

use crate::OutputFormat;
use crate::output;

pub fn execute(definition: &Path, format: OutputFormat) -> Result<()> {
    info!("Checking suite definition: {}", definition.display());

    let suite = load_suite(definition).with_context(|| {
        format!("Failed to build suite from definition: {}", definition.display())
    })?;

    match format {
        OutputFormat::Json => println!("{}", suite.to_json()?),
        OutputFormat::Text => {
            output::print_success("Suite definition is valid");
            output::print_suite_summary(&suite);
        }
    }

    Ok(())
}
