use anyhow::Result;
use colored::*;
use quality_core::{Suite, ValidationResult};
use serde_json::json;

use crate::OutputFormat;

pub fn print_suite_summary(suite: &Suite) {
    let common = suite.common_fields();

    println!("\nSuite Summary:");
    println!("  Name:        {}", suite.name());
    println!(
        "  Asset Type:  {}",
        common.data_asset_type.as_deref().unwrap_or("N/A")
    );
    println!("  Rules:       {}", suite.len());

    for (i, rule) in suite.rules().iter().enumerate() {
        println!("    {}. {}", i + 1, rule);
    }

    if !common.meta.is_empty() {
        println!("\nMeta:");
        for (key, value) in &common.meta {
            println!("  {key}: {value}");
        }
    }
}

pub fn print_validation_result(
    result: &ValidationResult,
    location: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json_result(result, location),
        OutputFormat::Text => {
            print_text_result(result, location);
            Ok(())
        }
    }
}

fn print_text_result(result: &ValidationResult, location: Option<&str>) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));
    println!("  Suite: {}", result.suite_name);
    println!("  Run:   {}", result.run_identifier.run_name);

    if result.success {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    let failures: Vec<_> = result.failures().collect();
    if !failures.is_empty() {
        println!("\n{}", "Failed expectations:".red().bold());
        for (i, outcome) in failures.iter().enumerate() {
            let message = outcome.message.as_deref().unwrap_or("no detail");
            println!(
                "  {}. {} {}",
                i + 1,
                outcome.expectation_config.kind().to_string().red(),
                message
            );
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  {}", result.summary());
    println!("  Result: {}", location.unwrap_or("<not persisted>"));
    println!("{}", "═".repeat(60));
}

fn print_json_result(result: &ValidationResult, location: Option<&str>) -> Result<()> {
    let output = json!({
        "result": result,
        "result_location": location,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
