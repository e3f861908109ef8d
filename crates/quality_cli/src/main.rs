mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use quality_core::Environment;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dq")]
#[command(version, about = "Data quality suite CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EnvironmentArg {
    Develop,
    Staging,
    Production,
}

impl From<EnvironmentArg> for Environment {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Develop => Environment::Develop,
            EnvironmentArg::Staging => Environment::Staging,
            EnvironmentArg::Production => Environment::Production,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where settings come from.
#[derive(clap::Args)]
struct StorageArgs {
    /// Settings file (TOML or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of the local object store, overrides the settings file
    #[arg(long)]
    root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a suite from its definition and publish it
    Publish {
        /// Path to the suite definition (YAML, TOML or JSON)
        definition: PathBuf,

        /// Target environment
        #[arg(short, long, value_enum)]
        environment: EnvironmentArg,

        #[command(flatten)]
        storage: StorageArgs,

        /// Build and print the suite document without persisting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check a suite definition without touching storage
    Check {
        /// Path to the suite definition (YAML, TOML or JSON)
        definition: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Load a batch, validate it against a published suite and write it on pass
    Run {
        /// Target environment
        #[arg(short, long, value_enum)]
        environment: EnvironmentArg,

        /// Name of the published suite
        #[arg(short, long)]
        suite: String,

        /// Table name of the validated asset
        #[arg(long)]
        table: String,

        /// Partition date of the validated asset
        #[arg(long)]
        dt: String,

        /// Batch to validate (JSON)
        #[arg(long)]
        source: PathBuf,

        /// Where the batch is written when validation passes
        #[arg(long)]
        destination: PathBuf,

        /// Columns to keep, in order (comma separated)
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,

        /// Column renames applied after selection (old=new, repeatable)
        #[arg(long)]
        rename: Vec<String>,

        #[command(flatten)]
        storage: StorageArgs,

        /// Output format of the validation report
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing, RUST_LOG takes precedence over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Publish {
            definition,
            environment,
            storage,
            dry_run,
        } => commands::publish::execute(
            &definition,
            environment.into(),
            storage.config.as_deref(),
            storage.root.as_deref(),
            dry_run,
        ),

        Commands::Check { definition, format } => commands::check::execute(&definition, format),

        Commands::Run {
            environment,
            suite,
            table,
            dt,
            source,
            destination,
            select,
            rename,
            storage,
            format,
        } => commands::run::execute(commands::run::RunArgs {
            environment: environment.into(),
            suite,
            table,
            dt,
            source,
            destination,
            select,
            rename,
            config: storage.config,
            root: storage.root,
            format,
        }),
    }
}
