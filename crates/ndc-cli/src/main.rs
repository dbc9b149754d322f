//! ndc-sdk - scaffold NDC connectors and generate their glue code

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ndc_codegen::{generate, new_project, GenerateOptions, NewProject};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "ndc-sdk")]
#[command(about = "Scaffold NDC connectors and generate their schema and dispatch code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a connector crate, e.g. `ndc-sdk new -n example -m example-connector`
    New {
        /// Name of the connector
        #[arg(short, long)]
        name: String,

        /// Cargo package name of the connector
        #[arg(short, long)]
        module: String,

        /// Where the crate is written. Defaults to `./<name>`
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = LogLevel::Info)]
        log_level: LogLevel,
    },

    /// Generate the schema and connector implementation from signature manifests
    Generate {
        /// Base path of the connector crate
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Package directories containing `signatures.json`
        #[arg(short, long, default_values_t = vec!["src/functions".to_string()])]
        directories: Vec<String>,

        /// Leave the generated sources as rendered instead of running rustfmt
        #[arg(long)]
        no_format: bool,

        #[arg(long, value_enum, default_value_t = LogLevel::Info)]
        log_level: LogLevel,
    },

    /// Print the CLI version
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::New {
            name,
            module,
            output,
            log_level,
        } => {
            setup_logging(log_level)?;
            info!(%name, %module, ?output, "Generating the NDC boilerplate");
            let root = new_project(&NewProject {
                name,
                module,
                output,
                format: true,
            })
            .context("Failed to generate new project")?;
            info!(exec_time = ?start.elapsed(), "Generated {}", root.display());
        }
        Commands::Generate {
            path,
            directories,
            no_format,
            log_level,
        } => {
            setup_logging(log_level)?;
            info!(path = %path.display(), ?directories, "Generating connector schema");
            let options = GenerateOptions {
                path,
                directories,
                format: !no_format,
            };
            generate(&options).context("Failed to generate connector schema")?;
            info!(exec_time = ?start.elapsed(), "Generated successfully");
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn setup_logging(level: LogLevel) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(level))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
