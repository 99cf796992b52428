//! DMR++ validation CLI.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use dmrpp_validate::{check_files, inspect_file, ManifestReport, OutputFormat, ValidateConfig};

#[derive(Parser)]
#[command(name = "dmrpp-validate")]
#[command(about = "Inspect and validate OPeNDAP DMR++ documents", long_about = None)]
struct Cli {
    /// Data file path recorded in chunk manifests (defaults to the document's name)
    #[arg(long, global = true, env = "DMRPP_DATA_PATH")]
    data_path: Option<String>,

    /// Group to open, e.g. /gt1r/heights (defaults to the first group)
    #[arg(short, long, global = true, env = "DMRPP_GROUP")]
    group: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn", env = "DMRPP_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize one document: groups, dimensions and variables
    Summary {
        /// Path to the .dmrpp file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Print the array metadata and chunk manifest of one variable as JSON
    Manifest {
        /// Path to the .dmrpp file
        file: PathBuf,

        /// Variable name (after origname aliasing)
        #[arg(short, long)]
        variable: String,
    },

    /// Parse many documents in parallel and report failures
    Check {
        /// Paths to .dmrpp files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long, env = "DMRPP_THREADS")]
        threads: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

impl Cli {
    fn config(&self) -> ValidateConfig {
        let mut config = ValidateConfig {
            data_path: self.data_path.clone(),
            group: self.group.clone(),
            log_level: self.log_level.clone(),
            json_logs: self.json_logs,
            ..Default::default()
        };
        match &self.command {
            Commands::Summary { output, .. } => config.output = *output,
            Commands::Check {
                threads, output, ..
            } => {
                if let Some(t) = threads {
                    config.threads = *t;
                }
                config.output = *output;
            }
            Commands::Manifest { .. } => config.output = OutputFormat::Json,
        }
        config
    }
}

fn init_logging(config: &ValidateConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config();
    if let Err(e) = config.validate() {
        bail!("invalid configuration: {}", e);
    }
    init_logging(&config);

    match cli.command {
        Commands::Summary { file, .. } => {
            let summary = inspect_file(&file, &config)?;
            match config.output {
                OutputFormat::Json => println!("{}", summary.format_json()?),
                OutputFormat::Table => println!("{}", summary.format_table()),
            }
            Ok(())
        }
        Commands::Manifest { file, variable } => {
            let summary = inspect_file(&file, &config)?;
            let report = ManifestReport::from_summary(&summary, &variable)?;
            println!("{}", report.format_json()?);
            Ok(())
        }
        Commands::Check { files, .. } => {
            info!(files = files.len(), threads = config.threads, "Checking DMR++ documents");
            let report = check_files(&files, &config)?;
            match config.output {
                OutputFormat::Json => println!("{}", report.format_json()?),
                OutputFormat::Table => println!("{}", report.format_table()),
            }
            if !report.all_passed() {
                bail!("{} of {} documents failed", report.failed(), report.files.len());
            }
            Ok(())
        }
    }
}
