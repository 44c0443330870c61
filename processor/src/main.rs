//! sampleproc CLI - trim headers, dedupe sample columns, derive Time
//!
//! # Commands
//!
//! ```bash
//! sampleproc process run1.xlsx run2.csv   # Process a queue, quick-save next to inputs
//! sampleproc process run.csv -o out.csv   # Process one file to an explicit path
//! sampleproc preview run.csv -n 10        # Show the processed first rows
//! sampleproc inspect run.csv              # Show format, columns and sample columns
//! sampleproc recent list                  # Recently processed files
//! sampleproc serve                        # Start HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use sampleproc::{
    config::Config,
    inspect_file,
    preview::{render_batch, render_inspection, render_preview, render_report, render_recent},
    process_queue, process_table, FileFormat, LoadOptions, ProcessOptions, RecentFiles,
};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sampleproc")]
#[command(about = "Trim headers, keep one sample column and derive a Time axis", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process files and save them as <stem>_processed.<ext>
    Process {
        /// Input files (.csv or .xlsx), processed in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Explicit output path (single input only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format for quick save
        #[arg(short, long, default_value = "xlsx", value_parser = parse_format)]
        format: FileFormat,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long, value_parser = parse_delimiter)]
        delimiter: Option<u8>,

        /// Do not record inputs in the recent-files list
        #[arg(long)]
        no_recent: bool,
    },

    /// Transform a file and print the first rows, without saving
    Preview {
        /// Input file
        input: PathBuf,

        /// Number of rows to show (default from config)
        #[arg(short = 'n', long)]
        rows: Option<usize>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long, value_parser = parse_delimiter)]
        delimiter: Option<u8>,
    },

    /// Show how a file is read, without transforming it
    Inspect {
        /// Input file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long, value_parser = parse_delimiter)]
        delimiter: Option<u8>,
    },

    /// Manage the recent-files list
    Recent {
        #[command(subcommand)]
        action: RecentAction,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum RecentAction {
    /// List recent files, newest first
    List,

    /// Forget all recent files
    Clear,

    /// Process the recent file at INDEX again
    Open {
        /// Position in `recent list`
        index: usize,

        /// Output format for quick save
        #[arg(short, long, default_value = "xlsx", value_parser = parse_format)]
        format: FileFormat,
    },

    /// Remove the entry at INDEX
    Remove {
        /// Position in `recent list`
        index: usize,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_env();
    debug!(?config, "configuration");

    let result = match cli.command {
        Commands::Process {
            inputs,
            output,
            format,
            delimiter,
            no_recent,
        } => {
            let options = ProcessOptions {
                load: LoadOptions { delimiter },
                output_format: format,
                output_path: output,
            };
            cmd_process(&config, inputs, options, !no_recent).await
        }

        Commands::Preview {
            input,
            rows,
            delimiter,
        } => cmd_preview(&input, rows.unwrap_or(config.preview_rows), delimiter),

        Commands::Inspect { input, delimiter } => cmd_inspect(&input, delimiter),

        Commands::Recent { action } => cmd_recent(&config, action).await,

        Commands::Serve { port } => cmd_serve(&config, port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_process(config: &Config, inputs: Vec<PathBuf>, options: ProcessOptions, record: bool) -> CliResult {
    let report = process_queue(inputs, options).await?;

    if record && report.succeeded().next().is_some() {
        let mut recent = RecentFiles::load(&config.recent_file, config.max_recent);
        for done in report.succeeded() {
            if let Err(e) = recent.add(&done.input) {
                warn!("could not record {}: {}", done.input.display(), e);
            }
        }
    }

    println!("{}", render_batch(&report));

    if !report.is_success() {
        return Err(format!("{} of {} file(s) failed", report.failure_count(), report.total()).into());
    }
    Ok(())
}

fn cmd_preview(input: &std::path::Path, rows: usize, delimiter: Option<u8>) -> CliResult {
    let processed = process_table(input, &LoadOptions { delimiter })?;

    println!("{}", render_preview(&processed.table, rows));
    println!("{}", render_report(&processed.report, processed.table.row_count()));
    Ok(())
}

fn cmd_inspect(input: &std::path::Path, delimiter: Option<u8>) -> CliResult {
    let inspection = inspect_file(input, &LoadOptions { delimiter })?;
    println!("{}", render_inspection(&inspection));
    Ok(())
}

async fn cmd_recent(config: &Config, action: RecentAction) -> CliResult {
    let mut recent = RecentFiles::load(&config.recent_file, config.max_recent);

    match action {
        RecentAction::List => {
            println!("{}", render_recent(recent.list()));
        }

        RecentAction::Clear => {
            recent.clear()?;
            eprintln!("Recent files cleared");
        }

        RecentAction::Open { index, format } => {
            let input = recent.get(index)?;
            let options = ProcessOptions {
                output_format: format,
                ..ProcessOptions::default()
            };
            return cmd_process(config, vec![input], options, true).await;
        }

        RecentAction::Remove { index } => {
            let removed = recent.remove(index)?;
            eprintln!("Removed {}", removed.display());
        }
    }

    Ok(())
}

async fn cmd_serve(config: &Config, port: Option<u16>) -> CliResult {
    sampleproc::server::start_server_with(sampleproc::server::ServerOptions {
        port: port.unwrap_or(config.port),
        preview_rows: config.preview_rows,
    })
    .await
}

fn parse_format(s: &str) -> Result<FileFormat, String> {
    FileFormat::from_name(s).ok_or_else(|| format!("unsupported format '{}' (expected xlsx or csv)", s))
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got '{}'", s)),
        },
    }
}
