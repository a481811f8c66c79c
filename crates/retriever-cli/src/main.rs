//! `kml-fix` - names every placemark in a KML export and writes its
//! attribute data to CSV

use anyhow::{Context, Result};
use clap::Parser;
use retriever_kml::{
    run, LogLevel, ReconcileConfig, TabularOutcome, DEFAULT_INPUT_FILE, DEFAULT_NAME_FIELD,
    DEFAULT_OUTPUT_PATH,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kml-fix")]
#[command(version)]
#[command(about = "Fixes KML files such as NC State-Owned Land")]
struct Cli {
    /// Input KML file
    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    input: PathBuf,

    /// Output directory for the fixed KML and CSV files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Book id to start with (accepted for compatibility; not used)
    #[arg(short, long)]
    start_with: Option<u32>,

    /// Extended data field used as each placemark's name
    #[arg(long, default_value = DEFAULT_NAME_FIELD)]
    name_field: String,

    /// Log level: error, warn, info, debug or trace
    #[arg(short, long, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

fn init_tracing(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.as_str()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ReconcileConfig::new(&cli.input, &cli.output)
        .with_name_field(cli.name_field)
        .with_log_level(cli.log_level)
        .with_start_with(cli.start_with);
    init_tracing(config.log_level);

    let report = run(&config)
        .with_context(|| format!("Failed to fix {}", cli.input.display()))?;

    println!(
        "Named {} placemarks: {}",
        report.placemarks,
        report.kml_path.display()
    );
    match report.csv {
        TabularOutcome::Written { rows } => {
            println!("Wrote {rows} rows: {}", report.csv_path.display());
        }
        TabularOutcome::Failed => {
            println!("CSV export failed: {}", report.csv_path.display());
        }
    }
    Ok(())
}
