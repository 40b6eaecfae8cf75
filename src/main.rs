// src/main.rs
// Command-line front end for the calibration resampling tools

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use calib_resample::{
    default_output_path, interpolate_file, read_column, FieldExtractor, Stats, Timestamps,
};
use clap::{Parser, Subcommand};
use log::info;

#[derive(Parser)]
#[command(name = "calib_resample")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resample a sparse log onto a one-row-per-second grid
    Interpolate {
        /// Input log (no trailing whitespace allowed)
        file: PathBuf,

        /// Output file, defaults to <stem>_output.<ext>
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print mean, stdev and peak-to-peak of one column
    Stats {
        /// Columnar or single-column data file
        file: PathBuf,

        /// Zero-based column index
        #[arg(short, long, default_value = "0")]
        column: usize,
    },

    /// Extract named fields from captured monitor output
    Extract {
        /// Captured monitor text
        file: PathBuf,

        /// Keys to catch, in output column order
        #[arg(short, long, num_args = 1.., required = true)]
        keys: Vec<String>,

        /// Add a timestamp to every record, starting at SEED and adding INCR
        #[arg(short, long, num_args = 2, value_names = ["SEED", "INCR"])]
        ts: Option<Vec<i64>>,

        /// Output file, defaults to <stem>_output.<ext>
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Interpolate { file, output } => interpolate(&file, output),
        Commands::Stats { file, column } => print_stats(&file, column),
        Commands::Extract { file, keys, ts, output } => extract(&file, &keys, ts, output),
    }
}

fn interpolate(input_file: &Path, output: Option<PathBuf>) -> Result<()> {
    let output_file = output.unwrap_or_else(|| default_output_path(input_file));
    info!("Resampling {} into {}", input_file.display(), output_file.display());

    let rows = interpolate_file(input_file, &output_file)
        .with_context(|| format!("resampling '{}'", input_file.display()))?;

    println!("New values generated!");
    println!("Rows written to {}: {}", output_file.display(), rows);
    Ok(())
}

fn print_stats(input_file: &Path, column: usize) -> Result<()> {
    let values = read_column(input_file, column)
        .with_context(|| format!("reading column {} of '{}'", column, input_file.display()))?;
    let stats = Stats::compute(&values)
        .with_context(|| format!("computing statistics of '{}'", input_file.display()))?;

    println!("{}", stats);
    Ok(())
}

fn extract(
    input_file: &Path,
    keys: &[String],
    ts: Option<Vec<i64>>,
    output: Option<PathBuf>,
) -> Result<()> {
    let output_file = output.unwrap_or_else(|| default_output_path(input_file));
    let timestamps = ts.map(|v| Timestamps { seed: v[0], incr: v[1] });

    let extractor = FieldExtractor::new(keys).context("compiling field patterns")?;
    let records = extractor
        .extract_file(input_file, &output_file, timestamps)
        .with_context(|| format!("extracting fields from '{}'", input_file.display()))?;

    println!("Records written to {}: {}", output_file.display(), records);
    Ok(())
}
