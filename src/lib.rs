// src/lib.rs
// Calibration resampling library - Public API

//! # calib_resample
//!
//! Post-processing of timing-calibration logs captured from a link monitor.
//!
//! ## Features
//!
//! - Load sparse, irregularly timestamped columnar logs
//! - Build one piecewise-linear model per measured variable
//! - Resample every variable on a one-row-per-second grid
//! - Write the grid with a fixed two-decimal precision, all or nothing
//! - Summary statistics of a single column
//! - Field extraction from captured monitor output
//!
//! ## Example
//!
//! ```no_run
//! use calib_resample::{Dataset, Resampler, write_grid};
//!
//! let dataset = Dataset::load("link.dat").expect("Failed to load log");
//! let models = dataset.into_models().expect("Failed to build models");
//! let resampler = Resampler::new(models).expect("Failed to set up resampler");
//!
//! let rows = write_grid("link_output.dat", resampler.rows(), "link.dat")
//!     .expect("Failed to write output");
//! println!("Rows written: {}", rows);
//! ```

mod dataset;
mod error;
mod extract;
mod model;
mod resample;
mod stats;
mod writer;

use std::path::{Path, PathBuf};

pub use dataset::{Dataset, COMMENT_MARKER, FIELD_SEPARATOR};
pub use error::{CalibError, Result};
pub use extract::{format_record, FieldExtractor, Record, Timestamps, TEMPERATURE_KEY};
pub use model::LinearModel;
pub use resample::{GridRows, ResampledGrid, Resampler, Row};
pub use stats::{format_general, parse_column, read_column, Stats};
pub use writer::{format_row, write_grid, TOOL_NAME, VALUE_PRECISION};

/// Run the whole resampling pipeline from `input_file` to `output_file`.
///
/// Nothing is written when loading or model construction fails. Returns
/// the number of rows written.
pub fn interpolate_file<P: AsRef<Path>, Q: AsRef<Path>>(input_file: P, output_file: Q) -> Result<usize> {
    let input_file = input_file.as_ref();

    let dataset = Dataset::load(input_file)?;
    let resampler = Resampler::new(dataset.into_models()?)?;

    let source = input_file.to_string_lossy();
    write_grid(output_file, resampler.rows(), &source)
}

/// Default output path: `<stem>_output.<ext>` next to the input.
pub fn default_output_path<P: AsRef<Path>>(input_file: P) -> PathBuf {
    let input_file = input_file.as_ref();
    let stem = input_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match input_file.extension() {
        Some(ext) => format!("{}_output.{}", stem, ext.to_string_lossy()),
        None => format!("{}_output", stem),
    };
    input_file.with_file_name(name)
}
