// Summary statistics for a single measurement column

use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;

use crate::dataset::COMMENT_MARKER;
use crate::error::{CalibError, Result};

/// Common statistics of a data series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub stdev: f64,
    pub peak_to_peak: f64,
    pub max: f64,
    pub min: f64,
}

impl Stats {
    /// Compute statistics over `data`. At least two values are needed.
    pub fn compute(data: &[f64]) -> Result<Self> {
        if data.len() < 2 {
            return Err(CalibError::InsufficientData { needed: 2, got: data.len() });
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let variance = data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let max = data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let min = data.iter().fold(f64::INFINITY, |a, &b| a.min(b));

        Ok(Stats {
            mean,
            stdev: variance.sqrt(),
            peak_to_peak: max - min,
            max,
            min,
        })
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-- Stats ------------------------")?;
        writeln!(f, "-------- Mean    : {}", format_general(self.mean))?;
        writeln!(f, "-------- StDev   : {}", format_general(self.stdev))?;
        writeln!(f, "-------- Pk-to-Pk: {}", format_general(self.peak_to_peak))?;
        writeln!(f, "-------- Max     : {}", format_general(self.max))?;
        write!(f, "-------- Min     : {}", format_general(self.min))
    }
}

/// Six significant digits, switching to exponent notation outside
/// `[1e-4, 1e6)`, with trailing zeros removed.
pub fn format_general(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }

    let exponent = value.abs().log10().floor() as i32;
    if (-4..6).contains(&exponent) {
        let decimals = (5 - exponent).max(0) as usize;
        trim_fraction(format!("{:.*}", decimals, value))
    } else {
        let text = format!("{:.5e}", value);
        match text.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", trim_fraction(mantissa.to_string()), exp),
            None => text,
        }
    }
}

fn trim_fraction(text: String) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Read one numeric column from a whitespace separated text file.
///
/// Comment and blank lines are skipped. `column` is zero-based and counts
/// the time column, if the file has one.
pub fn read_column<P: AsRef<Path>>(input_file: P, column: usize) -> Result<Vec<f64>> {
    let text = fs::read_to_string(input_file.as_ref())?;
    let values = parse_column(&text, column)?;
    debug!("Read {} values from column {}", values.len(), column);
    Ok(values)
}

/// Same as [`read_column`] for text already in memory.
pub fn parse_column(text: &str, column: usize) -> Result<Vec<f64>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.starts_with(COMMENT_MARKER) && !line.trim().is_empty())
        .map(|(idx, line)| {
            let field = line.split_whitespace().nth(column).ok_or_else(|| {
                CalibError::malformed(idx + 1, format!("missing column {}", column))
            })?;
            field.parse::<f64>().map_err(|e| {
                CalibError::malformed(idx + 1, format!("invalid value '{}': {}", field, e))
            })
        })
        .collect()
}
