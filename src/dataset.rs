// Column loader for calibration logs
// TK Ales, 2022

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use crate::error::{CalibError, Result};
use crate::model::LinearModel;

/// Marker that starts a comment line.
pub const COMMENT_MARKER: char = '#';

/// Field separator of the columnar format.
pub const FIELD_SEPARATOR: char = ' ';

/// A measurement log split into its time axis and value columns.
///
/// `times`, `lines` and every entry of `columns` have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub times: Vec<i64>,
    pub columns: Vec<Vec<f64>>,
    /// 1-based source line of each sample, for diagnostics.
    pub lines: Vec<usize>,
}

impl Dataset {
    /// Load a columnar log from disk.
    pub fn load<P: AsRef<Path>>(input_file: P) -> Result<Self> {
        let input_file = input_file.as_ref();
        let text = fs::read_to_string(input_file)?;
        let dataset = Self::parse(&text)?;

        info!(
            "Loaded {} samples x {} columns from {}",
            dataset.len(),
            dataset.num_columns(),
            input_file.display()
        );
        Ok(dataset)
    }

    /// Parse a columnar log already held in memory.
    ///
    /// Comment lines are skipped wherever they appear and blank lines are
    /// trimmed from both ends. Every other line must carry the same number
    /// of single-space separated fields as the first one.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.starts_with(COMMENT_MARKER))
            .collect();

        let first = lines.iter().position(|(_, l)| !l.trim().is_empty());
        let last = lines.iter().rposition(|(_, l)| !l.trim().is_empty());
        let rows = match (first, last) {
            (Some(first), Some(last)) => &lines[first..=last],
            _ => return Err(CalibError::malformed(0, "no data lines found")),
        };

        let (first_line, first_text) = rows[0];
        let num_fields = first_text.split(FIELD_SEPARATOR).count();
        if num_fields < 2 {
            return Err(CalibError::malformed(
                first_line,
                "expected a time column followed by at least one value column",
            ));
        }
        debug!("Header row at line {} has {} fields", first_line, num_fields);

        let mut times = Vec::with_capacity(rows.len());
        let mut lines = Vec::with_capacity(rows.len());
        let mut columns: Vec<Vec<f64>> = (1..num_fields)
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();

        for &(line_no, line) in rows {
            if line.ends_with(char::is_whitespace) {
                return Err(CalibError::malformed(
                    line_no,
                    "trailing whitespace, please remove it from the input file",
                ));
            }

            let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
            if fields.len() != num_fields {
                return Err(CalibError::malformed(
                    line_no,
                    format!("expected {} fields, found {}", num_fields, fields.len()),
                ));
            }

            let time = fields[0].parse::<i64>().map_err(|e| {
                CalibError::malformed(line_no, format!("invalid time '{}': {}", fields[0], e))
            })?;
            times.push(time);
            lines.push(line_no);

            for (col, (field, column)) in fields[1..].iter().zip(columns.iter_mut()).enumerate() {
                let value = field.parse::<f64>().map_err(|e| {
                    CalibError::malformed(
                        line_no,
                        format!("invalid value '{}' in column {}: {}", field, col + 1, e),
                    )
                })?;
                if !value.is_finite() {
                    return Err(CalibError::malformed(
                        line_no,
                        format!("non-finite value '{}' in column {}", field, col + 1),
                    ));
                }
                column.push(value);
            }
        }

        Ok(Dataset { times, columns, lines })
    }

    /// Number of samples per column.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of value columns (the time column is not counted).
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Build one model per value column, consuming the dataset.
    ///
    /// A time smaller than the one before it is reported against its source
    /// line. The time axis is shared between all models and each raw column
    /// is released as soon as its model exists.
    pub fn into_models(self) -> Result<Vec<LinearModel>> {
        let Dataset { times, columns, lines } = self;

        if let Some(idx) = times.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(CalibError::malformed(
                lines[idx + 1],
                format!("time {} goes backwards after {}", times[idx + 1], times[idx]),
            ));
        }
        drop(lines);
        let times: Arc<[i64]> = times.into();

        let mut models = Vec::with_capacity(columns.len());
        for (idx, column) in columns.into_iter().enumerate() {
            debug!("Building model for column {}", idx + 1);
            models.push(LinearModel::from_shared(Arc::clone(&times), column)?);
        }
        Ok(models)
    }
}
