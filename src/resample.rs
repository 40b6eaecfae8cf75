// Resampling of interpolation models onto the integer time grid
// TK Ales, 2022

use std::ops::Range;

use log::debug;

use crate::error::{CalibError, Result};
use crate::model::LinearModel;

/// One output row: an integer time and one value per model.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub time: i64,
    pub values: Vec<f64>,
}

/// A fully materialized resampled grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResampledGrid {
    pub rows: Vec<Row>,
}

impl ResampledGrid {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order.
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        self.rows.iter().map(|row| row.values.get(index).copied()).collect()
    }
}

/// Evaluates a set of models over every integer time of their domain.
///
/// The grid covers `[start, end)`: the last sample's own time is not
/// emitted, which keeps the output identical to files produced so far.
#[derive(Debug, Clone)]
pub struct Resampler {
    models: Vec<LinearModel>,
    start: i64,
    end: i64,
}

impl Resampler {
    /// All models must have been built on the same time domain.
    pub fn new(models: Vec<LinearModel>) -> Result<Self> {
        let first = models.first().ok_or(CalibError::InsufficientData { needed: 1, got: 0 })?;
        let (start, end) = first.domain();

        for (column, model) in models.iter().enumerate().skip(1) {
            if model.domain() != (start, end) {
                return Err(CalibError::DomainMismatch { column });
            }
        }

        debug!("Resampling {} models over [{}, {})", models.len(), start, end);
        Ok(Resampler { models, start, end })
    }

    /// The half-open range of emitted times.
    pub fn span(&self) -> Range<i64> {
        self.start..self.end
    }

    /// Number of rows the grid will contain.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Evaluate every model at `t`.
    ///
    /// Models are independent of each other, so this is the place to split
    /// work per column.
    pub fn evaluate_row(&self, t: i64) -> Result<Row> {
        let values = self
            .models
            .iter()
            .map(|model| model.value_at_time(t))
            .collect::<Result<Vec<f64>>>()?;
        Ok(Row { time: t, values })
    }

    /// Lazily yield the grid one row at a time.
    pub fn rows(&self) -> GridRows<'_> {
        GridRows { resampler: self, times: self.span() }
    }

    /// Materialize the whole grid in memory.
    pub fn collect(&self) -> Result<ResampledGrid> {
        let rows = self.rows().collect::<Result<Vec<Row>>>()?;
        Ok(ResampledGrid { rows })
    }
}

/// Iterator over the rows of a [`Resampler`].
pub struct GridRows<'a> {
    resampler: &'a Resampler,
    times: Range<i64>,
}

impl Iterator for GridRows<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let t = self.times.next()?;
        Some(self.resampler.evaluate_row(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.times.size_hint()
    }
}
