// Piecewise-linear interpolation models

use std::sync::Arc;

use log::warn;

use crate::error::{CalibError, Result};

/// Piecewise-linear model of one measured variable over a shared time axis.
///
/// The model is read-only once built and can be evaluated anywhere inside
/// `[times[0], times[-1]]`. Queries outside that domain are rejected.
#[derive(Debug, Clone)]
pub struct LinearModel {
    times: Arc<[i64]>,
    values: Vec<f64>,
}

impl LinearModel {
    /// Build a model from borrowed samples.
    pub fn build(times: &[i64], values: &[f64]) -> Result<Self> {
        Self::from_shared(Arc::from(times), values.to_vec())
    }

    /// Build a model on a time axis that other models may share.
    ///
    /// A time smaller than its predecessor is rejected, as are values that
    /// are not finite and domains wider than `i64` can measure. Repeated
    /// times are accepted; at a repeated time the model reports the last
    /// sample. Error indices count samples, not file lines.
    pub fn from_shared(times: Arc<[i64]>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(CalibError::LengthMismatch {
                expected: times.len(),
                actual: values.len(),
            });
        }
        if times.len() < 2 {
            return Err(CalibError::InsufficientData { needed: 2, got: times.len() });
        }

        let mut duplicates = 0usize;
        for (index, pair) in times.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(CalibError::NonMonotonicTime {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
            if pair[1] == pair[0] {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            warn!("{} repeated timestamps, keeping the last sample of each", duplicates);
        }

        // Every segment and query offset lies inside the domain, so a domain
        // that fits in i64 keeps all later subtractions in range.
        let (start, end) = (times[0], times[times.len() - 1]);
        if end.checked_sub(start).is_none() {
            return Err(CalibError::TimeSpanOverflow { start, end });
        }

        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(CalibError::NonFiniteValue { index, value });
        }

        Ok(LinearModel { times, values })
    }

    /// First and last time of the model domain, both inclusive.
    pub fn domain(&self) -> (i64, i64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// Evaluate the model at a real-valued time.
    pub fn value_at(&self, t: f64) -> Result<f64> {
        let (start, end) = self.domain();
        if t.is_nan() || t < start as f64 || t > end as f64 {
            return Err(CalibError::OutOfDomain { time: t, start, end });
        }

        // Last control point with times[i] <= t.
        let i = self.times.partition_point(|&x| x as f64 <= t) - 1;
        Ok(self.interpolate(i, t - self.times[i] as f64))
    }

    /// Evaluate the model at an integer time.
    pub fn value_at_time(&self, t: i64) -> Result<f64> {
        let (start, end) = self.domain();
        if t < start || t > end {
            return Err(CalibError::OutOfDomain { time: t as f64, start, end });
        }

        let i = self.times.partition_point(|&x| x <= t) - 1;
        Ok(self.interpolate(i, (t - self.times[i]) as f64))
    }

    fn interpolate(&self, i: usize, offset: f64) -> f64 {
        if i + 1 == self.times.len() {
            return self.values[i];
        }
        // times[i] <= t < times[i+1], so the segment has a non-zero width.
        let (t0, t1) = (self.times[i], self.times[i + 1]);
        let (v0, v1) = (self.values[i], self.values[i + 1]);
        v0 + (v1 - v0) * offset / (t1 - t0) as f64
    }
}
