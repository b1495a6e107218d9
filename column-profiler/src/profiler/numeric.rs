//! Streaming moments for numeric columns.

use serde::{Deserialize, Serialize};

use super::errors::ProfileResult;
use super::traits::ProfileState;

/// Count, sum, min/max and population variance of the non-null values of one
/// numeric column.
///
/// The second moment is kept in Welford form (`mean`, `m2`) so that large
/// values do not lose precision to `Σx² - n·mean²` cancellation. Partition
/// states combine with the parallel-variance formula; the pooled mean is
/// computed symmetrically so `a.combine(b)` and `b.combine(a)` are
/// bit-identical.
///
/// NaN observations are counted and propagate into sum, mean and variance
/// following IEEE arithmetic; min and max skip them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericAccumulator {
    count: u64,
    sum: f64,
    mean: f64,
    m2: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumericAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one non-null observation.
    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);

        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Number of non-null observations.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// `sum / n`, or `None` when nothing was observed.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    /// Population variance (divides by `n`), or `None` when nothing was
    /// observed.
    pub fn variance(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            // Rounding can push a zero-spread m2 just below zero
            Some((self.m2 / self.count as f64).max(0.0))
        }
    }

    /// Population standard deviation.
    pub fn stddev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }
}

impl ProfileState for NumericAccumulator {
    fn merge_from(&mut self, other: &Self) -> ProfileResult<()> {
        if other.count == 0 {
            return Ok(());
        }
        if self.count == 0 {
            *self = other.clone();
            return Ok(());
        }

        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;

        self.mean = (self.mean * n_a + other.mean * n_b) / n;
        self.m2 = self.m2 + other.m2 + delta * delta * (n_a * n_b) / n;
        self.count += other.count;
        self.sum += other.sum;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }
}
