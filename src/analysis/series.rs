//! Millisecond-indexed time series
//!
//! Peakiness and pitch are both sampled once per spectrogram hop and indexed
//! from 0 at the onset. Fusing them requires the same step; lengths may
//! differ by a few frames because of windowing at the edges, and
//! [`align`] reconciles them while reporting what was dropped.

use crate::error::AttackError;

/// Values sampled every `step_ms` milliseconds, starting at 0
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    values: Vec<T>,
    step_ms: u32,
}

impl<T> TimeSeries<T> {
    /// Create a series with the given sampling step
    pub fn new(values: Vec<T>, step_ms: u32) -> Self {
        Self { values, step_ms }
    }

    /// Sampling step in milliseconds
    pub fn step_ms(&self) -> u32 {
        self.step_ms
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the series holds no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Underlying values
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Time offset of index `i` in milliseconds
    pub fn time_at(&self, index: usize) -> u64 {
        index as u64 * self.step_ms as u64
    }

    /// Iterate `(time_ms, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (i as u64 * self.step_ms as u64, v))
    }

    /// Map every value, keeping the time base
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> TimeSeries<U> {
        TimeSeries {
            values: self.values.iter().map(f).collect(),
            step_ms: self.step_ms,
        }
    }

    fn truncated(mut self, len: usize) -> Self {
        self.values.truncate(len);
        self
    }
}

/// Two series cut to a common length
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned<A, B> {
    /// First series, truncated
    pub left: TimeSeries<A>,
    /// Second series, truncated
    pub right: TimeSeries<B>,
    /// Samples dropped from the end of the first series
    pub left_truncated: usize,
    /// Samples dropped from the end of the second series
    pub right_truncated: usize,
}

impl<A, B> Aligned<A, B> {
    /// Common length of both series
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True if either input was empty
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Total number of samples dropped
    pub fn truncated(&self) -> usize {
        self.left_truncated + self.right_truncated
    }
}

/// Align two time series to their common length
///
/// # Errors
///
/// Returns `AttackError::InvalidInput` if the series use different steps.
pub fn align<A, B>(
    left: TimeSeries<A>,
    right: TimeSeries<B>,
) -> Result<Aligned<A, B>, AttackError> {
    if left.step_ms != right.step_ms {
        return Err(AttackError::InvalidInput(format!(
            "Cannot align series with different steps ({} ms vs {} ms)",
            left.step_ms, right.step_ms
        )));
    }

    let len = left.len().min(right.len());
    let left_truncated = left.len() - len;
    let right_truncated = right.len() - len;

    if left_truncated + right_truncated > 0 {
        log::debug!(
            "Aligned series to {} samples (dropped {} left, {} right)",
            len,
            left_truncated,
            right_truncated
        );
    }

    Ok(Aligned {
        left: left.truncated(len),
        right: right.truncated(len),
        left_truncated,
        right_truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_index() {
        let series = TimeSeries::new(vec![0.1, 0.2, 0.3], 5);
        assert_eq!(series.time_at(2), 10);
        let times: Vec<u64> = series.iter().map(|(t, _)| t).collect();
        assert_eq!(times, vec![0, 5, 10]);
    }

    #[test]
    fn test_align_reports_truncation() {
        let a = TimeSeries::new(vec![1, 2, 3, 4, 5], 1);
        let b = TimeSeries::new(vec![10, 20, 30], 1);
        let aligned = align(a, b).unwrap();
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned.left.values(), &[1, 2, 3]);
        assert_eq!(aligned.left_truncated, 2);
        assert_eq!(aligned.right_truncated, 0);
        assert_eq!(aligned.truncated(), 2);
    }

    #[test]
    fn test_align_equal_lengths_is_lossless() {
        let a = TimeSeries::new(vec![1.0, 2.0], 2);
        let b = TimeSeries::new(vec![Some(3.0), None], 2);
        let aligned = align(a, b).unwrap();
        assert_eq!(aligned.truncated(), 0);
        assert_eq!(aligned.right.values(), &[Some(3.0), None]);
    }

    #[test]
    fn test_align_rejects_mismatched_steps() {
        let a = TimeSeries::new(vec![1.0], 1);
        let b = TimeSeries::new(vec![1.0], 2);
        assert!(matches!(align(a, b), Err(AttackError::InvalidInput(_))));
    }
}
