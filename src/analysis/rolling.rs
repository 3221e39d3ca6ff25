//! Rolling-window statistics over series with undefined samples
//!
//! A window is only defined when it is complete and every sample inside it is
//! defined. Minima and maxima are tracked with monotonic deques, so each
//! statistic costs O(n) regardless of the window width.

use std::collections::VecDeque;

/// Minimum and maximum of the window ending at every index
///
/// `result[j]` covers `values[j + 1 - width ..= j]`; it is `None` for
/// `j + 1 < width` and for windows containing a `None`.
pub fn trailing_extremes(values: &[Option<f32>], width: usize) -> Vec<Option<(f32, f32)>> {
    let mut result = Vec::with_capacity(values.len());
    if width == 0 {
        result.resize(values.len(), None);
        return result;
    }

    let mut minima: VecDeque<(usize, f32)> = VecDeque::new();
    let mut maxima: VecDeque<(usize, f32)> = VecDeque::new();
    // Index of the most recent undefined sample
    let mut last_gap: Option<usize> = None;

    for (j, value) in values.iter().enumerate() {
        match *value {
            Some(v) if !v.is_nan() => {
                while minima.back().is_some_and(|&(_, m)| m >= v) {
                    minima.pop_back();
                }
                minima.push_back((j, v));
                while maxima.back().is_some_and(|&(_, m)| m <= v) {
                    maxima.pop_back();
                }
                maxima.push_back((j, v));
            }
            _ => {
                last_gap = Some(j);
                minima.clear();
                maxima.clear();
            }
        }

        if j + 1 < width {
            result.push(None);
            continue;
        }

        let window_start = j + 1 - width;
        while minima.front().is_some_and(|&(i, _)| i < window_start) {
            minima.pop_front();
        }
        while maxima.front().is_some_and(|&(i, _)| i < window_start) {
            maxima.pop_front();
        }

        let has_gap = last_gap.is_some_and(|g| g >= window_start);
        let extremes = match (has_gap, minima.front(), maxima.front()) {
            (false, Some(&(_, lo)), Some(&(_, hi))) => Some((lo, hi)),
            _ => None,
        };
        result.push(extremes);
    }

    result
}

/// Trailing rolling minimum of width `width`
pub fn rolling_min(values: &[Option<f32>], width: usize) -> Vec<Option<f32>> {
    trailing_extremes(values, width)
        .into_iter()
        .map(|e| e.map(|(lo, _)| lo))
        .collect()
}

/// Range (`max - min`) of the forward-looking window starting at every index
///
/// `result[i]` covers `values[i .. i + width]`; indices without a complete
/// window ahead of them are `None`.
pub fn leading_range(values: &[Option<f32>], width: usize) -> Vec<Option<f32>> {
    let extremes = trailing_extremes(values, width);
    (0..values.len())
        .map(|i| {
            let end = (i + width).checked_sub(1)?;
            extremes.get(end).copied().flatten().map(|(lo, hi)| hi - lo)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defined(values: &[f32]) -> Vec<Option<f32>> {
        values.iter().copied().map(Some).collect()
    }

    /// Direct O(n * w) reference
    fn naive_rolling_min(values: &[Option<f32>], width: usize) -> Vec<Option<f32>> {
        (0..values.len())
            .map(|j| {
                if j + 1 < width {
                    return None;
                }
                values[j + 1 - width..=j]
                    .iter()
                    .try_fold(f32::INFINITY, |acc, v| v.map(|v| acc.min(v)))
            })
            .collect()
    }

    #[test]
    fn test_rolling_min_basic() {
        let values = defined(&[3.0, 1.0, 4.0, 1.5, 5.0, 9.0]);
        assert_eq!(
            rolling_min(&values, 3),
            vec![None, None, Some(1.0), Some(1.0), Some(1.5), Some(1.5)]
        );
    }

    #[test]
    fn test_rolling_min_matches_naive() {
        let values: Vec<Option<f32>> = (0..300)
            .map(|i| {
                if i % 37 == 11 {
                    None
                } else {
                    Some(((i * 7919) % 101) as f32 / 10.0)
                }
            })
            .collect();
        for width in [1, 2, 5, 30, 64] {
            assert_eq!(rolling_min(&values, width), naive_rolling_min(&values, width));
        }
    }

    #[test]
    fn test_gap_poisons_every_window_containing_it() {
        let values = vec![Some(1.0), Some(1.0), None, Some(1.0), Some(1.0), Some(1.0)];
        assert_eq!(
            rolling_min(&values, 2),
            vec![None, Some(1.0), None, None, Some(1.0), Some(1.0)]
        );
    }

    #[test]
    fn test_leading_range_looks_forward() {
        let values = defined(&[0.0, 2.0, 0.5, 0.6, 0.4, 0.5]);
        let range = leading_range(&values, 3);
        assert_eq!(range.len(), 6);
        assert_eq!(range[0], Some(2.0));
        assert_eq!(range[1], Some(1.5));
        assert!((range[2].unwrap() - 0.2).abs() < 1e-6);
        assert!((range[3].unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(range[4], None);
        assert_eq!(range[5], None);
    }

    #[test]
    fn test_window_wider_than_series() {
        let values = defined(&[1.0, 2.0]);
        assert_eq!(rolling_min(&values, 5), vec![None, None]);
        assert_eq!(leading_range(&values, 5), vec![None, None]);
    }
}
