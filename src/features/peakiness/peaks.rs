//! Local maxima along the frequency axis

/// Indices of samples strictly greater than both neighbours
///
/// The first and last samples have only one neighbour and are never peaks.
/// Flat tops are not reported.
pub fn local_maxima(values: &[f32]) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }

    values
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Sum of the `k` largest local-maximum values
///
/// If fewer than `k` peaks exist, all of them are summed.
pub fn top_peak_sum(values: &[f32], k: usize) -> f64 {
    let mut peak_values: Vec<f32> = local_maxima(values).into_iter().map(|i| values[i]).collect();
    peak_values.sort_by(|a, b| b.total_cmp(a));
    peak_values.iter().take(k).map(|&v| v as f64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_maxima_strict() {
        let values = [0.0, 1.0, 0.0, 2.0, 2.0, 0.0, 3.0, 1.0];
        assert_eq!(local_maxima(&values), vec![1, 6]);
    }

    #[test]
    fn test_edges_are_not_peaks() {
        assert!(local_maxima(&[5.0, 1.0, 5.0]).is_empty());
        assert!(local_maxima(&[1.0, 2.0]).is_empty());
        assert!(local_maxima(&[]).is_empty());
    }

    #[test]
    fn test_top_peak_sum_orders_by_value() {
        let values = [0.0, 1.0, 0.0, 5.0, 0.0, 3.0, 0.0];
        assert_eq!(top_peak_sum(&values, 1), 5.0);
        assert_eq!(top_peak_sum(&values, 2), 8.0);
    }

    #[test]
    fn test_top_peak_sum_with_fewer_peaks_than_k() {
        let values = [0.0, 1.0, 0.0, 2.0, 0.0];
        assert_eq!(top_peak_sum(&values, 10), 3.0);
        assert_eq!(top_peak_sum(&[1.0, 1.0, 1.0], 5), 0.0);
    }
}
