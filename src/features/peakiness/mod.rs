//! Spectral peakiness
//!
//! Peakiness is the fraction of a frame's energy carried by its `K` strongest
//! local maxima along the frequency axis. A clean, tonal spectrum puts almost
//! all energy in a few partials and scores close to 1; a noisy attack spreads
//! energy across bins and scores low.
//!
//! # Example
//!
//! ```
//! use attack_time::features::peakiness::frame_peakiness;
//!
//! let frame = [0.0, 4.0, 0.0, 0.0, 1.0, 0.0];
//! assert_eq!(frame_peakiness(&frame, 1), Some(0.8));
//! assert_eq!(frame_peakiness(&[0.0; 6], 1), None);
//! ```

pub mod peaks;

use crate::analysis::series::TimeSeries;
use crate::features::spectrogram::Spectrogram;

/// Peakiness of a single frame
///
/// Returns `None` when the frame carries no energy, since the ratio is
/// undefined there. Otherwise the value lies in `[0, 1]` for non-negative
/// energies.
pub fn frame_peakiness(frame: &[f32], peak_count: usize) -> Option<f32> {
    let total: f64 = frame.iter().map(|&v| v as f64).sum();
    if total.is_nan() || total <= 0.0 {
        return None;
    }

    let ratio = peaks::top_peak_sum(frame, peak_count) / total;
    Some(ratio.clamp(0.0, 1.0) as f32)
}

/// Peakiness series from `start_frame` to the end of the spectrogram
///
/// # Arguments
///
/// * `spectrogram` - Mel energy grid of the whole recording
/// * `start_frame` - First frame to analyse (the onset); index 0 of the output
/// * `peak_count` - Number of strongest peaks summed per frame
///
/// # Returns
///
/// One value per frame, stepped by the spectrogram's time resolution.
/// Frames with zero energy are `None`.
pub fn peakiness_series(
    spectrogram: &Spectrogram,
    start_frame: usize,
    peak_count: usize,
) -> TimeSeries<Option<f32>> {
    let values: Vec<Option<f32>> = spectrogram
        .frames_from(start_frame)
        .map(|frame| frame_peakiness(frame, peak_count))
        .collect();

    let undefined = values.iter().filter(|v| v.is_none()).count();
    log::debug!(
        "Peakiness: {} frames from frame {}, top {} peaks, {} undefined",
        values.len(),
        start_frame,
        peak_count,
        undefined
    );

    TimeSeries::new(values, spectrogram.time_resolution_ms())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random energies in [0, 1)
    fn pseudo_random_frame(seed: u32, len: usize) -> Vec<f32> {
        let mut state = seed.wrapping_mul(747796405).wrapping_add(2891336453);
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                (state >> 8) as f32 / (1u32 << 24) as f32
            })
            .collect()
    }

    #[test]
    fn test_single_partial_is_fully_peaky() {
        let mut frame = vec![0.0f32; 128];
        frame[40] = 3.0;
        assert_eq!(frame_peakiness(&frame, 5), Some(1.0));
    }

    #[test]
    fn test_flat_spectrum_has_no_peaks() {
        let frame = vec![1.0f32; 128];
        assert_eq!(frame_peakiness(&frame, 5), Some(0.0));
    }

    #[test]
    fn test_zero_energy_is_undefined() {
        assert_eq!(frame_peakiness(&[0.0; 16], 5), None);
    }

    #[test]
    fn test_peak_count_larger_than_peaks() {
        let frame = [0.0, 2.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        // One strict peak (2.0) out of 5.0 total
        assert_eq!(frame_peakiness(&frame, 50), Some(0.4));
    }

    #[test]
    fn test_peakiness_bounded_for_arbitrary_frames() {
        for seed in 0..200 {
            let frame = pseudo_random_frame(seed, 128);
            for k in [1, 3, 5, 6, 200] {
                let p = frame_peakiness(&frame, k).unwrap();
                assert!((0.0..=1.0).contains(&p), "seed {} k {} gave {}", seed, k, p);
            }
        }
    }

    #[test]
    fn test_series_starts_at_requested_frame() {
        let frames = vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 1.0, 1.0],
        ];
        let spectrogram = Spectrogram::from_frames(frames, 44, 2).unwrap();
        let series = peakiness_series(&spectrogram, 1, 5);
        assert_eq!(series.values(), &[Some(1.0), Some(0.0)]);
        assert_eq!(series.step_ms(), 2);

        let full = peakiness_series(&spectrogram, 0, 5);
        assert_eq!(full.values()[0], None);
    }
}
