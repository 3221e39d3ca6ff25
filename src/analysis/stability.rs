//! Stability fusion
//!
//! Combines the peakiness and pitch series into one attack-end boundary.
//!
//! Algorithm:
//! 1. Peakiness mask: trailing rolling minimum over `rolling_window` frames;
//!    stable where the minimum exceeds `peak_energy_threshold`. A short spike
//!    of peakiness cannot pass, only a sustained plateau.
//! 2. Pitch mask: range (`max - min`) of the forward-looking window of
//!    `pitch_window` frames starting at each index; stable where the range is
//!    below `pitch_stability_threshold` semitones, i.e. pitch has settled into
//!    a flat neighbourhood beginning there.
//! 3. Align both series to a common length and AND the masks.
//! 4. The attack ends at the first index where both masks hold.

use super::rolling::{leading_range, rolling_min};
use super::series::{align, TimeSeries};
use crate::config::AttackConfig;
use crate::error::AttackError;

/// Thresholds and window widths used by the fuser
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityParams {
    /// Trailing window over peakiness, in frames
    pub rolling_window: usize,
    /// Rolling-minimum peakiness must exceed this
    pub peak_energy_threshold: f32,
    /// Forward window over pitch, in frames
    pub pitch_window: usize,
    /// Pitch range inside the window must stay below this, in semitones
    pub pitch_stability_threshold: f32,
}

impl StabilityParams {
    /// Parameters taken from a configuration
    pub fn from_config(config: &AttackConfig) -> Self {
        Self {
            rolling_window: config.rolling_window,
            peak_energy_threshold: config.peak_energy_threshold,
            pitch_window: config.pitch_window_frames(),
            pitch_stability_threshold: config.pitch_stability_threshold,
        }
    }
}

/// Where the attack ends, relative to the onset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityBoundary {
    /// First jointly stable index of the aligned series
    pub index: usize,
    /// That index in milliseconds from the onset
    pub offset_ms: u64,
    /// Frames dropped while aligning the two series
    pub truncated_frames: usize,
}

/// Peakiness stability mask
pub fn peakiness_mask(peakiness: &[Option<f32>], window: usize, threshold: f32) -> Vec<bool> {
    rolling_min(peakiness, window)
        .into_iter()
        .map(|min| min.is_some_and(|m| m > threshold))
        .collect()
}

/// Pitch stability mask
pub fn pitch_mask(pitch: &[Option<f32>], window: usize, threshold: f32) -> Vec<bool> {
    leading_range(pitch, window)
        .into_iter()
        .map(|range| range.is_some_and(|r| r < threshold))
        .collect()
}

/// Find the first index where peakiness and pitch are both stable
///
/// # Arguments
///
/// * `peakiness` - Peakiness series from the onset (values in `[0, 1]`)
/// * `pitch` - Pitch series in semitones from the onset, same step
/// * `params` - Window widths and thresholds
///
/// # Errors
///
/// Returns `AttackError::AttackClarity` if no index satisfies both conditions,
/// and `AttackError::InvalidInput` if the series use different steps.
pub fn find_attack_end(
    peakiness: TimeSeries<Option<f32>>,
    pitch: TimeSeries<Option<f32>>,
    params: &StabilityParams,
) -> Result<StabilityBoundary, AttackError> {
    let aligned = align(peakiness, pitch)?;
    if aligned.truncated() > 0 {
        log::debug!(
            "Stability fusion: truncated {} peakiness and {} pitch frames",
            aligned.left_truncated,
            aligned.right_truncated
        );
    }

    let peak_stable = peakiness_mask(
        aligned.left.values(),
        params.rolling_window,
        params.peak_energy_threshold,
    );
    let pitch_stable = pitch_mask(
        aligned.right.values(),
        params.pitch_window,
        params.pitch_stability_threshold,
    );

    log::debug!(
        "Stability fusion: {} frames, {} peakiness-stable, {} pitch-stable",
        aligned.len(),
        peak_stable.iter().filter(|&&s| s).count(),
        pitch_stable.iter().filter(|&&s| s).count()
    );

    let index = peak_stable
        .iter()
        .zip(&pitch_stable)
        .position(|(&p, &f)| p && f)
        .ok_or_else(|| {
            let reason = if !peak_stable.iter().any(|&s| s) {
                format!(
                    "Attack peaks energy is too low (never above {})",
                    params.peak_energy_threshold
                )
            } else if !pitch_stable.iter().any(|&s| s) {
                format!(
                    "Pitch never settles within {} semitones over {} frames",
                    params.pitch_stability_threshold, params.pitch_window
                )
            } else {
                "Peakiness and pitch never stabilise at the same time".to_string()
            };
            AttackError::AttackClarity(reason)
        })?;

    Ok(StabilityBoundary {
        index,
        offset_ms: aligned.left.time_at(index),
        truncated_frames: aligned.truncated(),
    })
}
