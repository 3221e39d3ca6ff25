//! Relative-to-mean energy threshold onset detector
//!
//! Algorithm:
//! 1. Sum energy across frequency bins for every frame
//! 2. Compute the mean of that energy curve
//! 3. Return the first frame with `energy > mean * ratio`
//!
//! Raising `ratio` can only move the onset later.

use super::Onset;
use crate::error::AttackError;
use crate::features::spectrogram::Spectrogram;

/// Find the first frame whose energy exceeds `mean_energy * ratio`
///
/// # Arguments
///
/// * `spectrogram` - Mel energy grid of the whole recording
/// * `ratio` - Onset energy ratio (typically 0.3)
///
/// # Errors
///
/// Returns `AttackError::AttackClarity` if no frame crosses the threshold,
/// which is the case for silence and for any recording without an energy rise.
pub fn detect_onset(spectrogram: &Spectrogram, ratio: f32) -> Result<Onset, AttackError> {
    let energy = spectrogram.frame_energies();
    if energy.is_empty() {
        return Err(AttackError::InsufficientSignal(
            "Spectrogram has no frames".to_string(),
        ));
    }

    let mean = energy.iter().map(|&e| e as f64).sum::<f64>() / energy.len() as f64;
    let threshold = mean * ratio as f64;

    log::debug!(
        "Onset detection: {} frames, mean energy={:.6}, threshold={:.6} (ratio {:.3})",
        energy.len(),
        mean,
        threshold,
        ratio
    );

    let frame = energy
        .iter()
        .position(|&e| e as f64 > threshold)
        .ok_or_else(|| AttackError::AttackClarity("no energy above threshold".to_string()))?;

    let time_ms = frame as u64 * spectrogram.time_resolution_ms() as u64;
    log::debug!("Onset at frame {} ({} ms)", frame, time_ms);

    Ok(Onset { frame, time_ms })
}
