//! Attack estimation result types

use serde::{Deserialize, Serialize};

/// Attack start and duration
///
/// `duration_ms` is measured from the onset, not from the start of the
/// recording; use [`AttackResult::end_ms`] for the absolute end.
///
/// # Example
///
/// ```
/// use attack_time::AttackResult;
///
/// let result = AttackResult { start_ms: 12, duration_ms: 85 };
/// assert_eq!(result.end_ms(), 97);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackResult {
    /// Onset time from the start of the recording, in milliseconds
    pub start_ms: u64,

    /// Time from onset until peakiness and pitch are both stable, in milliseconds
    pub duration_ms: u64,
}

impl AttackResult {
    /// Absolute end of the attack from the start of the recording
    pub fn end_ms(&self) -> u64 {
        self.start_ms + self.duration_ms
    }
}

/// Attack result with pipeline diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackAnalysis {
    /// The attack itself
    pub result: AttackResult,

    /// Spectrogram frame of the onset
    pub onset_frame: usize,

    /// Frames analysed after alignment
    pub analysed_frames: usize,

    /// Frames dropped when aligning peakiness and pitch
    pub truncated_frames: usize,

    /// Post-onset frames without a usable pitch estimate
    pub unvoiced_frames: usize,

    /// Post-onset frames with zero spectral energy
    pub silent_frames: usize,
}
