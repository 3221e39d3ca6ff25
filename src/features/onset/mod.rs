//! Onset detection
//!
//! The onset is the first spectrogram frame whose summed energy rises above a
//! fraction of the recording's mean frame energy.

pub mod energy_threshold;

pub use energy_threshold::detect_onset;

/// Detected attack start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Onset {
    /// Spectrogram frame index of the onset
    pub frame: usize,

    /// Onset time in milliseconds (`frame * time_resolution_ms`)
    pub time_ms: u64,
}
