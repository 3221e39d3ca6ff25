//! Feature extraction modules
//!
//! - Mel spectrogram (STFT + Slaney filterbank)
//! - Onset detection (energy threshold)
//! - Spectral peakiness
//! - Pitch tracking (YIN)

pub mod onset;
pub mod peakiness;
pub mod pitch;
pub mod spectrogram;
