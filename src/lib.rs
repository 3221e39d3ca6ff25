//! # Attack Time
//!
//! Attack-time estimation for monophonic note recordings: the interval from
//! the onset of audible energy to the point where timbre and pitch settle.
//! Durations measured over labelled clean and dirty attacks can be compared to
//! calibrate the estimator.
//!
//! ## Features
//!
//! - **Onset Detection**: First frame whose mel energy exceeds a fraction of the mean
//! - **Peakiness**: Share of frame energy held by the strongest spectral peaks
//! - **Pitch Tracking**: YIN fundamental frequency in semitones from A4
//! - **Stability Fusion**: Rolling-window masks over both series, ANDed
//! - **Calibration**: Parallel grid search scored by Normal overlap and margin
//!
//! ## Quick Start
//!
//! ```no_run
//! use attack_time::{estimate_attack, AttackConfig};
//!
//! // Load audio samples (mono, f32)
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 44100;
//!
//! let result = estimate_attack(&samples, sample_rate, &AttackConfig::default())?;
//!
//! println!("Attack starts at {} ms and lasts {} ms", result.start_ms, result.duration_ms);
//! # Ok::<(), attack_time::AttackError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Waveform → Mel Spectrogram → Onset → { Peakiness, Pitch } → Stability Fusion → AttackResult
//! ```
//!
//! The calibration sweep wraps this pipeline, varying four parameters over a
//! grid and scoring each point.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod calibration;
pub mod config;
pub mod error;
pub mod estimator;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::result::{AttackAnalysis, AttackResult};
pub use calibration::{separation_score, CalibrationRow, Corpus, ParameterGrid, SeparationScore};
pub use config::AttackConfig;
pub use error::AttackError;
pub use estimator::{estimate_attack, estimate_attack_from_file, AttackEstimator};
pub use features::pitch::{PitchEstimator, YinEstimator};
pub use io::{load_audio, Waveform};
