//! Error types for attack time estimation

use std::fmt;

/// Errors that can occur while estimating an attack
///
/// Everything except [`AttackError::Configuration`] is a per-recording failure:
/// a batch caller records it and moves on to the next file.
#[derive(Debug, Clone, PartialEq)]
pub enum AttackError {
    /// The attack could not be bounded (no onset, or peakiness and pitch never settle together)
    AttackClarity(String),

    /// Waveform too short to produce a single analysis frame
    InsufficientSignal(String),

    /// Invalid configuration values, detected before any file is processed
    Configuration(String),

    /// Audio file could not be opened or decoded
    UnreadableInput(String),

    /// Invalid input parameters (empty waveform, zero sample rate, oversized recording)
    InvalidInput(String),
}

impl AttackError {
    /// Whether a batch should record this failure and continue
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AttackError::Configuration(_))
    }
}

impl fmt::Display for AttackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackError::AttackClarity(msg) => write!(f, "Attack clarity error: {}", msg),
            AttackError::InsufficientSignal(msg) => write!(f, "Insufficient signal: {}", msg),
            AttackError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AttackError::UnreadableInput(msg) => write!(f, "Unreadable input: {}", msg),
            AttackError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for AttackError {}
