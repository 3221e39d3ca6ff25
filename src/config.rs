//! Configuration parameters for attack time estimation

use crate::error::AttackError;
use serde::{Deserialize, Serialize};

/// Attack estimation configuration
///
/// Every recognised option lives here with its default. Call
/// [`AttackConfig::validate`] (or build an [`AttackEstimator`](crate::AttackEstimator),
/// which does it for you) before processing any recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    // Onset
    /// Onset threshold as a fraction of the mean frame energy (default: 0.3)
    pub onset_energy_ratio: f32,

    // Peakiness
    /// Number of strongest spectral peaks summed per frame (default: 5)
    pub peak_count: usize,

    /// Minimum peakiness a frame must hold to count as stable (default: 0.5)
    pub peak_energy_threshold: f32,

    /// Trailing rolling-minimum width over the peakiness series, in frames (default: 30)
    pub rolling_window: usize,

    // Spectrogram
    /// Spectrogram time resolution in milliseconds; also the pitch hop (default: 1)
    pub time_resolution_ms: u32,

    /// FFT frame size for the STFT (default: 2048)
    pub fft_size: usize,

    /// Number of mel bins (default: 128)
    pub mel_bins: usize,

    /// Upper cutoff of the mel filterbank in Hz, clamped to Nyquist (default: 20000.0)
    pub mel_max_frequency_hz: f32,

    // Pitch
    /// Width of the forward-looking pitch stability window in milliseconds (default: 300)
    pub pitch_stability_window_ms: u32,

    /// Maximum pitch range inside the window, in semitones (default: 0.7)
    pub pitch_stability_threshold: f32,

    /// Reference pitch for semitone conversion, A4 in Hz (default: 442.0)
    pub reference_pitch_hz: f32,

    /// Lowest fundamental frequency searched (default: 150.0 Hz)
    pub min_frequency_hz: f32,

    /// Highest fundamental frequency searched (default: 1000.0 Hz)
    pub max_frequency_hz: f32,

    // Guards
    /// Recordings longer than this are rejected up front (default: 120000 ms)
    pub max_duration_ms: u32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            onset_energy_ratio: 0.3,
            peak_count: 5,
            peak_energy_threshold: 0.5,
            rolling_window: 30,
            time_resolution_ms: 1,
            fft_size: 2048,
            mel_bins: 128,
            mel_max_frequency_hz: 20000.0,
            pitch_stability_window_ms: 300,
            pitch_stability_threshold: 0.7,
            reference_pitch_hz: 442.0,
            min_frequency_hz: 150.0,
            max_frequency_hz: 1000.0,
            max_duration_ms: 120_000,
        }
    }
}

impl AttackConfig {
    /// Check every window and threshold
    ///
    /// # Errors
    ///
    /// Returns `AttackError::Configuration` if a value is non-positive, the
    /// frequency range is empty, or the time resolution does not evenly divide
    /// the pitch stability window.
    pub fn validate(&self) -> Result<(), AttackError> {
        fn positive(name: &str, value: f32) -> Result<(), AttackError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(AttackError::Configuration(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )))
            }
        }

        positive("onset_energy_ratio", self.onset_energy_ratio)?;
        positive("peak_energy_threshold", self.peak_energy_threshold)?;
        positive("pitch_stability_threshold", self.pitch_stability_threshold)?;
        positive("reference_pitch_hz", self.reference_pitch_hz)?;
        positive("min_frequency_hz", self.min_frequency_hz)?;
        positive("max_frequency_hz", self.max_frequency_hz)?;
        positive("mel_max_frequency_hz", self.mel_max_frequency_hz)?;

        let counts = [
            ("peak_count", self.peak_count),
            ("rolling_window", self.rolling_window),
            ("mel_bins", self.mel_bins),
            ("time_resolution_ms", self.time_resolution_ms as usize),
            ("pitch_stability_window_ms", self.pitch_stability_window_ms as usize),
            ("max_duration_ms", self.max_duration_ms as usize),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(AttackError::Configuration(format!("{} must be > 0", name)));
            }
        }

        if self.fft_size < 2 {
            return Err(AttackError::Configuration(format!(
                "fft_size must be >= 2, got {}",
                self.fft_size
            )));
        }

        if self.min_frequency_hz >= self.max_frequency_hz {
            return Err(AttackError::Configuration(format!(
                "Invalid pitch search range: min={} Hz, max={} Hz",
                self.min_frequency_hz, self.max_frequency_hz
            )));
        }

        if self.pitch_stability_window_ms % self.time_resolution_ms != 0 {
            return Err(AttackError::Configuration(format!(
                "time_resolution_ms ({}) must evenly divide pitch_stability_window_ms ({})",
                self.time_resolution_ms, self.pitch_stability_window_ms
            )));
        }

        Ok(())
    }

    /// Hop length in samples for the given sample rate
    ///
    /// # Errors
    ///
    /// Returns `AttackError::Configuration` if the resolution is finer than one sample.
    pub fn hop_length(&self, sample_rate: u32) -> Result<usize, AttackError> {
        let hop = sample_rate as u64 * self.time_resolution_ms as u64 / 1000;
        if hop == 0 {
            return Err(AttackError::Configuration(format!(
                "time_resolution_ms ({}) is shorter than one sample at {} Hz",
                self.time_resolution_ms, sample_rate
            )));
        }
        Ok(hop as usize)
    }

    /// Pitch stability window expressed in frames
    pub fn pitch_window_frames(&self) -> usize {
        (self.pitch_stability_window_ms / self.time_resolution_ms.max(1)) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AttackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pitch_window_frames(), 300);
    }

    #[test]
    fn test_hop_length() {
        let config = AttackConfig::default();
        assert_eq!(config.hop_length(44100).unwrap(), 44);

        let config = AttackConfig {
            time_resolution_ms: 5,
            pitch_stability_window_ms: 300,
            ..AttackConfig::default()
        };
        assert_eq!(config.hop_length(44100).unwrap(), 220);
        assert_eq!(config.pitch_window_frames(), 60);

        assert!(matches!(
            AttackConfig::default().hop_length(500),
            Err(AttackError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let config = AttackConfig {
            onset_energy_ratio: 0.0,
            ..AttackConfig::default()
        };
        assert!(matches!(config.validate(), Err(AttackError::Configuration(_))));

        let config = AttackConfig {
            rolling_window: 0,
            ..AttackConfig::default()
        };
        assert!(matches!(config.validate(), Err(AttackError::Configuration(_))));

        let config = AttackConfig {
            pitch_stability_threshold: f32::NAN,
            ..AttackConfig::default()
        };
        assert!(matches!(config.validate(), Err(AttackError::Configuration(_))));
    }

    #[test]
    fn test_rejects_incompatible_resolution() {
        let config = AttackConfig {
            time_resolution_ms: 7,
            pitch_stability_window_ms: 300,
            ..AttackConfig::default()
        };
        assert!(matches!(config.validate(), Err(AttackError::Configuration(_))));
    }

    #[test]
    fn test_rejects_empty_frequency_range() {
        let config = AttackConfig {
            min_frequency_hz: 1000.0,
            max_frequency_hz: 150.0,
            ..AttackConfig::default()
        };
        assert!(matches!(config.validate(), Err(AttackError::Configuration(_))));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: AttackConfig =
            serde_json::from_str(r#"{"peak_count": 3, "rolling_window": 20}"#).unwrap();
        assert_eq!(config.peak_count, 3);
        assert_eq!(config.rolling_window, 20);
        assert_eq!(config.onset_energy_ratio, 0.3);
    }
}
