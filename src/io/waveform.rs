//! Mono PCM waveform

use crate::error::AttackError;
use std::path::Path;

/// Mono PCM samples plus their sample rate
///
/// Immutable once constructed. Sub-slices for post-onset analysis are taken
/// with [`Waveform::samples_from`] instead of copying.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap decoded samples
    ///
    /// # Errors
    ///
    /// Returns `AttackError::InvalidInput` for an empty buffer or a zero sample rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AttackError> {
        if samples.is_empty() {
            return Err(AttackError::InvalidInput("Empty audio samples".to_string()));
        }
        if sample_rate == 0 {
            return Err(AttackError::InvalidInput("Invalid sample rate".to_string()));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Decode a file into a mono waveform at its native sample rate
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AttackError> {
        super::decoder::load_audio(path)
    }

    /// All samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Samples starting at `offset`, empty if the offset is past the end
    pub fn samples_from(&self, offset: usize) -> &[f32] {
        &self.samples[offset.min(self.samples.len())..]
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed waveform; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_zero_rate() {
        assert!(matches!(
            Waveform::new(vec![], 44100),
            Err(AttackError::InvalidInput(_))
        ));
        assert!(matches!(
            Waveform::new(vec![0.0; 10], 0),
            Err(AttackError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_duration_and_slicing() {
        let waveform = Waveform::new(vec![0.25; 44100], 44100).unwrap();
        assert!((waveform.duration_ms() - 1000.0).abs() < 1e-9);
        assert_eq!(waveform.samples_from(44000).len(), 100);
        assert!(waveform.samples_from(50000).is_empty());
    }
}
