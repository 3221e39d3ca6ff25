//! Pitch tracking
//!
//! A [`PitchEstimator`] produces one fundamental-frequency estimate per
//! centred frame; [`pitch_series`] converts the estimates to semitones
//! relative to the reference pitch:
//!
//! ```text
//! semitones = 12 * log2(f / A4)
//! ```
//!
//! Unvoiced frames, and estimates outside the configured search range, are
//! kept as `None` instead of being pushed through `log2`. The stability fuser
//! treats any window containing such a frame as unstable.

pub mod yin;

pub use yin::YinEstimator;

use crate::analysis::series::TimeSeries;
use crate::config::AttackConfig;
use crate::error::AttackError;

/// Frame layout and search range handed to a [`PitchEstimator`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchRequest {
    /// Lowest frequency to report, in Hz
    pub min_frequency_hz: f32,
    /// Highest frequency to report, in Hz
    pub max_frequency_hz: f32,
    /// Analysis window length in samples
    pub window_length: usize,
    /// Hop between frame centres in samples
    pub hop_length: usize,
}

impl PitchRequest {
    /// Request matching a configuration at a given sample rate
    ///
    /// The window spans three periods of the lowest searched frequency.
    pub fn from_config(config: &AttackConfig, sample_rate: u32) -> Result<Self, AttackError> {
        let window_length = (3.0 * sample_rate as f64 / config.min_frequency_hz as f64).round() as usize;
        Ok(Self {
            min_frequency_hz: config.min_frequency_hz,
            max_frequency_hz: config.max_frequency_hz,
            window_length: window_length.max(2),
            hop_length: config.hop_length(sample_rate)?,
        })
    }

    /// Whether a raw estimate falls inside the search range
    pub fn in_range(&self, frequency_hz: f32) -> bool {
        frequency_hz.is_finite()
            && frequency_hz >= self.min_frequency_hz
            && frequency_hz <= self.max_frequency_hz
    }
}

/// Fundamental frequency estimator
///
/// Implementations must return exactly `1 + samples.len() / hop_length`
/// values, frame `i` centred on sample `i * hop_length`, with `None` for
/// unvoiced frames. Estimators are shared across calibration workers, hence
/// the `Send + Sync` bound.
pub trait PitchEstimator: Send + Sync {
    /// Estimate one frequency (Hz) per frame
    fn estimate_pitch(
        &self,
        samples: &[f32],
        sample_rate: u32,
        request: &PitchRequest,
    ) -> Result<Vec<Option<f32>>, AttackError>;
}

impl<E: PitchEstimator + ?Sized> PitchEstimator for &E {
    fn estimate_pitch(
        &self,
        samples: &[f32],
        sample_rate: u32,
        request: &PitchRequest,
    ) -> Result<Vec<Option<f32>>, AttackError> {
        (**self).estimate_pitch(samples, sample_rate, request)
    }
}

/// Convert a frequency to semitones relative to `reference_hz`
///
/// Returns `None` for non-positive or non-finite frequencies.
pub fn frequency_to_semitones(frequency_hz: f32, reference_hz: f32) -> Option<f32> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return None;
    }
    Some(12.0 * (frequency_hz / reference_hz).log2())
}

/// Pitch series in semitones for a post-onset segment
///
/// # Arguments
///
/// * `samples` - Waveform from the onset onward
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Supplies search range, reference pitch and time resolution
/// * `estimator` - Frequency estimator to run
///
/// # Errors
///
/// Propagates estimator failures and invalid hop lengths.
pub fn pitch_series<E: PitchEstimator + ?Sized>(
    samples: &[f32],
    sample_rate: u32,
    config: &AttackConfig,
    estimator: &E,
) -> Result<TimeSeries<Option<f32>>, AttackError> {
    let request = PitchRequest::from_config(config, sample_rate)?;

    log::debug!(
        "Pitch tracking: {} samples at {} Hz, window={}, hop={}, range=[{:.1}, {:.1}] Hz",
        samples.len(),
        sample_rate,
        request.window_length,
        request.hop_length,
        request.min_frequency_hz,
        request.max_frequency_hz
    );

    let frequencies = estimator.estimate_pitch(samples, sample_rate, &request)?;

    let semitones: Vec<Option<f32>> = frequencies
        .iter()
        .map(|f| {
            f.filter(|&hz| request.in_range(hz))
                .and_then(|hz| frequency_to_semitones(hz, config.reference_pitch_hz))
        })
        .collect();

    let unvoiced = semitones.iter().filter(|s| s.is_none()).count();
    if unvoiced > 0 {
        log::debug!("Pitch tracking: {} of {} frames unvoiced", unvoiced, semitones.len());
    }

    Ok(TimeSeries::new(semitones, config.time_resolution_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a fixed list of frequencies regardless of input
    struct ScriptedEstimator(Vec<Option<f32>>);

    impl PitchEstimator for ScriptedEstimator {
        fn estimate_pitch(
            &self,
            _samples: &[f32],
            _sample_rate: u32,
            _request: &PitchRequest,
        ) -> Result<Vec<Option<f32>>, AttackError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_semitone_conversion() {
        assert_eq!(frequency_to_semitones(442.0, 442.0), Some(0.0));
        assert!((frequency_to_semitones(884.0, 442.0).unwrap() - 12.0).abs() < 1e-5);
        assert!((frequency_to_semitones(221.0, 442.0).unwrap() + 12.0).abs() < 1e-5);
        assert_eq!(frequency_to_semitones(0.0, 442.0), None);
        assert_eq!(frequency_to_semitones(-10.0, 442.0), None);
        assert_eq!(frequency_to_semitones(f32::NAN, 442.0), None);
    }

    #[test]
    fn test_request_window_covers_three_periods() {
        let request = PitchRequest::from_config(&AttackConfig::default(), 44100).unwrap();
        assert_eq!(request.window_length, 882);
        assert_eq!(request.hop_length, 44);
    }

    #[test]
    fn test_unvoiced_and_out_of_range_frames_are_none() {
        let estimator =
            ScriptedEstimator(vec![Some(442.0), None, Some(0.0), Some(90.0), Some(1500.0)]);
        let series =
            pitch_series(&[0.0; 10], 44100, &AttackConfig::default(), &estimator).unwrap();
        assert_eq!(series.values(), &[Some(0.0), None, None, None, None]);
        assert_eq!(series.step_ms(), 1);
    }
}
