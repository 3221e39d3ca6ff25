//! Attack estimator
//!
//! Composes the pipeline for one recording:
//!
//! ```text
//! waveform → spectrogram → onset → { peakiness, pitch } → stability fusion
//! ```
//!
//! Every stage returns a `Result`; an `AttackClarity` failure from onset
//! detection or fusion is passed to the caller unchanged.

use crate::analysis::result::{AttackAnalysis, AttackResult};
use crate::analysis::series::TimeSeries;
use crate::analysis::stability::{find_attack_end, StabilityParams};
use crate::config::AttackConfig;
use crate::error::AttackError;
use crate::features::onset::{detect_onset, Onset};
use crate::features::peakiness::peakiness_series;
use crate::features::pitch::{pitch_series, PitchEstimator, YinEstimator};
use crate::features::spectrogram::{build_spectrogram, Spectrogram};
use crate::io::waveform::Waveform;
use std::path::Path;

/// Attack estimator with a validated configuration
///
/// Estimation is pure and deterministic: the same waveform and configuration
/// always give the same result. The estimator holds no mutable state and can
/// be shared across threads.
#[derive(Debug, Clone)]
pub struct AttackEstimator<E: PitchEstimator = YinEstimator> {
    config: AttackConfig,
    pitch_estimator: E,
}

impl AttackEstimator<YinEstimator> {
    /// Create an estimator using the default YIN pitch tracker
    ///
    /// # Errors
    ///
    /// Returns `AttackError::Configuration` if the configuration is invalid.
    pub fn new(config: AttackConfig) -> Result<Self, AttackError> {
        Self::with_pitch_estimator(config, YinEstimator::default())
    }
}

impl<E: PitchEstimator> AttackEstimator<E> {
    /// Create an estimator with a custom pitch tracker
    ///
    /// # Errors
    ///
    /// Returns `AttackError::Configuration` if the configuration is invalid.
    pub fn with_pitch_estimator(config: AttackConfig, pitch_estimator: E) -> Result<Self, AttackError> {
        config.validate()?;
        Ok(Self {
            config,
            pitch_estimator,
        })
    }

    /// The validated configuration
    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    /// Estimate the attack of a waveform
    ///
    /// # Errors
    ///
    /// - `AttackClarity` if no onset is found or the attack never stabilises
    /// - `InsufficientSignal` if the waveform is shorter than one frame
    /// - `InvalidInput` if the waveform exceeds `max_duration_ms`
    pub fn estimate(&self, waveform: &Waveform) -> Result<AttackResult, AttackError> {
        self.analyze(waveform).map(|analysis| analysis.result)
    }

    /// Decode a file and estimate its attack
    ///
    /// # Errors
    ///
    /// As [`estimate`](Self::estimate), plus `UnreadableInput` if decoding fails.
    pub fn estimate_file<P: AsRef<Path>>(&self, path: P) -> Result<AttackResult, AttackError> {
        let waveform = Waveform::from_file(path)?;
        self.estimate(&waveform)
    }

    /// Estimate the attack and return pipeline diagnostics
    pub fn analyze(&self, waveform: &Waveform) -> Result<AttackAnalysis, AttackError> {
        let spectrogram = self.spectrogram(waveform)?;
        self.analyze_with_spectrogram(waveform, &spectrogram)
    }

    /// Build the spectrogram this estimator would use for `waveform`
    ///
    /// Only the time resolution, FFT size and mel settings affect it, so a
    /// caller sweeping other parameters can build it once and reuse it with
    /// [`analyze_with_spectrogram`](Self::analyze_with_spectrogram).
    pub fn spectrogram(&self, waveform: &Waveform) -> Result<Spectrogram, AttackError> {
        if waveform.duration_ms() > self.config.max_duration_ms as f64 {
            return Err(AttackError::InvalidInput(format!(
                "Recording is {:.0} ms long, limit is {} ms",
                waveform.duration_ms(),
                self.config.max_duration_ms
            )));
        }
        build_spectrogram(waveform.samples(), waveform.sample_rate(), &self.config)
    }

    /// Estimate the attack from a precomputed spectrogram of `waveform`
    ///
    /// # Errors
    ///
    /// Returns `AttackError::InvalidInput` if the spectrogram was built with a
    /// different time resolution or hop length, otherwise as
    /// [`estimate`](Self::estimate).
    pub fn analyze_with_spectrogram(
        &self,
        waveform: &Waveform,
        spectrogram: &Spectrogram,
    ) -> Result<AttackAnalysis, AttackError> {
        self.check_spectrogram(waveform, spectrogram)?;
        let onset = self.onset(spectrogram)?;
        let pitch = self.pitch_after_onset(waveform, onset.frame)?;
        self.analyze_with_pitch(spectrogram, &onset, pitch)
    }

    /// Locate the onset in a spectrogram using the configured energy ratio
    pub fn onset(&self, spectrogram: &Spectrogram) -> Result<Onset, AttackError> {
        detect_onset(spectrogram, self.config.onset_energy_ratio)
    }

    /// Track pitch over `waveform` from spectrogram frame `onset_frame` on
    ///
    /// Depends only on the onset frame, the pitch range, the reference pitch
    /// and the time resolution. Callers varying the other parameters can
    /// compute it once per onset frame and pass it to
    /// [`analyze_with_pitch`](Self::analyze_with_pitch).
    pub fn pitch_after_onset(
        &self,
        waveform: &Waveform,
        onset_frame: usize,
    ) -> Result<TimeSeries<Option<f32>>, AttackError> {
        let hop_length = self.config.hop_length(waveform.sample_rate())?;
        let segment = waveform.samples_from(onset_frame * hop_length);
        pitch_series(
            segment,
            waveform.sample_rate(),
            &self.config,
            &self.pitch_estimator,
        )
    }

    /// Fuse peakiness from `spectrogram` with a precomputed pitch series
    ///
    /// `pitch` must start at `onset` and use the configured time resolution.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the spectrogram or pitch series use another time resolution
    /// - `AttackClarity` if the attack never stabilises
    pub fn analyze_with_pitch(
        &self,
        spectrogram: &Spectrogram,
        onset: &Onset,
        pitch: TimeSeries<Option<f32>>,
    ) -> Result<AttackAnalysis, AttackError> {
        if spectrogram.time_resolution_ms() != self.config.time_resolution_ms {
            return Err(AttackError::InvalidInput(format!(
                "Spectrogram resolution {} ms does not match configuration {} ms",
                spectrogram.time_resolution_ms(),
                self.config.time_resolution_ms
            )));
        }

        let peakiness = peakiness_series(spectrogram, onset.frame, self.config.peak_count);

        let silent_frames = peakiness.values().iter().filter(|v| v.is_none()).count();
        let unvoiced_frames = pitch.values().iter().filter(|v| v.is_none()).count();
        let analysed_frames = peakiness.len().min(pitch.len());

        let boundary = find_attack_end(peakiness, pitch, &StabilityParams::from_config(&self.config))?;

        let result = AttackResult {
            start_ms: onset.time_ms,
            duration_ms: boundary.offset_ms,
        };

        log::debug!(
            "Attack: start={} ms, duration={} ms (onset frame {}, end index {})",
            result.start_ms,
            result.duration_ms,
            onset.frame,
            boundary.index
        );

        Ok(AttackAnalysis {
            result,
            onset_frame: onset.frame,
            analysed_frames,
            truncated_frames: boundary.truncated_frames,
            unvoiced_frames,
            silent_frames,
        })
    }

    /// Check that `spectrogram` was built with this estimator's frame layout
    pub fn check_spectrogram(
        &self,
        waveform: &Waveform,
        spectrogram: &Spectrogram,
    ) -> Result<(), AttackError> {
        let hop_length = self.config.hop_length(waveform.sample_rate())?;
        if spectrogram.time_resolution_ms() != self.config.time_resolution_ms
            || spectrogram.hop_length() != hop_length
        {
            return Err(AttackError::InvalidInput(format!(
                "Spectrogram resolution {} ms / hop {} does not match configuration {} ms / hop {}",
                spectrogram.time_resolution_ms(),
                spectrogram.hop_length(),
                self.config.time_resolution_ms,
                hop_length
            )));
        }
        Ok(())
    }
}

/// Estimate the attack of a mono recording
///
/// Validates `config` on every call; build an [`AttackEstimator`] once when
/// processing many recordings.
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Estimation parameters
///
/// # Returns
///
/// `AttackResult` with the onset time and the attack duration from that onset
///
/// # Errors
///
/// - `Configuration` if `config` is invalid
/// - `InvalidInput` if `samples` is empty or `sample_rate` is 0
/// - `InsufficientSignal` if the recording is shorter than one FFT frame
/// - `AttackClarity` if no onset is found or the attack never stabilises
///
/// # Example
///
/// ```
/// use attack_time::{estimate_attack, AttackConfig, AttackError};
///
/// let silence = vec![0.0f32; 44100];
/// let result = estimate_attack(&silence, 44100, &AttackConfig::default());
/// assert!(matches!(result, Err(AttackError::AttackClarity(_))));
/// ```
pub fn estimate_attack(
    samples: &[f32],
    sample_rate: u32,
    config: &AttackConfig,
) -> Result<AttackResult, AttackError> {
    log::debug!("Starting attack estimation: {} samples at {} Hz", samples.len(), sample_rate);

    let estimator = AttackEstimator::new(config.clone())?;
    let waveform = Waveform::new(samples.to_vec(), sample_rate)?;
    estimator.estimate(&waveform)
}

/// Decode an audio file and estimate its attack
///
/// # Errors
///
/// As [`estimate_attack`], plus `UnreadableInput` if the file cannot be decoded.
pub fn estimate_attack_from_file<P: AsRef<Path>>(
    path: P,
    config: &AttackConfig,
) -> Result<AttackResult, AttackError> {
    let estimator = AttackEstimator::new(config.clone())?;
    estimator.estimate_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::pitch::PitchRequest;

    /// Reports a constant frequency for every frame
    struct ConstantPitch(f32);

    impl PitchEstimator for ConstantPitch {
        fn estimate_pitch(
            &self,
            samples: &[f32],
            _sample_rate: u32,
            request: &PitchRequest,
        ) -> Result<Vec<Option<f32>>, AttackError> {
            Ok(vec![Some(self.0); 1 + samples.len() / request.hop_length])
        }
    }

    fn tone(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = AttackConfig {
            peak_count: 0,
            ..AttackConfig::default()
        };
        assert!(matches!(
            AttackEstimator::new(config),
            Err(AttackError::Configuration(_))
        ));
    }

    #[test]
    fn test_silence_is_clarity_error() {
        let estimator = AttackEstimator::with_pitch_estimator(
            AttackConfig::default(),
            ConstantPitch(442.0),
        )
        .unwrap();
        let waveform = Waveform::new(vec![0.0; 44100], 44100).unwrap();
        assert!(matches!(
            estimator.estimate(&waveform),
            Err(AttackError::AttackClarity(_))
        ));
    }

    #[test]
    fn test_delayed_tone_onset() {
        let estimator = AttackEstimator::with_pitch_estimator(
            AttackConfig::default(),
            ConstantPitch(442.0),
        )
        .unwrap();
        let mut samples = vec![0.0f32; 22050];
        samples.extend(tone(442.0, 44100, 1.0));
        let waveform = Waveform::new(samples, 44100).unwrap();

        let analysis = estimator.analyze(&waveform).unwrap();
        // Tone starts at 500 ms; centred frames see it half a window early
        assert!(
            analysis.result.start_ms >= 470 && analysis.result.start_ms <= 505,
            "start {} ms",
            analysis.result.start_ms
        );
        assert!(analysis.result.duration_ms < 100);
        assert_eq!(analysis.unvoiced_frames, 0);
    }

    #[test]
    fn test_too_long_recording_rejected() {
        let config = AttackConfig {
            max_duration_ms: 100,
            ..AttackConfig::default()
        };
        let estimator = AttackEstimator::with_pitch_estimator(config, ConstantPitch(442.0)).unwrap();
        let waveform = Waveform::new(tone(442.0, 44100, 0.5), 44100).unwrap();
        assert!(matches!(
            estimator.estimate(&waveform),
            Err(AttackError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_staged_analysis_matches_single_call() {
        let estimator = AttackEstimator::with_pitch_estimator(
            AttackConfig::default(),
            ConstantPitch(442.0),
        )
        .unwrap();
        let mut samples = vec![0.0f32; 4410];
        samples.extend(tone(442.0, 44100, 0.5));
        let waveform = Waveform::new(samples, 44100).unwrap();
        let spectrogram = estimator.spectrogram(&waveform).unwrap();

        let onset = estimator.onset(&spectrogram).unwrap();
        let pitch = estimator.pitch_after_onset(&waveform, onset.frame).unwrap();
        let staged = estimator.analyze_with_pitch(&spectrogram, &onset, pitch).unwrap();

        assert_eq!(staged, estimator.analyze(&waveform).unwrap());
    }

    #[test]
    fn test_pitch_with_other_step_rejected() {
        let estimator = AttackEstimator::with_pitch_estimator(
            AttackConfig::default(),
            ConstantPitch(442.0),
        )
        .unwrap();
        let waveform = Waveform::new(tone(442.0, 44100, 0.5), 44100).unwrap();
        let spectrogram = estimator.spectrogram(&waveform).unwrap();
        let onset = estimator.onset(&spectrogram).unwrap();
        let pitch = TimeSeries::new(vec![Some(0.0f32); 100], 2);
        assert!(matches!(
            estimator.analyze_with_pitch(&spectrogram, &onset, pitch),
            Err(AttackError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_mismatched_spectrogram_rejected() {
        let estimator = AttackEstimator::with_pitch_estimator(
            AttackConfig::default(),
            ConstantPitch(442.0),
        )
        .unwrap();
        let waveform = Waveform::new(tone(442.0, 44100, 0.5), 44100).unwrap();
        let coarse = AttackConfig {
            time_resolution_ms: 2,
            ..AttackConfig::default()
        };
        let spectrogram = build_spectrogram(waveform.samples(), 44100, &coarse).unwrap();
        assert!(matches!(
            estimator.analyze_with_spectrogram(&waveform, &spectrogram),
            Err(AttackError::InvalidInput(_))
        ));
    }
}
