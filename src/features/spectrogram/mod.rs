//! Spectrogram builder
//!
//! Turns PCM samples into a time-by-frequency mel energy grid. The hop length
//! is derived from the configured time resolution, so column `t` sits at
//! `t * time_resolution_ms` milliseconds.
//!
//! # Example
//!
//! ```no_run
//! use attack_time::features::spectrogram::build_spectrogram;
//! use attack_time::AttackConfig;
//!
//! let samples = vec![0.0f32; 44100];
//! let spectrogram = build_spectrogram(&samples, 44100, &AttackConfig::default())?;
//! println!("{} frames x {} bins", spectrogram.num_frames(), spectrogram.num_bins());
//! # Ok::<(), attack_time::AttackError>(())
//! ```

pub mod mel;
pub mod stft;

use crate::config::AttackConfig;
use crate::error::AttackError;
use mel::MelFilterbank;

/// Mel energy grid, stored frame by frame
///
/// Derived once per waveform and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Frame-major energies: `data[t * num_bins + b]`
    data: Vec<f32>,
    num_bins: usize,
    num_frames: usize,
    hop_length: usize,
    time_resolution_ms: u32,
}

impl Spectrogram {
    /// Assemble a spectrogram from per-frame energy columns
    ///
    /// # Errors
    ///
    /// Returns `AttackError::InsufficientSignal` if there are no frames and
    /// `AttackError::InvalidInput` if the columns have different lengths.
    pub fn from_frames(
        frames: Vec<Vec<f32>>,
        hop_length: usize,
        time_resolution_ms: u32,
    ) -> Result<Self, AttackError> {
        let num_frames = frames.len();
        let num_bins = frames.first().map(Vec::len).ok_or_else(|| {
            AttackError::InsufficientSignal("Spectrogram has no frames".to_string())
        })?;
        if num_bins == 0 || frames.iter().any(|f| f.len() != num_bins) {
            return Err(AttackError::InvalidInput(
                "Spectrogram frames must all have the same, non-zero number of bins".to_string(),
            ));
        }

        Ok(Self {
            data: frames.into_iter().flatten().collect(),
            num_bins,
            num_frames,
            hop_length,
            time_resolution_ms,
        })
    }

    /// Number of frequency bins (rows)
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Number of time frames (columns)
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Hop between frames in samples
    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Time step between frames in milliseconds
    pub fn time_resolution_ms(&self) -> u32 {
        self.time_resolution_ms
    }

    /// Energies of frame `t` across all bins
    ///
    /// # Panics
    ///
    /// Panics if `t >= num_frames()`.
    pub fn frame(&self, t: usize) -> &[f32] {
        &self.data[t * self.num_bins..(t + 1) * self.num_bins]
    }

    /// Iterate frames from `start` to the end
    pub fn frames_from(&self, start: usize) -> impl Iterator<Item = &[f32]> + '_ {
        let start = start.min(self.num_frames) * self.num_bins;
        self.data[start..].chunks_exact(self.num_bins)
    }

    /// Sum of energy across bins for every frame
    pub fn frame_energies(&self) -> Vec<f32> {
        self.data
            .chunks_exact(self.num_bins)
            .map(|frame| frame.iter().sum())
            .collect()
    }
}

/// Build a mel spectrogram for a mono signal
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Supplies time resolution, FFT size, bin count and upper cutoff
///
/// # Errors
///
/// Returns `AttackError::Configuration` if the time resolution is below one
/// sample, and `AttackError::InsufficientSignal` if the signal is shorter than
/// one FFT frame.
pub fn build_spectrogram(
    samples: &[f32],
    sample_rate: u32,
    config: &AttackConfig,
) -> Result<Spectrogram, AttackError> {
    let hop_length = config.hop_length(sample_rate)?;

    log::debug!(
        "Building mel spectrogram: {} samples at {} Hz, fft={}, hop={}, mels={}",
        samples.len(),
        sample_rate,
        config.fft_size,
        hop_length,
        config.mel_bins
    );

    let power = stft::power_spectrogram(samples, config.fft_size, hop_length)?;
    let filterbank = MelFilterbank::new(
        config.mel_bins,
        config.fft_size,
        sample_rate,
        config.mel_max_frequency_hz,
    );

    let frames: Vec<Vec<f32>> = power
        .iter()
        .map(|spectrum| {
            let mut mel = vec![0.0f32; filterbank.num_mels()];
            filterbank.apply(spectrum, &mut mel);
            mel
        })
        .collect();

    Spectrogram::from_frames(frames, hop_length, config.time_resolution_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_spectrogram_dimensions() {
        let samples = tone(440.0, 44100, 0.5);
        let spectrogram = build_spectrogram(&samples, 44100, &AttackConfig::default()).unwrap();
        assert_eq!(spectrogram.num_bins(), 128);
        assert_eq!(spectrogram.num_frames(), 1 + samples.len() / 44);
        assert_eq!(spectrogram.hop_length(), 44);
        assert_eq!(spectrogram.frame_energies().len(), spectrogram.num_frames());
    }

    #[test]
    fn test_silence_has_zero_energy() {
        let samples = vec![0.0f32; 8192];
        let spectrogram = build_spectrogram(&samples, 44100, &AttackConfig::default()).unwrap();
        assert!(spectrogram.frame_energies().iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_frames_from_skips_leading_frames() {
        let frames = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let spectrogram = Spectrogram::from_frames(frames, 44, 1).unwrap();
        let tail: Vec<&[f32]> = spectrogram.frames_from(1).collect();
        assert_eq!(tail, vec![&[3.0, 4.0][..], &[5.0, 6.0][..]]);
        assert_eq!(spectrogram.frames_from(10).count(), 0);
        assert_eq!(spectrogram.frame(2), &[5.0, 6.0]);
    }

    #[test]
    fn test_ragged_frames_rejected() {
        let frames = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(Spectrogram::from_frames(frames, 44, 1).is_err());
        assert!(matches!(
            Spectrogram::from_frames(vec![], 44, 1),
            Err(AttackError::InsufficientSignal(_))
        ));
    }

    #[test]
    fn test_short_signal_is_insufficient() {
        let samples = vec![0.5f32; 1000];
        assert!(matches!(
            build_spectrogram(&samples, 44100, &AttackConfig::default()),
            Err(AttackError::InsufficientSignal(_))
        ));
    }
}
