//! YIN fundamental frequency estimator
//!
//! Frames are centred like the spectrogram's: the segment is zero-padded by
//! half a window on each side (the extra sample of an odd window goes on the
//! right), so frame `i` is centred on sample `i * hop_length`. Each frame is
//! handed to the FFT-based YIN detector from the `pitch-detection` crate.
//!
//! # Reference
//!
//! de Cheveigné, A., & Kawahara, H. (2002). YIN, a fundamental frequency estimator
//! for speech and music. *The Journal of the Acoustical Society of America*, 111(4), 1917-1930.

use super::{PitchEstimator, PitchRequest};
use crate::error::AttackError;
use crate::features::spectrogram::stft::{centre_pad, centred_frame_count};
use pitch_detection::detector::yin::YINDetector;
use pitch_detection::detector::PitchDetector;

/// YIN estimator settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YinEstimator {
    /// Frames whose sum of squares falls below this are unvoiced (default: 1e-4)
    pub power_threshold: f32,

    /// Minimum clarity, i.e. `1 - YIN threshold` (default: 0.8)
    pub clarity_threshold: f32,
}

impl Default for YinEstimator {
    fn default() -> Self {
        Self {
            power_threshold: 1e-4,
            clarity_threshold: 0.8,
        }
    }
}

impl PitchEstimator for YinEstimator {
    fn estimate_pitch(
        &self,
        samples: &[f32],
        sample_rate: u32,
        request: &PitchRequest,
    ) -> Result<Vec<Option<f32>>, AttackError> {
        if request.hop_length == 0 || request.window_length < 2 {
            return Err(AttackError::Configuration(format!(
                "Invalid pitch frame layout: window={}, hop={}",
                request.window_length, request.hop_length
            )));
        }

        let window = request.window_length;
        let padded = centre_pad(samples, window);
        let num_frames = centred_frame_count(samples.len(), request.hop_length);
        let mut detector = YINDetector::<f32>::new(window, window / 2);

        let mut frequencies = Vec::with_capacity(num_frames);
        for i in 0..num_frames {
            let start = i * request.hop_length;
            let frequency = padded.get(start..start + window).and_then(|frame| {
                detector
                    .get_pitch(
                        frame,
                        sample_rate as usize,
                        self.power_threshold,
                        self.clarity_threshold,
                    )
                    .map(|pitch| pitch.frequency)
            });
            frequencies.push(frequency);
        }

        Ok(frequencies)
    }
}
