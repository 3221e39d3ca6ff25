//! Short-time Fourier transform producing power spectra
//!
//! Frames are centred: the signal is zero-padded by `fft_size / 2` on the
//! left and `fft_size - fft_size / 2` on the right, so frame `t` starts at
//! padded sample `t * hop_length`, is centred on signal sample
//! `t * hop_length`, and a signal of `n` samples yields `1 + n / hop_length`
//! complete frames for any frame length.

use crate::error::AttackError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Periodic Hann window of length `size`
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = 2.0 * std::f64::consts::PI * i as f64 / size as f64;
            (0.5 - 0.5 * t.cos()) as f32
        })
        .collect()
}

/// Number of centred frames for a signal length and hop
pub fn centred_frame_count(num_samples: usize, hop_length: usize) -> usize {
    1 + num_samples / hop_length
}

/// Zero-pad a signal for centred frames of `frame_length` samples
///
/// Pads `frame_length / 2` on the left and the remainder on the right, so the
/// padded signal is `samples.len() + frame_length` long.
pub fn centre_pad(samples: &[f32], frame_length: usize) -> Vec<f32> {
    let left = frame_length / 2;
    let mut padded = vec![0.0f32; samples.len() + frame_length];
    padded[left..left + samples.len()].copy_from_slice(samples);
    padded
}

/// Compute the power spectrogram (`|X|^2`) of a signal
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `fft_size` - FFT frame size; also the window length
/// * `hop_length` - Hop between frame centres, in samples
///
/// # Returns
///
/// One power spectrum of `fft_size / 2 + 1` bins per frame
///
/// # Errors
///
/// Returns `AttackError::InsufficientSignal` if the signal is shorter than one FFT frame.
pub fn power_spectrogram(
    samples: &[f32],
    fft_size: usize,
    hop_length: usize,
) -> Result<Vec<Vec<f32>>, AttackError> {
    if hop_length == 0 {
        return Err(AttackError::Configuration("Hop length must be > 0".to_string()));
    }
    if samples.len() < fft_size {
        return Err(AttackError::InsufficientSignal(format!(
            "{} samples is shorter than one {}-sample analysis frame",
            samples.len(),
            fft_size
        )));
    }

    let padded = centre_pad(samples, fft_size);
    let num_frames = centred_frame_count(samples.len(), hop_length);
    let window = hann_window(fft_size);
    let num_bins = fft_size / 2 + 1;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_size);
    let mut scratch = vec![Complex::new(0.0f32, 0.0); fft.get_inplace_scratch_len()];
    let mut buffer = vec![Complex::new(0.0f32, 0.0); fft_size];

    let mut spectra = Vec::with_capacity(num_frames);
    for t in 0..num_frames {
        let start = t * hop_length;
        let frame = &padded[start..start + fft_size];
        for ((slot, &x), &w) in buffer.iter_mut().zip(frame).zip(&window) {
            *slot = Complex::new(x * w, 0.0);
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        spectra.push(buffer[..num_bins].iter().map(|c| c.norm_sqr()).collect());
    }

    Ok(spectra)
}
