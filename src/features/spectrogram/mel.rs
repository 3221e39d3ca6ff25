//! Mel filterbank (Slaney scale, Slaney area normalisation)
//!
//! The scale is linear below 1 kHz (200/3 Hz per mel) and logarithmic above,
//! with 27 mels per factor of 6.4. Each triangular filter is scaled by
//! `2 / (f_high - f_low)` so that filters carry equal area.

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Convert Hz to Slaney mels
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Convert Slaney mels to Hz
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// One triangular filter, stored sparsely
#[derive(Debug, Clone)]
struct MelFilter {
    first_bin: usize,
    weights: Vec<f32>,
}

/// Sparse mel filterbank applied to power spectra
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    filters: Vec<MelFilter>,
    num_fft_bins: usize,
}

impl MelFilterbank {
    /// Build `num_mels` filters spanning `0..max_hz` for an FFT of `fft_size`
    ///
    /// `max_hz` is clamped to the Nyquist frequency.
    pub fn new(num_mels: usize, fft_size: usize, sample_rate: u32, max_hz: f32) -> Self {
        let nyquist = sample_rate as f64 / 2.0;
        if max_hz as f64 > nyquist {
            log::debug!(
                "Mel upper edge {:.1} Hz above Nyquist, clamping to {:.1} Hz",
                max_hz,
                nyquist
            );
        }
        let max_hz = (max_hz as f64).min(nyquist);

        let num_fft_bins = fft_size / 2 + 1;
        let fft_freqs: Vec<f64> = (0..num_fft_bins)
            .map(|k| k as f64 * sample_rate as f64 / fft_size as f64)
            .collect();

        let max_mel = hz_to_mel(max_hz);
        let mel_points: Vec<f64> = (0..num_mels + 2)
            .map(|i| mel_to_hz(max_mel * i as f64 / (num_mels + 1) as f64))
            .collect();

        let mut filters = Vec::with_capacity(num_mels);
        let mut empty_filters = 0usize;
        for i in 0..num_mels {
            let (lower, centre, upper) = (mel_points[i], mel_points[i + 1], mel_points[i + 2]);
            let norm = 2.0 / (upper - lower);

            let dense: Vec<f64> = fft_freqs
                .iter()
                .map(|&f| {
                    let rising = (f - lower) / (centre - lower);
                    let falling = (upper - f) / (upper - centre);
                    rising.min(falling).max(0.0) * norm
                })
                .collect();

            let first = dense.iter().position(|&w| w > 0.0);
            let last = dense.iter().rposition(|&w| w > 0.0);
            let filter = match (first, last) {
                (Some(first), Some(last)) => MelFilter {
                    first_bin: first,
                    weights: dense[first..=last].iter().map(|&w| w as f32).collect(),
                },
                _ => {
                    empty_filters += 1;
                    MelFilter {
                        first_bin: 0,
                        weights: Vec::new(),
                    }
                }
            };
            filters.push(filter);
        }

        if empty_filters > 0 {
            log::warn!(
                "{} of {} mel filters are empty (fft_size={} too small for the mel resolution)",
                empty_filters,
                num_mels,
                fft_size
            );
        }

        Self {
            filters,
            num_fft_bins,
        }
    }

    /// Number of mel bins produced
    pub fn num_mels(&self) -> usize {
        self.filters.len()
    }

    /// Number of FFT bins expected in each input spectrum
    pub fn num_fft_bins(&self) -> usize {
        self.num_fft_bins
    }

    /// Project one power spectrum onto the mel bins, writing into `out`
    pub fn apply(&self, power: &[f32], out: &mut [f32]) {
        for (slot, filter) in out.iter_mut().zip(&self.filters) {
            let bins = power.iter().skip(filter.first_bin);
            *slot = filter.weights.iter().zip(bins).map(|(w, p)| w * p).sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_scale_roundtrip_and_breakpoint() {
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
        assert!((hz_to_mel(200.0) - 3.0).abs() < 1e-9);
        for hz in [50.0, 440.0, 999.0, 1000.0, 4000.0, 18000.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
    }

    #[test]
    fn test_filterbank_shape() {
        let bank = MelFilterbank::new(128, 2048, 44100, 20000.0);
        assert_eq!(bank.num_mels(), 128);
        assert_eq!(bank.num_fft_bins(), 1025);
    }

    #[test]
    fn test_single_bin_maps_to_few_mels() {
        let bank = MelFilterbank::new(40, 512, 16000, 8000.0);
        let mut power = vec![0.0f32; bank.num_fft_bins()];
        power[64] = 1.0;
        let mut out = vec![0.0f32; bank.num_mels()];
        bank.apply(&power, &mut out);
        let active = out.iter().filter(|&&v| v > 0.0).count();
        assert!((1..=2).contains(&active), "active mel bins: {}", active);
        assert!(out.iter().all(|&v| v >= 0.0));
    }
}
