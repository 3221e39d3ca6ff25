//! Channel mixing utilities (multichannel to mono conversion)

/// Average interleaved multichannel samples down to mono
///
/// # Arguments
///
/// * `interleaved` - Samples laid out frame by frame (`L R L R ...` for stereo)
/// * `channels` - Channel count; 0 and 1 return the input unchanged
///
/// # Returns
///
/// One sample per frame. A trailing partial frame is dropped.
pub fn downmix_interleaved(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
