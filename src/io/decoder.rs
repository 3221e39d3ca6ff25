//! Audio decoding using Symphonia
//!
//! Any container/codec pair enabled in Symphonia's default feature set is
//! accepted. Multichannel audio is averaged down to mono. No resampling is
//! done: the pipeline derives its hop length from the native sample rate.

use crate::error::AttackError;
use crate::io::waveform::Waveform;
use crate::preprocessing::channel_mixer::downmix_interleaved;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

fn unreadable(path: &Path, reason: impl std::fmt::Display) -> AttackError {
    AttackError::UnreadableInput(format!("{}: {}", path.display(), reason))
}

/// Decode an audio file to a mono [`Waveform`]
///
/// # Errors
///
/// Every failure (missing file, unknown format, no audio track, decoder error,
/// no samples) is reported as `AttackError::UnreadableInput`.
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<Waveform, AttackError> {
    let path = path.as_ref();
    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path).map_err(|e| unreadable(path, e))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| unreadable(path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| unreadable(path, "no supported audio tracks found"))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| unreadable(path, e))?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(unreadable(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                mono.extend(downmix_interleaved(buffer.samples(), spec.channels.count()));
            }
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping corrupt packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(unreadable(path, e)),
        }
    }

    let sample_rate = sample_rate.ok_or_else(|| unreadable(path, "unknown sample rate"))?;
    if mono.is_empty() {
        return Err(unreadable(path, "no audio samples decoded"));
    }

    log::debug!(
        "Decoded {}: {} samples at {} Hz",
        path.display(),
        mono.len(),
        sample_rate
    );

    Waveform::new(mono, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_unreadable() {
        let result = load_audio("definitely/not/here.wav");
        assert!(matches!(result, Err(AttackError::UnreadableInput(_))));
    }

    #[test]
    fn test_garbage_file_is_unreadable() {
        let path = std::env::temp_dir().join(format!(
            "attack_time_garbage_{}.wav",
            std::process::id()
        ));
        std::fs::write(&path, b"this is not a RIFF file").unwrap();
        let result = load_audio(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(AttackError::UnreadableInput(_))));
    }
}
