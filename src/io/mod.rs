//! Audio I/O modules
//!
//! The immutable [`Waveform`] handed to the pipeline, and file decoding using Symphonia.

pub mod decoder;
pub mod waveform;

pub use decoder::load_audio;
pub use waveform::Waveform;
