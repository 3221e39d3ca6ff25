//! Audio preprocessing modules
//!
//! Utilities for preparing decoded audio for analysis:
//! - Channel mixing (interleaved multichannel to mono)

pub mod channel_mixer;
