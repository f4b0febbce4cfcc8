//! Audio effects processing
//!
//! Trait-based effect chain for real-time audio. All effects operate on
//! interleaved stereo f32 samples in [-1.0, 1.0] range.
//!
//! Available effects:
//! - **Compressor**: dynamic range compressor, fixed front of the chain
//! - **GainStage**: normalizer gain, shared with the control thread

mod chain;
mod compressor;
mod gain;

pub use chain::{AudioEffect, EffectChain};
pub use compressor::{Compressor, CompressorSettings};
pub use gain::{GainStage, SharedGain, GAIN_MAX, GAIN_MIN};
