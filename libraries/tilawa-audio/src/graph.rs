//! Fixed playback signal path
//!
//! Decoded audio flows through compressor then gain before it reaches
//! the output device. The analyser is not part of the path; callers tap
//! the processed buffer into it separately so the spectrum reflects
//! what is actually heard.

use crate::effects::{Compressor, CompressorSettings, EffectChain, GainStage, SharedGain};

/// The player's processing chain: compressor into gain stage
pub struct SignalPath {
    chain: EffectChain,
}

impl SignalPath {
    /// Build the path and hand back the shared gain handle that drives
    /// the gain stage
    pub fn new(compressor: CompressorSettings) -> (Self, SharedGain) {
        let gain = SharedGain::new();

        let mut chain = EffectChain::new();
        chain.add_effect(Box::new(Compressor::with_settings(compressor)));
        chain.add_effect(Box::new(GainStage::new(gain.clone())));

        (Self { chain }, gain)
    }

    /// Process an interleaved stereo buffer in place
    pub fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        self.chain.process(buffer, sample_rate);
    }

    /// Clear envelope state in every effect
    ///
    /// The path persists across track changes like the rest of the
    /// signal graph, so playback never calls this; it exists for
    /// callers that reuse one path across unrelated signals.
    pub fn reset(&mut self) {
        self.chain.reset();
    }
}
