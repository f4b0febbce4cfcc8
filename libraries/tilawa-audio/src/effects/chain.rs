//! Effect chain for the playback path
//!
//! Trait-based chaining of in-place effects. All effects operate on
//! interleaved stereo f32 samples in the [-1.0, 1.0] range.

/// Trait for audio effects that can be chained together
///
/// # Safety
/// - Must NOT allocate memory in `process()` (real-time constraint)
/// - Must be Send so the chain can live on the audio thread
pub trait AudioEffect: Send {
    /// Process an interleaved stereo buffer in place
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32);

    /// Reset effect state (e.g. on track changes)
    fn reset(&mut self);

    /// Enable/disable the effect
    fn set_enabled(&mut self, enabled: bool);

    /// Check if the effect is enabled
    fn is_enabled(&self) -> bool;

    /// Effect name (for debugging)
    fn name(&self) -> &str;
}

/// Chain of audio effects processed in order
pub struct EffectChain {
    effects: Vec<Box<dyn AudioEffect>>,
}

impl EffectChain {
    /// Create a new empty effect chain
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    /// Add an effect to the end of the chain
    pub fn add_effect(&mut self, effect: Box<dyn AudioEffect>) {
        self.effects.push(effect);
    }

    /// Process audio through the entire chain
    ///
    /// Disabled effects are skipped. Safe for real-time audio threads:
    /// no allocations after setup.
    pub fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        for effect in &mut self.effects {
            if effect.is_enabled() {
                effect.process(buffer, sample_rate);
            }
        }
    }

    /// Reset all effects in the chain
    pub fn reset(&mut self) {
        for effect in &mut self.effects {
            effect.reset();
        }
    }

    /// Number of effects in the chain
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new()
    }
}
