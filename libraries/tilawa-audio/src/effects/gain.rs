//! Gain stage with a shared, atomically updated level
//!
//! The normalizer controller runs on the UI thread while the gain is
//! applied on the audio callback. [`SharedGain`] carries the level
//! between them as f32 bits in an atomic, so neither side ever blocks.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::chain::AudioEffect;

/// Lowest allowed gain (mute)
pub const GAIN_MIN: f32 = 0.0;

/// Highest allowed gain (+12 dB)
pub const GAIN_MAX: f32 = 4.0;

/// Gain level shared between control and audio threads
///
/// Cloning yields another handle to the same level.
#[derive(Debug, Clone)]
pub struct SharedGain {
    bits: Arc<AtomicU32>,
}

impl SharedGain {
    /// Create a new level at unity gain
    pub fn new() -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(1.0f32.to_bits())),
        }
    }

    /// Current gain
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Set the gain, clamped to [`GAIN_MIN`]..=[`GAIN_MAX`]
    ///
    /// Non-finite values are ignored and leave the level unchanged.
    pub fn set(&self, gain: f32) {
        if !gain.is_finite() {
            return;
        }
        let clamped = gain.clamp(GAIN_MIN, GAIN_MAX);
        self.bits.store(clamped.to_bits(), Ordering::Relaxed);
    }
}

impl Default for SharedGain {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a [`SharedGain`] level to the signal
pub struct GainStage {
    gain: SharedGain,
    enabled: bool,
}

impl GainStage {
    /// Create a gain stage driven by the given shared level
    pub fn new(gain: SharedGain) -> Self {
        Self {
            gain,
            enabled: true,
        }
    }
}

impl AudioEffect for GainStage {
    fn process(&mut self, buffer: &mut [f32], _sample_rate: u32) {
        if !self.enabled {
            return;
        }

        let gain = self.gain.get();
        if (gain - 1.0).abs() < 1e-6 {
            return;
        }

        for sample in buffer.iter_mut() {
            *sample *= gain;
        }
    }

    fn reset(&mut self) {
        // The level belongs to the controller and outlives track
        // changes, nothing to clear here.
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "Gain"
    }
}
