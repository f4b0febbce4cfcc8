//! Volume normalization for playback
//!
//! Drives the shared gain stage from the measured loudness of the
//! output signal: gain = target / RMS, clamped to the gain stage's
//! range. The controller holds no signal state, it only decides the
//! next gain value whenever a fresh RMS reading arrives.

use tracing::debug;

use crate::effects::{SharedGain, GAIN_MAX, GAIN_MIN};

/// Volume normalizer for playback
///
/// # Example
///
/// ```
/// use tilawa_audio::effects::SharedGain;
/// use tilawa_audio::NormalizerController;
/// use tilawa_core::NormalizerSettings;
///
/// let gain = SharedGain::new();
/// let mut normalizer = NormalizerController::new(&NormalizerSettings::default(), gain.clone());
/// normalizer.set_enabled(true);
///
/// // A quiet signal is boosted toward the target level, capped at the
/// // gain stage maximum
/// let applied = normalizer.update(0.1);
/// assert_eq!(applied, Some(4.0));
/// assert!((gain.get() - 4.0).abs() < f32::EPSILON);
/// ```
pub struct NormalizerController {
    /// Whether normalization is active
    enabled: bool,
    /// Desired RMS level in [0.0, `max_target`]
    target_level: f32,
    /// Upper bound for the target slider
    max_target: f32,
    /// Gain stage handle shared with the audio thread
    gain: SharedGain,
}

impl NormalizerController {
    /// Create a controller driving the given gain handle
    ///
    /// Starts disabled with the configured initial target. The gain is
    /// left at whatever the handle currently holds until the first
    /// update after enabling.
    pub fn new(settings: &tilawa_core::NormalizerSettings, gain: SharedGain) -> Self {
        let max_target = settings.max_target.max(0.0);
        Self {
            enabled: false,
            target_level: settings.initial_target.clamp(0.0, max_target),
            max_target,
            gain,
        }
    }

    /// Whether normalization is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current target level
    pub fn target_level(&self) -> f32 {
        self.target_level
    }

    /// Enable or disable normalization
    ///
    /// Contract carried over from the player this design recovers:
    /// switching in either direction writes unity gain. The target only
    /// takes effect again through [`update`](Self::update) calls while
    /// enabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.gain.set(1.0);
        debug!("normalizer {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Flip the enabled state, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Set the target level, clamped to [0.0, `max_target`]
    ///
    /// Only stores the value; the applied gain changes on the next
    /// update while enabled.
    pub fn set_target_level(&mut self, target: f32) {
        if !target.is_finite() {
            return;
        }
        self.target_level = target.clamp(0.0, self.max_target);
    }

    /// Recompute the gain from a fresh RMS reading
    ///
    /// Returns the gain that was applied, or `None` when disabled. A
    /// zero or non-finite reading is treated as a reference level of
    /// 1.0 so silence never produces an unbounded boost.
    pub fn update(&mut self, rms: f32) -> Option<f32> {
        if !self.enabled {
            return None;
        }

        let reference = if rms == 0.0 || !rms.is_finite() {
            1.0
        } else {
            rms
        };

        let gain = (self.target_level / reference).clamp(GAIN_MIN, GAIN_MAX);
        self.gain.set(gain);
        Some(gain)
    }
}
