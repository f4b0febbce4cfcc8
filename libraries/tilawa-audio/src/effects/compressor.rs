//! Dynamic range compressor
//!
//! First stage of the playback path. The player runs it with one fixed
//! parameter set that evens out recitation levels before the gain stage:
//! a low threshold, a very wide soft knee, and a high ratio.

use super::chain::AudioEffect;

/// Compressor settings
#[derive(Debug, Clone, Copy)]
pub struct CompressorSettings {
    /// Threshold in dB (-100 to 0); levels above it are compressed
    pub threshold_db: f32,

    /// Knee width in dB (0 to 40); softens the transition at the
    /// threshold
    pub knee_db: f32,

    /// Compression ratio (1.0 to 20.0)
    pub ratio: f32,

    /// Attack time in milliseconds (0 to 1000); zero applies gain
    /// reduction instantly
    pub attack_ms: f32,

    /// Release time in milliseconds (1 to 1000)
    pub release_ms: f32,
}

impl CompressorSettings {
    /// The player's fixed front-of-chain settings
    /// - Threshold: -50 dB
    /// - Knee: 40 dB
    /// - Ratio: 12:1
    /// - Attack: instant
    /// - Release: 250 ms
    pub fn new() -> Self {
        Self {
            threshold_db: -50.0,
            knee_db: 40.0,
            ratio: 12.0,
            attack_ms: 0.0,
            release_ms: 250.0,
        }
    }

    /// Validate and clamp settings to safe ranges
    pub fn validate(&mut self) {
        self.threshold_db = self.threshold_db.clamp(-100.0, 0.0);
        self.knee_db = self.knee_db.clamp(0.0, 40.0);
        self.ratio = self.ratio.clamp(1.0, 20.0);
        self.attack_ms = self.attack_ms.clamp(0.0, 1000.0);
        self.release_ms = self.release_ms.clamp(1.0, 1000.0);
    }
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self::new()
    }
}

const NOISE_FLOOR_DB: f32 = -120.0;

/// Dynamic range compressor
///
/// Two-stage design: a peak level detector with instant attack and a
/// fixed slow release holds the signal level steady across waveform
/// cycles, and a separate gain-reduction smoother applies the
/// configured attack/release timing on top of it.
pub struct Compressor {
    settings: CompressorSettings,
    enabled: bool,

    // Peak level detector, in dB
    level_db: f32,

    // Smoothed gain reduction, in dB (0 or negative)
    gain_reduction_db: f32,

    // Coefficient cache
    level_release_coeff: f32,
    attack_coeff: f32,
    release_coeff: f32,

    sample_rate: u32,
    needs_update: bool,
}

impl Compressor {
    /// Create a compressor with the player's fixed settings
    pub fn new() -> Self {
        Self::with_settings(CompressorSettings::new())
    }

    /// Create a compressor with specific settings
    pub fn with_settings(mut settings: CompressorSettings) -> Self {
        settings.validate();
        let mut compressor = Self {
            settings,
            enabled: true,
            level_db: NOISE_FLOOR_DB,
            gain_reduction_db: 0.0,
            level_release_coeff: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate: 44100,
            needs_update: true,
        };
        compressor.update_coefficients();
        compressor
    }

    /// Current settings
    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }

    fn update_coefficients(&mut self) {
        if !self.needs_update {
            return;
        }

        let sr = self.sample_rate as f32;

        // The peak detector releases over a fixed 50 ms so the measured
        // level stays stable within each waveform cycle.
        let level_release_samples = 50.0 * sr / 1000.0;
        self.level_release_coeff = (-1.0 / level_release_samples).exp();

        // coeff = exp(-1 / (time_ms * sr / 1000)); a zero attack gives
        // -inf inside exp and therefore an exact instant coefficient.
        let attack_samples = self.settings.attack_ms * sr / 1000.0;
        let release_samples = self.settings.release_ms * sr / 1000.0;
        self.attack_coeff = (-1.0 / attack_samples).exp();
        self.release_coeff = (-1.0 / release_samples).exp();

        self.needs_update = false;
    }

    /// Static compression curve: output level in dB for an input level
    /// in dB, with a quadratic soft-knee region around the threshold
    #[inline]
    fn output_level_db(&self, input_db: f32) -> f32 {
        let threshold = self.settings.threshold_db;
        let ratio = self.settings.ratio;
        let knee = self.settings.knee_db;

        if knee <= 0.0 {
            if input_db <= threshold {
                input_db
            } else {
                threshold + (input_db - threshold) / ratio
            }
        } else {
            let knee_start = threshold - knee / 2.0;
            let knee_end = threshold + knee / 2.0;

            if input_db <= knee_start {
                input_db
            } else if input_db >= knee_end {
                threshold + (input_db - threshold) / ratio
            } else {
                let x = input_db - knee_start;
                let slope_change = (1.0 - 1.0 / ratio) / (2.0 * knee);
                input_db - slope_change * x * x
            }
        }
    }

    #[inline]
    fn update_level(&mut self, input_db: f32) {
        if input_db > self.level_db {
            // Instant attack, peaks are captured immediately
            self.level_db = input_db;
        } else {
            // Decay toward the noise floor, not the input, which can be
            // -inf at zero crossings
            self.level_db =
                self.level_release_coeff * (self.level_db - NOISE_FLOOR_DB) + NOISE_FLOOR_DB;
        }
    }

    #[inline]
    fn smooth_gain_reduction(&mut self, target_db: f32) {
        // More negative target means we are attacking into compression
        let coeff = if target_db < self.gain_reduction_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.gain_reduction_db = coeff * self.gain_reduction_db + (1.0 - coeff) * target_db;
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEffect for Compressor {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        if !self.enabled {
            return;
        }

        if self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            self.needs_update = true;
        }
        self.update_coefficients();

        // Linked stereo: detect on the louder channel, apply the same
        // gain to both so the stereo image is preserved
        for frame in buffer.chunks_exact_mut(2) {
            let peak = frame[0].abs().max(frame[1].abs());
            let input_db = if peak > 1e-10 {
                20.0 * peak.log10()
            } else {
                -200.0
            };

            self.update_level(input_db);
            let target_db = self.output_level_db(self.level_db) - self.level_db;
            self.smooth_gain_reduction(target_db);

            let gain = 10.0_f32.powf(self.gain_reduction_db / 20.0);
            frame[0] *= gain;
            frame[1] *= gain;
        }
    }

    fn reset(&mut self) {
        self.level_db = NOISE_FLOOR_DB;
        self.gain_reduction_db = 0.0;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "Compressor"
    }
}
