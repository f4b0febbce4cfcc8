//! Frequency analyser feeding the spectrum and loudness displays
//!
//! Taps the processed output signal and keeps a smoothed magnitude
//! spectrum over the most recent samples. Consumers read it as byte
//! frequency bins: each of `fft_size / 2` bins maps the bin's level in
//! dB onto 0..=255 across a fixed decibel range.

use std::collections::VecDeque;
use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};

pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;
pub const MAX_SMOOTHING: f32 = 0.99;

const MAG_EPSILON: f32 = 1.0e-12;

/// Configuration for the frequency analyser
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyserConfig {
    /// FFT window length in samples; a power of two
    pub fft_size: usize,

    /// Exponential smoothing factor applied to bin magnitudes between
    /// successive transforms (0 = none, values near 1 = very slow)
    pub smoothing: f32,

    /// Level mapped to byte value 0
    pub min_db: f32,

    /// Level mapped to byte value 255
    pub max_db: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Clamp all fields to runtime-safe values
    pub fn validate(&mut self) {
        self.fft_size = self
            .fft_size
            .next_power_of_two()
            .clamp(MIN_FFT_SIZE, MAX_FFT_SIZE);

        if !self.smoothing.is_finite() {
            self.smoothing = 0.0;
        }
        self.smoothing = self.smoothing.clamp(0.0, MAX_SMOOTHING);

        if !self.min_db.is_finite() || !self.max_db.is_finite() || self.min_db >= self.max_db {
            let defaults = Self::default();
            self.min_db = defaults.min_db;
            self.max_db = defaults.max_db;
        }
    }

    /// Returns a validated copy of this configuration
    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }
}

/// Sliding-window FFT analyser over the output signal
pub struct Analyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,

    // Most recent fft_size mono samples, oldest first
    recent: VecDeque<f32>,

    fft_buffer: Vec<Complex32>,
    smoothed: Vec<f32>,
}

impl Analyser {
    pub fn new(config: AnalyserConfig) -> Self {
        let config = config.validated();
        let fft_size = config.fft_size;

        Self {
            config,
            fft: FftPlanner::new().plan_fft_forward(fft_size),
            window: blackman_window(fft_size),
            recent: VecDeque::from(vec![0.0; fft_size]),
            fft_buffer: vec![Complex32::default(); fft_size],
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    pub fn config(&self) -> AnalyserConfig {
        self.config
    }

    /// Number of frequency bins, `fft_size / 2`
    pub fn bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    /// Feed interleaved samples from the output signal and update the
    /// smoothed spectrum
    pub fn push_samples(&mut self, samples: &[f32], channels: usize) {
        if channels == 0 || samples.is_empty() {
            return;
        }

        self.mixdown(samples, channels);
        self.transform();
    }

    /// Write the current spectrum as byte frequency bins
    ///
    /// Fills `min(out.len(), bin_count())` values; any remainder of
    /// `out` is zeroed.
    pub fn byte_frequency_bins(&self, out: &mut [u8]) {
        let range = self.config.max_db - self.config.min_db;

        for (slot, &magnitude) in out.iter_mut().zip(&self.smoothed) {
            let db = 20.0 * magnitude.max(MAG_EPSILON).log10();
            let scaled = 255.0 * (db - self.config.min_db) / range;
            *slot = scaled.clamp(0.0, 255.0) as u8;
        }

        if out.len() > self.smoothed.len() {
            for slot in &mut out[self.smoothed.len()..] {
                *slot = 0;
            }
        }
    }

    /// Clear sample history and smoothed spectrum
    pub fn reset(&mut self) {
        for sample in &mut self.recent {
            *sample = 0.0;
        }
        for magnitude in &mut self.smoothed {
            *magnitude = 0.0;
        }
    }

    fn mixdown(&mut self, samples: &[f32], channels: usize) {
        match channels {
            1 => {
                for &sample in samples {
                    self.push_mono(sample);
                }
            }
            2 => {
                for frame in samples.chunks_exact(2) {
                    self.push_mono((frame[0] + frame[1]) * 0.5);
                }
            }
            _ => {
                let inv = 1.0 / channels as f32;
                for frame in samples.chunks_exact(channels) {
                    let sum: f32 = frame.iter().copied().sum();
                    self.push_mono(sum * inv);
                }
            }
        }
    }

    #[inline]
    fn push_mono(&mut self, sample: f32) {
        self.recent.pop_front();
        self.recent.push_back(sample);
    }

    fn transform(&mut self) {
        let tau = self.config.smoothing;
        let norm = 1.0 / self.config.fft_size as f32;

        for (target, (&sample, &coeff)) in self
            .fft_buffer
            .iter_mut()
            .zip(self.recent.iter().zip(&self.window))
        {
            *target = Complex32::new(sample * coeff, 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.fft_buffer) {
            let magnitude = bin.norm() * norm;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
        }
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    let denom = (size - 1) as f32;
    (0..size)
        .map(|n| {
            let phase = 2.0 * std::f32::consts::PI * n as f32 / denom;
            0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
        })
        .collect()
}
