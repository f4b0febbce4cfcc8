//! Tilawa Audio
//!
//! Signal processing for the Tilawa player.
//!
//! This crate provides:
//! - The fixed playback signal path (compressor into a shared gain
//!   stage)
//! - A sliding-window frequency analyser with byte-bin output for the
//!   spectrum and loudness displays
//! - RMS loudness estimation over analyser bins
//! - The volume normalizer controller that closes the loop from
//!   measured loudness back to the gain stage
//!
//! # Example
//!
//! ```rust
//! use tilawa_audio::effects::CompressorSettings;
//! use tilawa_audio::{rms_level, Analyser, AnalyserConfig, NormalizerController, SignalPath};
//! use tilawa_core::NormalizerSettings;
//!
//! // Build the playback path and its analyser tap
//! let (mut path, gain) = SignalPath::new(CompressorSettings::new());
//! let mut analyser = Analyser::new(AnalyserConfig::default());
//! let mut normalizer = NormalizerController::new(&NormalizerSettings::default(), gain);
//! normalizer.set_enabled(true);
//!
//! // Audio thread: process a stereo buffer, then tap it into the analyser
//! let mut buffer = vec![0.0f32; 1024];
//! path.process(&mut buffer, 44100);
//! analyser.push_samples(&buffer, 2);
//!
//! // UI thread: read the spectrum, derive loudness, drive the gain
//! let mut bins = vec![0u8; analyser.bin_count()];
//! analyser.byte_frequency_bins(&mut bins);
//! normalizer.update(rms_level(&bins));
//! ```

mod analyser;
pub mod effects;
mod graph;
mod normalizer;
mod rms;

pub use analyser::{Analyser, AnalyserConfig};
pub use graph::SignalPath;
pub use normalizer::NormalizerController;
pub use rms::rms_level;
