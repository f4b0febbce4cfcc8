//! Integration tests for the loudness feedback loop
//!
//! Drives audio through the signal path, taps it into the analyser,
//! derives RMS loudness from the byte bins, and checks the normalizer
//! controller's response end to end.

use tilawa_audio::effects::{CompressorSettings, GAIN_MAX, GAIN_MIN};
use tilawa_audio::{rms_level, Analyser, AnalyserConfig, NormalizerController, SignalPath};
use tilawa_core::NormalizerSettings;

const SAMPLE_RATE: u32 = 44100;

/// Generate a stereo sine wave at the given frequency
fn generate_sine_wave(frequency: f32, amplitude: f32, num_frames: usize) -> Vec<f32> {
    let mut buffer = Vec::with_capacity(num_frames * 2);
    for i in 0..num_frames {
        let t = i as f32 / SAMPLE_RATE as f32;
        let sample = amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin();
        buffer.push(sample);
        buffer.push(sample);
    }
    buffer
}

/// Run a signal through a fresh path and analyser, returning the RMS
/// loudness measured from the byte bins
fn measured_rms(amplitude: f32) -> f32 {
    let (mut path, _gain) = SignalPath::new(CompressorSettings::new());
    let mut analyser = Analyser::new(AnalyserConfig::default());

    // 1722 Hz concentrates energy in a single analyser bin
    let samples = generate_sine_wave(1722.0, amplitude, 1024);
    for chunk in samples.chunks(512) {
        let mut buffer = chunk.to_vec();
        path.process(&mut buffer, SAMPLE_RATE);
        analyser.push_samples(&buffer, 2);
    }

    let mut bins = vec![0u8; analyser.bin_count()];
    analyser.byte_frequency_bins(&mut bins);
    rms_level(&bins)
}

#[test]
fn louder_signals_measure_louder() {
    let quiet = measured_rms(1e-3);
    let loud = measured_rms(1.0);

    assert!(quiet > 0.0);
    assert!(loud > quiet, "loud {loud} vs quiet {quiet}");
    assert!(loud <= 1.0);
}

#[test]
fn gain_responds_inversely_to_loudness() {
    let quiet = measured_rms(1e-3);
    let loud = measured_rms(1.0);

    let gain = tilawa_audio::effects::SharedGain::new();
    let mut normalizer = NormalizerController::new(&NormalizerSettings::default(), gain);
    normalizer.set_enabled(true);
    normalizer.set_target_level(0.1);

    let gain_for_loud = normalizer.update(loud).unwrap();
    let gain_for_quiet = normalizer.update(quiet).unwrap();

    assert!(gain_for_quiet >= gain_for_loud);
    assert!((GAIN_MIN..=GAIN_MAX).contains(&gain_for_loud));
    assert!((GAIN_MIN..=GAIN_MAX).contains(&gain_for_quiet));
}

#[test]
fn closed_loop_stays_bounded() {
    let (mut path, gain) = SignalPath::new(CompressorSettings::new());
    let mut analyser = Analyser::new(AnalyserConfig::default());
    let mut normalizer = NormalizerController::new(&NormalizerSettings::default(), gain.clone());
    normalizer.set_enabled(true);

    let samples = generate_sine_wave(1722.0, 0.8, 256);
    for _ in 0..30 {
        let mut buffer = samples.clone();
        path.process(&mut buffer, SAMPLE_RATE);
        analyser.push_samples(&buffer, 2);

        let mut bins = vec![0u8; analyser.bin_count()];
        analyser.byte_frequency_bins(&mut bins);
        let rms = rms_level(&bins);
        assert!((0.0..=1.0).contains(&rms));

        let applied = normalizer.update(rms).unwrap();
        assert!(applied.is_finite());
        assert!((GAIN_MIN..=GAIN_MAX).contains(&applied));
        assert!((gain.get() - applied).abs() < f32::EPSILON);
    }
}

#[test]
fn toggling_mid_playback_resets_gain_to_unity() {
    let (mut path, gain) = SignalPath::new(CompressorSettings::new());
    let mut analyser = Analyser::new(AnalyserConfig::default());
    let mut normalizer = NormalizerController::new(&NormalizerSettings::default(), gain.clone());
    normalizer.set_enabled(true);
    normalizer.set_target_level(0.1);

    // Silence measures zero, so the controller applies exactly the
    // target
    let mut buffer = vec![0.0f32; 512];
    path.process(&mut buffer, SAMPLE_RATE);
    analyser.push_samples(&buffer, 2);
    let mut bins = vec![0u8; analyser.bin_count()];
    analyser.byte_frequency_bins(&mut bins);
    assert_eq!(normalizer.update(rms_level(&bins)), Some(0.1));

    assert!(!normalizer.toggle());
    assert!((gain.get() - 1.0).abs() < f32::EPSILON);
    assert_eq!(normalizer.update(0.5), None);
    assert!((gain.get() - 1.0).abs() < f32::EPSILON);

    assert!(normalizer.toggle());
    assert!((gain.get() - 1.0).abs() < f32::EPSILON);
}
