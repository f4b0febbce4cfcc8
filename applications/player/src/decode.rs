//! Track decoding
//!
//! Loads a whole track into memory as interleaved stereo f32 at the
//! output device's sample rate. Recitation files are short, so decoding
//! up front keeps the audio callback to a buffer copy.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode a track file into interleaved stereo samples at `target_rate`
pub fn load_track(path: &Path, target_rate: u32) -> Result<Vec<f32>> {
    let (samples, channels, source_rate) = decode_file(path)?;
    let stereo = to_stereo(&samples, channels);
    Ok(resample_linear(&stereo, source_rate, target_rate))
}

/// Decode a file into interleaved f32 samples in its native layout
fn decode_file(path: &Path) -> Result<(Vec<f32>, usize, u32)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .with_context(|| format!("failed to probe {}", path.display()))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| anyhow!("no audio tracks in {}", path.display()))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("failed to create decoder")?;

    let mut samples = Vec::new();
    let mut channels = 0usize;
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(anyhow!("error reading packet: {e}")),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frames are skipped, the remainder still plays
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                tracing::warn!("skipping undecodable frame: {e}");
                continue;
            }
            Err(e) => return Err(anyhow!("decode error: {e}")),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            channels = spec.channels.count();
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(buf) = &mut sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() || channels == 0 {
        return Err(anyhow!("no decodable audio in {}", path.display()));
    }

    Ok((samples, channels, sample_rate))
}

/// Fold an interleaved buffer with any channel layout into stereo
fn to_stereo(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => samples.to_vec(),
        n => {
            let inv = 1.0 / n as f32;
            samples
                .chunks_exact(n)
                .flat_map(|frame| {
                    let mixed = frame.iter().sum::<f32>() * inv;
                    [mixed, mixed]
                })
                .collect()
        }
    }
}

/// Linear interpolation between sample rates over interleaved stereo
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    let frames = samples.len() / 2;
    if from_rate == to_rate || frames == 0 {
        return samples.to_vec();
    }

    let out_frames = ((frames as u64 * u64::from(to_rate)) / u64::from(from_rate)) as usize;
    let step = f64::from(from_rate) / f64::from(to_rate);

    let mut out = Vec::with_capacity(out_frames * 2);
    for i in 0..out_frames {
        let pos = i as f64 * step;
        let base = (pos as usize).min(frames - 1);
        let next = (base + 1).min(frames - 1);
        let frac = (pos - base as f64) as f32;

        for channel in 0..2 {
            let a = samples[base * 2 + channel];
            let b = samples[next * 2 + channel];
            out.push(a + (b - a) * frac);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_returns_error() {
        let result = load_track(Path::new("/nonexistent/tiktokQuran1.mp3"), 44100);
        assert!(result.is_err());
    }

    #[test]
    fn garbage_file_returns_error() {
        let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        file.write_all(b"not an mp3 at all").unwrap();

        let result = load_track(file.path(), 44100);
        assert!(result.is_err());
    }

    #[test]
    fn mono_is_duplicated_to_both_channels() {
        let stereo = to_stereo(&[0.1, 0.2, 0.3], 1);
        assert_eq!(stereo, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
    }

    #[test]
    fn stereo_passes_through() {
        let samples = vec![0.1, -0.1, 0.2, -0.2];
        assert_eq!(to_stereo(&samples, 2), samples);
    }

    #[test]
    fn surround_is_averaged() {
        let stereo = to_stereo(&[0.2, 0.4, 0.6, 0.8], 4);
        assert_eq!(stereo.len(), 2);
        assert!((stereo[0] - 0.5).abs() < 1e-6);
        assert!((stereo[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn matching_rates_are_untouched() {
        let samples = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(resample_linear(&samples, 44100, 44100), samples);
    }

    #[test]
    fn upsampling_doubles_frame_count() {
        let samples = vec![0.0, 0.0, 1.0, 1.0];
        let out = resample_linear(&samples, 22050, 44100);
        assert_eq!(out.len(), 8);

        // First output frame matches the first input frame
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);

        // Interpolated frames sit between the inputs
        assert!((out[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn downsampling_halves_frame_count() {
        let samples: Vec<f32> = (0..8).flat_map(|i| [i as f32, i as f32]).collect();
        let out = resample_linear(&samples, 48000, 24000);
        assert_eq!(out.len() / 2, 4);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(resample_linear(&[], 44100, 48000).is_empty());
        assert!(to_stereo(&[], 0).is_empty());
    }
}
