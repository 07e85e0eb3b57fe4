//! In-process transcoder — no external binaries.
//!
//! Pipeline:
//! 1. **Decode** — symphonia probes the container (MP3 from the provider;
//!    WAV/PCM also work) and decodes every packet to interleaved `f32`.
//! 2. **Down-mix** — channels averaged frame by frame.
//! 3. **Resample** — rubato FFT resampler to 16 kHz, resampler delay
//!    trimmed so the output length matches the input duration.
//! 4. **Encode** — clamped to 16-bit PCM and written with hound.

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use rubato::{FftFixedIn, Resampler};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::AudioTranscoder;
use crate::error::{ConversionError, Result};
use crate::wav::{write_pcm16, TARGET_SAMPLE_RATE};

/// Requested input frames per resampler call.
const CHUNK: usize = 1024;
/// FFT sub-chunks per input chunk.
const SUB_CHUNKS: usize = 2;

/// Decoded PCM, interleaved.
struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

/// symphonia + rubato + hound.
#[derive(Debug, Clone, Default)]
pub struct LibraryTranscoder;

impl LibraryTranscoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioTranscoder for LibraryTranscoder {
    fn describe(&self) -> String {
        "library (symphonia + rubato)".to_string()
    }

    fn normalize(&self, input: &Path, output: &Path) -> Result<()> {
        transcode(input, output)
            .map_err(|e| ConversionError::TranscodeFailed(format!("{:#}", e)))
    }
}

fn transcode(input: &Path, output: &Path) -> anyhow::Result<()> {
    let decoded = decode(input)?;
    if decoded.samples.is_empty() {
        bail!("{} decoded to zero samples", input.display());
    }
    tracing::debug!(
        sample_rate = decoded.sample_rate,
        channels = decoded.channels,
        samples = decoded.samples.len(),
        "decoded provider audio"
    );

    let mono = downmix(&decoded.samples, decoded.channels);
    let resampled = resample_mono(&mono, decoded.sample_rate, TARGET_SAMPLE_RATE)?;
    write_pcm16(&resampled, output)?;

    tracing::info!(
        output = %output.display(),
        frames = resampled.len(),
        "library transcoding finished"
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode
// ─────────────────────────────────────────────────────────────────────────────

fn decode(path: &Path) -> anyhow::Result<DecodedAudio> {
    let src = std::fs::File::open(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Unrecognised audio container: {}", path.display()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow!("No supported audio tracks found in {}", path.display()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Unsupported codec")?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e).context("Failed to read audio packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            // A corrupt frame is skipped, the rest of the stream still plays.
            Err(SymphoniaError::DecodeError(msg)) => {
                tracing::debug!(error = msg, "skipping undecodable audio packet");
            }
            Err(e) => return Err(e).context("Audio decode failed"),
        }
    }

    if sample_rate == 0 {
        bail!("Unknown sample rate in {}", path.display());
    }
    Ok(DecodedAudio { samples, sample_rate, channels: channels.max(1) })
}

// ─────────────────────────────────────────────────────────────────────────────
// Down-mix + resample
// ─────────────────────────────────────────────────────────────────────────────

/// Average interleaved `channels` into a single channel.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample mono PCM from `sr_in` to `sr_out`.
///
/// The output holds exactly `len * sr_out / sr_in` samples (rounded down):
/// the FFT resampler's leading delay is dropped and its tail is flushed.
fn resample_mono(input: &[f32], sr_in: u32, sr_out: u32) -> anyhow::Result<Vec<f32>> {
    if sr_in == sr_out || input.is_empty() {
        return Ok(input.to_vec());
    }

    let mut resampler =
        FftFixedIn::<f32>::new(sr_in as usize, sr_out as usize, CHUNK, SUB_CHUNKS, 1)?;
    let delay = resampler.output_delay();
    let expected = (input.len() as u64 * sr_out as u64 / sr_in as u64) as usize;
    let chunk_len = resampler.input_frames_next();
    let mut out = Vec::with_capacity(expected + delay + chunk_len);

    let mut chunks = input.chunks_exact(chunk_len);
    for chunk in &mut chunks {
        let frames = resampler.process(&[chunk], None)?;
        out.extend_from_slice(&frames[0]);
    }

    let rest = chunks.remainder();
    if !rest.is_empty() {
        let block = [rest];
        let frames = resampler.process_partial(Some(&block[..]), None)?;
        out.extend_from_slice(&frames[0]);
    }

    // Flush with silence until the delayed tail has come out.
    while out.len() < expected + delay {
        let frames = resampler.process_partial(None::<&[&[f32]]>, None)?;
        if frames[0].is_empty() {
            break;
        }
        out.extend_from_slice(&frames[0]);
    }

    out.drain(..delay.min(out.len()));
    out.truncate(expected);
    Ok(out)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::inspect;

    fn write_stereo_tone(path: &Path, sample_rate: u32, seconds: f32) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (sample_rate as f32 * seconds) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let s = ((t * 440.0 * std::f32::consts::TAU).sin() * 16_000.0) as i16;
            writer.write_sample(s).unwrap();
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_downmix() {
        assert_eq!(downmix(&[1.0, 0.0, 0.5, 0.5], 2), vec![0.5, 0.5]);
        assert_eq!(downmix(&[0.25, 0.5], 1), vec![0.25, 0.5]);
    }

    #[test]
    fn test_resample_length() {
        let input = vec![0.1f32; 4_800];
        let out = resample_mono(&input, 48_000, 16_000).unwrap();
        assert_eq!(out.len(), 1_600);
    }

    #[test]
    fn test_resample_identity() {
        let input = vec![0.3f32; 100];
        assert_eq!(resample_mono(&input, 16_000, 16_000).unwrap(), input);
    }

    #[test]
    fn test_stereo_44k_becomes_mono_16k() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tone.wav");
        let output = dir.path().join("out.wav");
        write_stereo_tone(&input, 44_100, 1.0);

        LibraryTranscoder::new().normalize(&input, &output).unwrap();

        let summary = inspect(&output).unwrap();
        assert!(summary.matches_target(), "got {}", summary);
        assert_eq!(summary.frames, 16_000);

        let mut reader = hound::WavReader::open(&output).unwrap();
        let peak = reader
            .samples::<i16>()
            .map(|s| s.unwrap().unsigned_abs())
            .max()
            .unwrap();
        assert!(peak > 8_000, "tone lost in resampling, peak {}", peak);
    }

    #[test]
    fn test_garbage_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("noise.mp3");
        std::fs::write(&input, b"this is not audio at all").unwrap();
        let output = dir.path().join("out.wav");

        let err = LibraryTranscoder::new().normalize(&input, &output).unwrap_err();

        assert!(matches!(err, ConversionError::TranscodeFailed(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_empty_stream_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.wav");
        let writer = hound::WavWriter::create(&input, crate::wav::target_spec()).unwrap();
        writer.finalize().unwrap();
        let output = dir.path().join("out.wav");

        let err = LibraryTranscoder::new().normalize(&input, &output).unwrap_err();

        assert!(matches!(err, ConversionError::TranscodeFailed(ref m) if m.contains("zero samples")));
        assert!(!output.exists());
    }
}
