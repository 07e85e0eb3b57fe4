//! The fixed output format and the helpers that read and write it.
//!
//! Every conversion ends in 16-bit PCM, mono, 16 kHz — the usual shape for
//! low-bandwidth voice notes. It is not configurable.

use std::path::Path;

use crate::error::{ConversionError, Result};

/// Output sample rate in Hz.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Output channel count.
pub const TARGET_CHANNELS: u16 = 1;

/// Output bit depth (signed, little-endian PCM).
pub const TARGET_BITS_PER_SAMPLE: u16 = 16;

/// Header of the WAV files this crate produces.
pub fn target_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: TARGET_CHANNELS,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: TARGET_BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Header facts read back from a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSummary {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub int_samples: bool,
    /// Samples per channel.
    pub frames: u32,
}

impl WavSummary {
    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f32 / self.sample_rate as f32
    }

    /// `true` when the header is exactly [`target_spec`].
    pub fn matches_target(&self) -> bool {
        self.sample_rate == TARGET_SAMPLE_RATE
            && self.channels == TARGET_CHANNELS
            && self.bits_per_sample == TARGET_BITS_PER_SAMPLE
            && self.int_samples
    }
}

impl std::fmt::Display for WavSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {}-bit {}",
            self.sample_rate,
            self.channels,
            self.bits_per_sample,
            if self.int_samples { "PCM" } else { "float" }
        )
    }
}

/// Read the header of the WAV file at `path`.
pub fn inspect(path: &Path) -> Result<WavSummary> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        ConversionError::TranscodeFailed(format!("cannot read WAV {}: {}", path.display(), e))
    })?;
    let spec = reader.spec();
    Ok(WavSummary {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        int_samples: spec.sample_format == hound::SampleFormat::Int,
        frames: reader.duration(),
    })
}

/// Write mono `samples` (f32 in `[-1.0, 1.0]`) as a [`target_spec`] WAV.
pub fn write_pcm16(samples: &[f32], output_path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    let mut writer = hound::WavWriter::create(output_path, target_spec())
        .with_context(|| format!("Cannot create WAV: {}", output_path.display()))?;
    for &s in samples {
        // Convert f32 [-1.0, 1.0] → i16 [-32768, 32767].
        let s16 = (s * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        writer.write_sample(s16).context("WAV write error")?;
    }
    writer.finalize().context("WAV finalise error")?;
    Ok(())
}
