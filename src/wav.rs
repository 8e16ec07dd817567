use std::io::{Read, Seek, Write};
use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::audio::{AudioBuffer, AudioClip};

/// Load WAV audio from a file into an [`AudioBuffer`].
pub fn read_wav_file(path: &Path) -> Result<AudioBuffer> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV file: {}", path.display()))?;
    read_samples(reader)
}

/// Load WAV audio from a reader into an [`AudioBuffer`].
///
/// Integer PCM of any bit depth and 32-bit float are accepted; everything is
/// normalized to `f32` in `[-1.0, 1.0]`, channels stay interleaved.
pub fn read_wav<R>(reader: R) -> Result<AudioBuffer>
where
    R: Read,
{
    let reader = WavReader::new(reader).context("failed to read WAV data from reader")?;
    read_samples(reader)
}

fn read_samples<R: Read>(mut reader: WavReader<R>) -> Result<AudioBuffer> {
    let spec = reader.spec();
    if spec.channels == 0 {
        anyhow::bail!("WAV data declares zero channels");
    }

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to read float WAV samples")?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|pcm| pcm as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("failed to read PCM WAV samples")?
        }
    };

    Ok(AudioBuffer::new(spec.sample_rate, spec.channels, samples))
}

/// WAV header for 16-bit PCM clips.
pub fn pcm16_spec(sample_rate: u32, channels: u16) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// WAV header for the lossless 32-bit float intermediate track.
pub fn float32_spec(sample_rate: u32, channels: u16) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

/// Write a clip as 16-bit PCM WAV to any seekable writer.
pub fn write_pcm16<W>(clip: &AudioClip, w: W) -> Result<()>
where
    W: Write + Seek,
{
    let mut writer = WavWriter::new(w, pcm16_spec(clip.sample_rate, clip.channels))
        .context("failed to start WAV writer")?;

    for &sample in &clip.samples {
        writer.write_sample(f32_to_i16(sample))?;
    }

    writer.finalize().context("failed to finalize WAV data")?;
    Ok(())
}

/// Write a clip as 16-bit PCM WAV into a fresh in-memory buffer.
pub fn pcm16_bytes(clip: &AudioClip) -> Result<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    write_pcm16(clip, &mut cursor)?;
    Ok(cursor.into_inner())
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}
