// src/decode.rs

//! Codec-level helpers built on top of Symphonia.
//!
//! Decoding always lands in interleaved `f32` so the rest of the crate never
//! sees Symphonia's per-format sample types.

use anyhow::{Context, Result, anyhow};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{Packet, Track};

/// Create a decoder for the given audio track using Symphonia's default codec registry.
pub fn make_decoder_for_track(track: &Track) -> Result<Box<dyn Decoder>> {
    symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| anyhow!(e))
        .context("unsupported audio codec")
}

/// Sample rate and channel count of decoded audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Reusable scratch space for converting decoded buffers to interleaved `f32`.
#[derive(Default)]
pub struct Interleaver {
    buf: Option<SampleBuffer<f32>>,
    capacity_frames: u64,
}

impl Interleaver {
    /// Convert one decoded buffer. The returned slice is valid until the next call.
    pub fn interleave(&mut self, decoded: AudioBufferRef<'_>) -> Result<(PcmSpec, &[f32])> {
        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            anyhow::bail!("decoded audio had zero channels");
        }

        // Packets can grow (e.g. variable frame sizes); reallocate only when needed.
        let needed = decoded.capacity() as u64;
        if self.buf.is_none() || needed > self.capacity_frames {
            self.buf = Some(SampleBuffer::<f32>::new(needed, spec));
            self.capacity_frames = needed;
        }

        let buf = self
            .buf
            .as_mut()
            .ok_or_else(|| anyhow!("sample buffer not initialized"))?;
        buf.copy_interleaved_ref(decoded);

        let pcm = PcmSpec {
            sample_rate: spec.rate,
            channels: u16::try_from(channels).context("too many channels")?,
        };
        Ok((pcm, buf.samples()))
    }
}

/// Decode a packet and hand the result to `on_decoded`.
///
/// - `Ok(true)`: a buffer was decoded and the callback ran
/// - `Ok(false)`: a corrupt frame was skipped, or the stream ended
/// - `Err(_)`: fatal decoder or callback error
pub fn decode_packet_and_then(
    decoder: &mut Box<dyn Decoder>,
    packet: &Packet,
    on_decoded: impl FnOnce(AudioBufferRef<'_>) -> Result<()>,
) -> Result<bool> {
    match decoder.decode(packet) {
        Ok(buf) => {
            on_decoded(buf)?;
            Ok(true)
        }
        Err(SymphoniaError::DecodeError(_)) => Ok(false),
        Err(SymphoniaError::IoError(_)) => Ok(false),
        Err(e) => Err(anyhow!(e)).context("decoder failure"),
    }
}
