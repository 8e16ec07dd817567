// src/decoder.rs

//! Decode the audio track of a media file, emitting interleaved `f32` buffers via a sink.
//!
//! This module is orchestration-only:
//! - `demux` handles probing + packet iteration
//! - `decode` handles codec decoding and interleaving
//!
//! [`WavFileSink`] streams the decoded track to disk so the full track never has
//! to sit in memory twice.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, bail};
use hound::WavWriter;

use crate::decode::{Interleaver, PcmSpec, decode_packet_and_then, make_decoder_for_track};
use crate::demux::{next_packet, probe_file};
use crate::wav::float32_spec;

/// Consumer callback for decoded samples.
pub trait SamplesSink {
    /// Receive interleaved samples. Returning `Ok(false)` stops decoding early.
    fn on_samples(&mut self, spec: PcmSpec, interleaved: &[f32]) -> Result<bool>;
}

/// Decode the default audio track of `path` into `sink`, in stream order.
pub fn decode_file(path: &Path, sink: &mut dyn SamplesSink) -> Result<()> {
    let (mut format, track) = probe_file(path)?;
    let mut decoder = make_decoder_for_track(&track)?;
    let mut interleaver = Interleaver::default();
    let mut keep_going = true;

    while keep_going {
        let Some(packet) = next_packet(&mut format)? else {
            break;
        };

        // Video, subtitle and secondary audio tracks share the packet stream.
        if packet.track_id() != track.id {
            continue;
        }

        decode_packet_and_then(&mut decoder, &packet, |decoded| {
            let (spec, samples) = interleaver.interleave(decoded)?;
            keep_going = sink.on_samples(spec, samples)?;
            Ok(())
        })?;
    }

    Ok(())
}

/// Streams decoded audio into a 32-bit float WAV file.
///
/// The WAV header is written lazily from the first decoded buffer, since the
/// container's codec parameters don't always carry the channel layout.
pub struct WavFileSink<'a> {
    path: &'a Path,
    downmix_to_mono: bool,
    spec: Option<PcmSpec>,
    writer: Option<WavWriter<BufWriter<File>>>,
}

impl<'a> WavFileSink<'a> {
    pub fn new(path: &'a Path, downmix_to_mono: bool) -> Self {
        Self {
            path,
            downmix_to_mono,
            spec: None,
            writer: None,
        }
    }

    /// Flush the WAV header. Fails if no audio was decoded at all.
    pub fn finalize(self) -> Result<PcmSpec> {
        let (Some(writer), Some(spec)) = (self.writer, self.spec) else {
            bail!("no audio decoded from input");
        };
        writer
            .finalize()
            .with_context(|| format!("failed to finalize {}", self.path.display()))?;
        Ok(spec)
    }

    fn writer_for(&mut self, spec: PcmSpec) -> Result<&mut WavWriter<BufWriter<File>>> {
        if let Some(existing) = self.spec {
            if existing != spec {
                bail!("audio format changed mid-stream ({existing:?} -> {spec:?})");
            }
        }

        if self.writer.is_none() {
            let channels = if self.downmix_to_mono { 1 } else { spec.channels };
            let writer = WavWriter::create(self.path, float32_spec(spec.sample_rate, channels))
                .with_context(|| format!("failed to create {}", self.path.display()))?;
            self.writer = Some(writer);
            self.spec = Some(spec);
        }

        self.writer
            .as_mut()
            .context("WAV writer not initialized")
    }
}

impl SamplesSink for WavFileSink<'_> {
    fn on_samples(&mut self, spec: PcmSpec, interleaved: &[f32]) -> Result<bool> {
        let downmix = self.downmix_to_mono && spec.channels > 1;
        let writer = self.writer_for(spec)?;

        if downmix {
            let ch = spec.channels as usize;
            for frame in interleaved.chunks_exact(ch) {
                writer.write_sample(frame.iter().sum::<f32>() / ch as f32)?;
            }
        } else {
            for &sample in interleaved {
                writer.write_sample(sample)?;
            }
        }

        Ok(true)
    }
}

/// Decode `video` and write its audio track to `dest` as a float WAV file.
pub fn extract_to_wav(video: &Path, dest: &Path, downmix_to_mono: bool) -> Result<PcmSpec> {
    let mut sink = WavFileSink::new(dest, downmix_to_mono);
    decode_file(video, &mut sink)?;
    sink.finalize()
}
