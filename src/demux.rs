// src/demux.rs

//! Container probing and packet iteration for Symphonia.
//!
//! Inputs are regular files, so the source is seekable; most MP4/MOV layouts
//! need that to reach their `moov` box.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

// Power of two above 32 KiB, as Symphonia's prober requires.
const PROBE_BUFFER_LEN: usize = 256 * 1024;

/// Open a media file and pick the audio track we will decode.
///
/// The first track with a real codec and a known sample rate wins; the sample
/// rate is what lets cue milliseconds map to frames later on. The file
/// extension, when present, is passed to the prober as a hint.
pub fn probe_file(path: &Path) -> Result<(Box<dyn FormatReader>, Track)> {
    let file =
        File::open(path).with_context(|| format!("failed to open media: {}", path.display()))?;

    let mss = MediaSourceStream::new(
        Box::new(file),
        MediaSourceStreamOptions {
            buffer_len: PROBE_BUFFER_LEN,
        },
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("unsupported or corrupt container: {}", path.display()))?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no audio track found in {}", path.display()))?;

    Ok((format, track))
}

/// Read the next packet. `Ok(None)` is end of stream (Symphonia reports EOF as an IO error).
pub fn next_packet(format: &mut Box<dyn FormatReader>) -> Result<Option<Packet>> {
    match format.next_packet() {
        Ok(p) => Ok(Some(p)),
        Err(SymphoniaError::IoError(_)) => Ok(None),
        Err(e) => Err(anyhow!(e)).context("failed reading packet"),
    }
}
