use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::audio::{AudioBuffer, AudioClip};
use crate::decoder::extract_to_wav;
use crate::toolkit::MediaToolkit;
use crate::toolkits::remove_partial;
use crate::wav::{read_wav_file, write_pcm16};
use crate::{Error, Result};

/// Built-in toolkit with no external executables.
///
/// - extraction: Symphonia demux + decode of the first audio track into a float WAV
/// - clips: 16-bit PCM WAV
///
/// Any container/codec pair Symphonia supports works as input (MP4/AAC, MKV,
/// WebM/Vorbis, plain audio files, ...).
#[derive(Debug, Clone, Default)]
pub struct NativeToolkit {
    downmix_to_mono: bool,
}

impl NativeToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Average all channels into one during extraction.
    pub fn with_downmix(mut self, downmix_to_mono: bool) -> Self {
        self.downmix_to_mono = downmix_to_mono;
        self
    }
}

impl MediaToolkit for NativeToolkit {
    fn clip_extension(&self) -> &str {
        "wav"
    }

    fn extract_audio(&self, video: &Path, dest: &Path) -> Result<()> {
        match extract_to_wav(video, dest, self.downmix_to_mono) {
            Ok(spec) => {
                tracing::debug!(
                    sample_rate = spec.sample_rate,
                    channels = spec.channels,
                    "extracted audio track"
                );
                Ok(())
            }
            Err(err) => {
                // A half-written WAV is useless; drop it so later stages never see it.
                remove_partial(dest);
                Err(Error::ExtractionFailure(format!("{err:#}")))
            }
        }
    }

    fn load(&self, decoded: &Path) -> Result<AudioBuffer> {
        Ok(read_wav_file(decoded)?)
    }

    fn encode(&self, clip: &AudioClip, out: &Path) -> Result<()> {
        let encode = || -> anyhow::Result<()> {
            let file = File::create(out)?;
            write_pcm16(clip, BufWriter::new(file))
        };

        encode().map_err(|err| Error::EncodingFailure {
            path: out.to_path_buf(),
            message: format!("{err:#}"),
        })
    }
}
