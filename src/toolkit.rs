use std::path::Path;

use crate::Result;
use crate::audio::{AudioBuffer, AudioClip};

/// Pluggable media backend used by [`crate::Segmenter`].
///
/// A toolkit turns a video into a decodable audio file, loads that file into an
/// [`AudioBuffer`], and encodes clips cut from it. Swapping toolkits never
/// touches the segmenter's state machine.
pub trait MediaToolkit {
    /// File extension (without the dot) of the clips this toolkit encodes.
    fn clip_extension(&self) -> &str;

    /// Write the audio track of `video` to `dest`, blocking until the file is complete.
    ///
    /// Errors should be [`crate::Error::ExtractionFailure`].
    fn extract_audio(&self, video: &Path, dest: &Path) -> Result<()>;

    /// Load a file previously produced by [`MediaToolkit::extract_audio`].
    fn load(&self, decoded: &Path) -> Result<AudioBuffer>;

    /// Cut `[start_ms, end_ms)` out of `buffer`, clamped to its end.
    fn slice(&self, buffer: &AudioBuffer, start_ms: u64, end_ms: u64) -> AudioClip {
        buffer.slice_ms(start_ms, end_ms)
    }

    /// Encode one clip to `out`. Errors should be [`crate::Error::EncodingFailure`].
    fn encode(&self, clip: &AudioClip, out: &Path) -> Result<()>;
}

impl<T: MediaToolkit + ?Sized> MediaToolkit for &T {
    fn clip_extension(&self) -> &str {
        (**self).clip_extension()
    }

    fn extract_audio(&self, video: &Path, dest: &Path) -> Result<()> {
        (**self).extract_audio(video, dest)
    }

    fn load(&self, decoded: &Path) -> Result<AudioBuffer> {
        (**self).load(decoded)
    }

    fn slice(&self, buffer: &AudioBuffer, start_ms: u64, end_ms: u64) -> AudioClip {
        (**self).slice(buffer, start_ms, end_ms)
    }

    fn encode(&self, clip: &AudioClip, out: &Path) -> Result<()> {
        (**self).encode(clip, out)
    }
}

impl<T: MediaToolkit + ?Sized> MediaToolkit for Box<T> {
    fn clip_extension(&self) -> &str {
        (**self).clip_extension()
    }

    fn extract_audio(&self, video: &Path, dest: &Path) -> Result<()> {
        (**self).extract_audio(video, dest)
    }

    fn load(&self, decoded: &Path) -> Result<AudioBuffer> {
        (**self).load(decoded)
    }

    fn slice(&self, buffer: &AudioBuffer, start_ms: u64, end_ms: u64) -> AudioClip {
        (**self).slice(buffer, start_ms, end_ms)
    }

    fn encode(&self, clip: &AudioClip, out: &Path) -> Result<()> {
        (**self).encode(clip, out)
    }
}
