use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

/// Pure-Rust toolkit (Symphonia decode, WAV clips).
pub mod native;

/// Toolkit that drives an external `ffmpeg` executable (MP3 clips).
pub mod ffmpeg;

/// Drop whatever a failed extraction left at `path`.
pub(crate) fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to remove partial extraction output");
        }
    }
}
