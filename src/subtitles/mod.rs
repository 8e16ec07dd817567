//! Subtitle loading.
//!
//! Both loaders produce [`Cue`]s in file order. The engine never sorts them, so
//! overlapping or non-monotonic timestamps in malformed input pass through as-is.

mod cue;
mod lrc;
mod srt;

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::Result;
use crate::opts::Opts;

pub use cue::Cue;
pub use lrc::parse_lrc;
pub use srt::parse_srt;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// The two supported subtitle grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Lrc,
}

impl SubtitleFormat {
    /// Pick a format from the file extension: `.lrc` (any case) is LRC, everything else SRT.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("lrc") => Self::Lrc,
            _ => Self::Srt,
        }
    }
}

/// Read and parse a subtitle file, dispatching on its extension.
pub fn load_cues(path: &Path, opts: &Opts) -> Result<Vec<Cue>> {
    let bytes = fs::read(path)?;
    let content = decode_text(&bytes);

    let cues = match SubtitleFormat::from_path(path) {
        SubtitleFormat::Srt => parse_srt(&content)?,
        SubtitleFormat::Lrc => parse_lrc(&content, opts.trailing_duration_ms),
    };

    if cues.is_empty() {
        warn!(path = %path.display(), "no subtitle cues found");
    }

    Ok(cues)
}

/// Decode subtitle bytes as UTF-8 (BOM stripped), falling back to Latin-1.
///
/// Line endings are normalized to `\n`.
pub fn decode_text(bytes: &[u8]) -> String {
    // The BOM goes before decoding so the Latin-1 path never sees it.
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        // Latin-1 maps every byte to the code point of the same value.
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    };

    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Fold a multi-line text block into a single trimmed line.
pub(crate) fn collapse_text<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
