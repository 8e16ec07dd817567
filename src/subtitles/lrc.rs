//! LRC line parser with end-time inference.
//!
//! LRC only carries start times. A cue ends where the next timestamped line
//! starts; the last cue gets a fixed trailing duration.

use crate::subtitles::{Cue, collapse_text};
use crate::timestamp::lrc_prefix;

/// Parse LRC text (already decoded, `\n` line endings) into cues.
///
/// Boundaries are derived from every timestamped line, including ones without
/// text; empty lines are dropped afterwards. `index` is the position in that raw
/// sequence plus one, so indices can have gaps.
pub fn parse_lrc(content: &str, trailing_duration_ms: u64) -> Vec<Cue> {
    let raw: Vec<(u64, &str)> = content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (start_ms, len) = lrc_prefix(line)?;
            Some((start_ms, &line[len..]))
        })
        .collect();

    raw.iter()
        .enumerate()
        .filter_map(|(i, &(start_ms, text))| {
            let end_ms = match raw.get(i + 1) {
                Some(&(next_start, _)) => next_start,
                None => start_ms.saturating_add(trailing_duration_ms),
            };

            let text = collapse_text([text]);
            if text.is_empty() {
                return None;
            }

            Some(Cue::new(i + 1, start_ms, end_ms, text))
        })
        .collect()
}
