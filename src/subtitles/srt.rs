//! SRT block scanner.
//!
//! A block is a run of non-blank lines:
//!
//! ```text
//! 12
//! 00:01:02,500 --> 00:01:04,000
//! first line
//! second line
//! ```
//!
//! Blocks without a numeric index, a timing line, or any text are skipped.
//! A timing line that has an arrow but a malformed stamp fails the whole file.

use crate::Result;
use crate::subtitles::{Cue, collapse_text};
use crate::timestamp::srt_time_to_ms;

const ARROW: &str = "-->";

/// Parse SRT text (already decoded, `\n` line endings) into cues.
pub fn parse_srt(content: &str) -> Result<Vec<Cue>> {
    let mut cues = Vec::new();

    for block in blocks(content) {
        if let Some(cue) = parse_block(&block)? {
            cues.push(cue);
        }
    }

    Ok(cues)
}

fn blocks(content: &str) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }

    out
}

fn parse_block(lines: &[&str]) -> Result<Option<Cue>> {
    let [index_line, timing_line, text_lines @ ..] = lines else {
        return Ok(None);
    };
    if text_lines.is_empty() {
        return Ok(None);
    }

    let Ok(index) = index_line.trim().parse::<usize>() else {
        return Ok(None);
    };
    let Some((start, end)) = timing_line.split_once(ARROW) else {
        return Ok(None);
    };

    let start_ms = srt_time_to_ms(start)?;
    // Position settings (`X1:... Y1:...`) may follow the end stamp.
    let end = end.split_whitespace().next().unwrap_or_default();
    let end_ms = srt_time_to_ms(end)?;

    let text = collapse_text(text_lines.iter().copied());
    if text.is_empty() {
        return Ok(None);
    }

    Ok(Some(Cue::new(index, start_ms, end_ms, text)))
}
