//! Timestamp grammars for the two supported subtitle formats.
//!
//! Both parsers produce integer milliseconds. There is no rounding anywhere:
//! SRT carries exact milliseconds, and LRC fractions are padded or truncated to
//! three digits before conversion.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

static SRT_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2}),(\d{3})$").expect("valid SRT timestamp regex")
});

// Hours are optional; `[MM:SS.ff]` is the common form.
static LRC_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?:(\d+):)?(\d+):(\d+)\.(\d+)\]").expect("valid LRC timestamp regex")
});

/// Parse an SRT timestamp (`HH:MM:SS,mmm`) into milliseconds.
///
/// Leading/trailing whitespace is ignored; any other deviation from the grammar
/// is an [`Error::InvalidTimestamp`].
pub fn srt_time_to_ms(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    let caps = SRT_TIMESTAMP
        .captures(trimmed)
        .ok_or_else(|| Error::InvalidTimestamp(trimmed.to_owned()))?;

    let field = |i: usize| -> Result<u64> {
        caps[i]
            .parse::<u64>()
            .map_err(|_| Error::InvalidTimestamp(trimmed.to_owned()))
    };

    to_ms(field(1)?, field(2)?, field(3)?, field(4)?)
        .ok_or_else(|| Error::InvalidTimestamp(trimmed.to_owned()))
}

/// Parse a bracketed LRC timestamp at the start of `text` into milliseconds.
///
/// Returns `None` when the line does not start with a timestamp; LRC files mix
/// cue lines with metadata tags like `[ar:Artist]`.
pub fn lrc_time_to_ms(text: &str) -> Option<u64> {
    lrc_prefix(text).map(|(ms, _)| ms)
}

/// Like [`lrc_time_to_ms`], but also returns the byte length of the matched
/// bracket so callers can take the remainder of the line as cue text.
pub(crate) fn lrc_prefix(text: &str) -> Option<(u64, usize)> {
    let caps = LRC_TIMESTAMP.captures(text)?;

    let hours = match caps.get(1) {
        Some(h) => h.as_str().parse::<u64>().ok()?,
        None => 0,
    };
    let minutes = caps[2].parse::<u64>().ok()?;
    let seconds = caps[3].parse::<u64>().ok()?;
    let millis = fraction_to_ms(&caps[4])?;

    let ms = to_ms(hours, minutes, seconds, millis)?;
    Some((ms, caps.get(0)?.end()))
}

/// `None` when the total does not fit in a `u64`.
fn to_ms(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
    hours
        .checked_mul(MS_PER_HOUR)?
        .checked_add(minutes.checked_mul(MS_PER_MINUTE)?)?
        .checked_add(seconds.checked_mul(MS_PER_SECOND)?)?
        .checked_add(millis)
}

/// `"5"` → 500, `"50"` → 500, `"500"` → 500, `"5009"` → 500.
fn fraction_to_ms(digits: &str) -> Option<u64> {
    let mut padded: String = digits.chars().take(3).collect();
    while padded.len() < 3 {
        padded.push('0');
    }
    padded.parse().ok()
}

/// Format milliseconds as an SRT timestamp (`HH:MM:SS,mmm`).
pub fn format_srt_timestamp(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = ms % MS_PER_SECOND;

    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srt_converts_each_field() -> anyhow::Result<()> {
        assert_eq!(srt_time_to_ms("00:00:05,123")?, 5_123);
        assert_eq!(srt_time_to_ms("01:00:00,000")?, 3_600_000);
        assert_eq!(srt_time_to_ms("00:02:03,004")?, 123_004);
        assert_eq!(srt_time_to_ms(" 00:00:01,000 ")?, 1_000);
        Ok(())
    }

    #[test]
    fn srt_rejects_other_shapes() {
        for bad in [
            "00:00:05.123",
            "0:00:05,123",
            "00:00:05,12",
            "00:05,123",
            "aa:bb:cc,ddd",
            "",
        ] {
            let err = srt_time_to_ms(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidTimestamp(_)), "{bad}");
        }
    }

    #[test]
    fn srt_hours_too_large_for_u64_are_invalid() {
        let err = srt_time_to_ms("99999999999999:00:00,000").unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp(_)));

        // Too many digits to parse at all.
        let err = srt_time_to_ms("99999999999999999999999:00:00,000").unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp(_)));
    }

    #[test]
    fn lrc_minutes_too_large_for_u64_are_none() {
        assert_eq!(lrc_time_to_ms("[999999999999999999:00.00]"), None);
        assert_eq!(lrc_time_to_ms("[999999999999999:00:00.00]"), None);
    }

    #[test]
    fn lrc_fraction_width_does_not_change_value() {
        assert_eq!(lrc_time_to_ms("[01:02.5]"), Some(62_500));
        assert_eq!(lrc_time_to_ms("[01:02.50]"), Some(62_500));
        assert_eq!(lrc_time_to_ms("[01:02.500]"), Some(62_500));
        assert_eq!(lrc_time_to_ms("[01:02.5009]"), Some(62_500));
    }

    #[test]
    fn lrc_accepts_optional_hours() {
        assert_eq!(lrc_time_to_ms("[01:00:01.25]"), Some(3_601_250));
        assert_eq!(lrc_time_to_ms("[00:00.00]"), Some(0));
    }

    #[test]
    fn lrc_without_timestamp_is_none() {
        assert_eq!(lrc_time_to_ms("[ar:Someone]"), None);
        assert_eq!(lrc_time_to_ms("plain lyric line"), None);
        assert_eq!(lrc_time_to_ms("[01:02]"), None);
        assert_eq!(lrc_time_to_ms(" [01:02.50]"), None);
    }

    #[test]
    fn lrc_prefix_reports_bracket_length() {
        assert_eq!(lrc_prefix("[00:01.00]hello"), Some((1_000, 10)));
    }

    #[test]
    fn format_round_trips_through_parser() -> anyhow::Result<()> {
        for ms in [0, 999, 61_001, 3_600_000 + 59_999] {
            assert_eq!(srt_time_to_ms(&format_srt_timestamp(ms))?, ms);
        }
        Ok(())
    }
}
