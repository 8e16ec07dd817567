use serde::Serialize;

/// One timed subtitle entry.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Cue {
    /// 1-based ordinal. SRT takes it from the file; LRC uses the raw line position.
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Whitespace-collapsed, never empty.
    pub text: String,
}

impl Cue {
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Whether the cue spans a non-empty window.
    pub fn is_playable(&self) -> bool {
        self.start_ms < self.end_ms
    }
}
