//! Progress reporting for long-running runs.
//!
//! A run emits fixed-shape [`Progress`] events into a [`ProgressSink`]. Hosts
//! that run the segmenter on a worker thread typically pass an `mpsc` sender and
//! drain the receiver on their own thread.

use std::fmt;
use std::sync::mpsc;

/// One status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub message: String,
    /// Completion in `0..=100`, when the checkpoint has one.
    pub percent: Option<u8>,
}

impl Progress {
    pub fn new(message: impl Into<String>, percent: Option<u8>) -> Self {
        Self {
            message: message.into(),
            percent: percent.map(|p| p.min(100)),
        }
    }

    pub fn at(message: impl Into<String>, percent: u8) -> Self {
        Self::new(message, Some(percent))
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::new(message, None)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent {
            Some(p) => write!(f, "{} ({p}%)", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Fixed checkpoints of a run.
pub mod checkpoint {
    pub const PARSING: u8 = 2;
    pub const EXTRACTING: u8 = 10;
    pub const LOADING: u8 = 30;
    pub const SLICING_START: u8 = 35;
    pub const SLICING_END: u8 = 95;
    pub const MANIFEST: u8 = 98;
    pub const DONE: u8 = 100;
}

/// Map `done` of `total` cues onto the slicing range (35..=95).
pub fn slicing_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return checkpoint::SLICING_START;
    }
    let span = (checkpoint::SLICING_END - checkpoint::SLICING_START) as usize;
    let step = done.min(total) * span / total;
    checkpoint::SLICING_START + step as u8
}

/// Receiver of progress events.
pub trait ProgressSink {
    fn report(&mut self, progress: Progress);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: Progress) {}
}

impl<F> ProgressSink for F
where
    F: FnMut(Progress),
{
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

// A disconnected receiver means the host stopped listening; the run itself carries on.
impl ProgressSink for mpsc::Sender<Progress> {
    fn report(&mut self, progress: Progress) {
        let _ = self.send(progress);
    }
}

impl ProgressSink for mpsc::SyncSender<Progress> {
    fn report(&mut self, progress: Progress) {
        let _ = self.send(progress);
    }
}

/// Collects events in memory.
impl ProgressSink for Vec<Progress> {
    fn report(&mut self, progress: Progress) {
        self.push(progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slicing_percent_is_linear_between_bounds() {
        assert_eq!(slicing_percent(0, 10), 35);
        assert_eq!(slicing_percent(5, 10), 65);
        assert_eq!(slicing_percent(10, 10), 95);
        assert_eq!(slicing_percent(1, 3), 55);
        assert_eq!(slicing_percent(0, 0), 35);
    }

    #[test]
    fn percent_is_capped() {
        assert_eq!(Progress::at("x", 250).percent, Some(100));
    }

    #[test]
    fn display_includes_percent_when_present() {
        assert_eq!(Progress::at("Loading", 30).to_string(), "Loading (30%)");
        assert_eq!(Progress::message("Hi").to_string(), "Hi");
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (mut tx, rx) = mpsc::channel::<Progress>();
        drop(rx);
        tx.report(Progress::message("nobody listens"));
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |p: Progress| seen.push(p.percent);
            sink.report(Progress::at("a", 2));
            sink.report(Progress::message("b"));
        }
        assert_eq!(seen, vec![Some(2), None]);
    }
}
