//! `subclip`: slice a video's audio track into one clip per subtitle cue.
//!
//! This crate provides:
//! - SRT and LRC parsing into timed cues
//! - A pluggable media toolkit (pure-Rust Symphonia/WAV, or an external `ffmpeg`)
//! - A segmenter that exports one clip per cue with deterministic filenames
//! - A manifest (CSV or JSON) mapping each transcript line to its clip
//!
//! The library is meant to sit behind a CLI or a GUI worker thread; progress is
//! reported through a [`ProgressSink`] so hosts decide how to display it.

mod error;
pub use error::{Error, Result};

// High-level API (most consumers should start here).
pub mod opts;
pub mod segmenter;

// Subtitle grammars.
pub mod subtitles;
pub mod timestamp;

// Media backends and audio handling.
pub mod audio;
pub mod decode;
pub mod decoder;
pub mod demux;
pub mod toolkit;
pub mod toolkits;
pub mod wav;

// Run output.
pub mod csv_manifest_encoder;
pub mod json_manifest_encoder;
pub mod manifest;
pub mod manifest_encoder;
pub mod manifest_format;
pub mod naming;
pub mod progress;
pub mod segments;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use audio::{AudioBuffer, AudioClip};
pub use manifest_format::ManifestFormat;
pub use opts::Opts;
pub use progress::{NoProgress, Progress, ProgressSink};
pub use segmenter::{RunOutcome, RunReport, RunRequest, Segmenter, Stage};
pub use segments::Segment;
pub use subtitles::{Cue, SubtitleFormat};
pub use toolkit::MediaToolkit;
pub use toolkits::ffmpeg::{FfmpegConfig, FfmpegToolkit};
pub use toolkits::native::NativeToolkit;
