//! High-level API: one run turns a video + subtitle file into clips and a manifest.
//!
//! A run walks a fixed sequence of stages:
//!
//! ```text
//! Idle → ParsingSubtitles → ExtractingAudio → LoadingAudio → Slicing
//!      → WritingManifest → Cleanup → Done
//! ```
//!
//! Any stage before `Done` can fall into `Failed`. Everything runs on the
//! caller's thread, cue by cue, in file order. Hosts with a UI should call
//! [`Segmenter::run`] from a worker thread and forward progress over a channel.
//!
//! Two runs must not target the same output directory at the same time: they
//! share the temp track and the manifest path.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::audio::AudioBuffer;
use crate::manifest::write_manifest;
use crate::naming::segment_filename;
use crate::opts::Opts;
use crate::progress::{Progress, ProgressSink, checkpoint, slicing_percent};
use crate::segments::Segment;
use crate::subtitles::{Cue, load_cues};
use crate::timestamp::format_srt_timestamp;
use crate::toolkit::MediaToolkit;
use crate::{Error, Result};

/// File name of the full decoded track inside the output directory.
pub const TEMP_AUDIO_FILE: &str = "temp_full.wav";

/// Where a run is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ParsingSubtitles,
    ExtractingAudio,
    LoadingAudio,
    Slicing,
    WritingManifest,
    Cleanup,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ParsingSubtitles => "parsing subtitles",
            Self::ExtractingAudio => "extracting audio",
            Self::LoadingAudio => "loading audio",
            Self::Slicing => "slicing",
            Self::WritingManifest => "writing manifest",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub video: PathBuf,
    pub subtitles: PathBuf,
    /// Created if absent.
    pub output_dir: PathBuf,
}

impl RunRequest {
    pub fn new(
        video: impl Into<PathBuf>,
        subtitles: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            video: video.into(),
            subtitles: subtitles.into(),
            output_dir: output_dir.into(),
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The subtitle file had no usable cues; nothing was written.
    NoCues,
    Completed(RunReport),
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Produced clips, in slicing order (same order as the manifest).
    pub segments: Vec<Segment>,
    /// Cues that were out of range or had an empty window.
    pub skipped: usize,
    pub manifest_path: PathBuf,
    pub segments_dir: PathBuf,
}

/// Paths derived from a [`RunRequest`], owned by the run for its duration.
#[derive(Debug, Clone)]
struct RunPaths {
    segments_dir: PathBuf,
    temp_audio: PathBuf,
    manifest: PathBuf,
}

impl RunPaths {
    fn new(output_dir: &Path, opts: &Opts) -> Self {
        Self {
            segments_dir: output_dir.join(&opts.segments_subdir),
            temp_audio: output_dir.join(TEMP_AUDIO_FILE),
            manifest: output_dir.join(opts.manifest_format.file_name()),
        }
    }
}

/// Slices subtitle-aligned clips out of a video's audio track.
///
/// Construct once with a toolkit and options, then call [`Segmenter::run`] for
/// each input pair.
pub struct Segmenter<T: MediaToolkit> {
    toolkit: T,
    opts: Opts,
}

impl<T: MediaToolkit> Segmenter<T> {
    pub fn new(toolkit: T, opts: Opts) -> Self {
        Self { toolkit, opts }
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Execute one run and report progress into `progress`.
    ///
    /// On failure the sink receives an `Error: ...` message before the error is
    /// returned. Clips exported before the failure stay on disk; no manifest is
    /// written. Filenames are deterministic, so a retry overwrites them.
    pub fn run(&self, req: &RunRequest, progress: &mut dyn ProgressSink) -> Result<RunOutcome> {
        let mut run = Run {
            segmenter: self,
            req,
            paths: RunPaths::new(&req.output_dir, &self.opts),
            stage: Stage::Idle,
            progress,
        };

        match run.execute() {
            Ok(outcome) => {
                run.enter(Stage::Done);
                Ok(outcome)
            }
            Err(err) => {
                let err = err.in_stage(run.stage);
                run.enter(Stage::Failed);
                run.report(Progress::message(format!("Error: {err}")));
                Err(err)
            }
        }
    }
}

/// Transient state of a single run.
struct Run<'a, T: MediaToolkit> {
    segmenter: &'a Segmenter<T>,
    req: &'a RunRequest,
    paths: RunPaths,
    stage: Stage,
    progress: &'a mut dyn ProgressSink,
}

impl<T: MediaToolkit> Run<'_, T> {
    fn enter(&mut self, stage: Stage) {
        debug!(from = %self.stage, to = %stage, "stage transition");
        self.stage = stage;
    }

    fn report(&mut self, progress: Progress) {
        self.progress.report(progress);
    }

    fn execute(&mut self) -> Result<RunOutcome> {
        // Inputs are checked before anything touches the filesystem.
        for input in [&self.req.video, &self.req.subtitles] {
            if !input.is_file() {
                return Err(Error::InputNotFound(input.clone()));
            }
        }

        self.enter(Stage::ParsingSubtitles);
        self.report(Progress::at("Parsing subtitle file...", checkpoint::PARSING));
        let cues = load_cues(&self.req.subtitles, &self.segmenter.opts)?;

        if cues.is_empty() {
            self.report(Progress::at(
                "Error: No valid segments found in subtitle file.",
                0,
            ));
            return Ok(RunOutcome::NoCues);
        }
        debug!(count = cues.len(), "parsed cues");

        fs::create_dir_all(&self.paths.segments_dir)?;

        self.enter(Stage::ExtractingAudio);
        self.report(Progress::at(
            "Extracting full audio track from video (this may take a while)...",
            checkpoint::EXTRACTING,
        ));
        self.segmenter
            .toolkit
            .extract_audio(&self.req.video, &self.paths.temp_audio)?;

        let sliced = self.load_and_slice(&cues);
        let report = match sliced {
            Ok(report) => report,
            Err(err) => {
                self.remove_temp_audio();
                return Err(err);
            }
        };

        self.enter(Stage::Cleanup);
        self.remove_temp_audio();

        info!(
            clips = report.segments.len(),
            skipped = report.skipped,
            output = %self.req.output_dir.display(),
            "run complete"
        );
        self.report(Progress::at(
            format!(
                "Completed! Output saved to: {}",
                self.req.output_dir.display()
            ),
            checkpoint::DONE,
        ));

        Ok(RunOutcome::Completed(report))
    }

    /// Everything between extraction and cleanup; the caller removes the temp track either way.
    fn load_and_slice(&mut self, cues: &[Cue]) -> Result<RunReport> {
        self.enter(Stage::LoadingAudio);
        self.report(Progress::at(
            "Loading audio into memory for slicing...",
            checkpoint::LOADING,
        ));
        let mut buffer = self.segmenter.toolkit.load(&self.paths.temp_audio)?;
        if self.segmenter.opts.downmix_to_mono {
            buffer = buffer.into_mono();
        }

        self.enter(Stage::Slicing);
        let (segments, skipped) = self.slice_all(&buffer, cues)?;
        // The full track can be large; release it before writing the manifest.
        drop(buffer);

        self.enter(Stage::WritingManifest);
        self.report(Progress::at(
            "Writing metadata file...",
            checkpoint::MANIFEST,
        ));
        let opts = &self.segmenter.opts;
        write_manifest(
            &self.paths.manifest,
            opts.manifest_format,
            opts.manifest_bom,
            &segments,
        )?;

        Ok(RunReport {
            segments,
            skipped,
            manifest_path: self.paths.manifest.clone(),
            segments_dir: self.paths.segments_dir.clone(),
        })
    }

    fn slice_all(&mut self, buffer: &AudioBuffer, cues: &[Cue]) -> Result<(Vec<Segment>, usize)> {
        let total = cues.len();
        let duration_ms = buffer.duration_ms();
        let every = self.segmenter.opts.progress_every.max(1);
        // Absolute so manifest rows stay valid wherever they are read from.
        let segments_dir = std::path::absolute(&self.paths.segments_dir)?;

        self.report(Progress::at(
            format!("Starting segmentation of {total} clips..."),
            checkpoint::SLICING_START,
        ));

        let mut segments = Vec::with_capacity(total);
        let mut skipped = 0;

        for (i, cue) in cues.iter().enumerate() {
            if !cue.is_playable() || cue.start_ms > duration_ms {
                debug!(
                    index = cue.index,
                    start = %format_srt_timestamp(cue.start_ms),
                    end = %format_srt_timestamp(cue.end_ms),
                    duration = %format_srt_timestamp(duration_ms),
                    "skipping cue outside the audio"
                );
                skipped += 1;
            } else {
                segments.push(self.export(buffer, cue, &segments_dir)?);
            }

            let done = i + 1;
            if done % every == 0 || done == total {
                self.report(Progress::at(
                    format!("Processed {done}/{total} segments."),
                    slicing_percent(done, total),
                ));
            }
        }

        if skipped > 0 {
            warn!(skipped, total, "some cues fell outside the audio track");
        }

        Ok((segments, skipped))
    }

    fn export(&self, buffer: &AudioBuffer, cue: &Cue, segments_dir: &Path) -> Result<Segment> {
        let toolkit = &self.segmenter.toolkit;
        let filename = segment_filename(
            cue.index,
            &cue.text,
            self.segmenter.opts.snippet_chars,
            toolkit.clip_extension(),
        );
        let path = segments_dir.join(&filename);

        let clip = toolkit.slice(buffer, cue.start_ms, cue.end_ms);
        toolkit.encode(&clip, &path)?;

        Ok(Segment {
            text: cue.text.clone(),
            absolute_path: path.to_string_lossy().into_owned(),
            filename,
        })
    }

    fn remove_temp_audio(&self) {
        let path = &self.paths.temp_audio;
        if !path.exists() {
            return;
        }
        if let Err(err) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %err, "failed to remove temporary audio");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::audio::AudioClip;

    /// Toolkit that fabricates a silent track of fixed length and records encodes.
    struct FakeToolkit {
        duration_ms: u64,
        channels: u16,
        fail_extract: bool,
        // A directory at the temp path makes `remove_file` fail during cleanup.
        extract_as_dir: bool,
        fail_encode_at: Option<usize>,
        encoded: RefCell<Vec<(PathBuf, usize)>>,
        encoded_channels: RefCell<Vec<u16>>,
    }

    impl FakeToolkit {
        fn new(duration_ms: u64) -> Self {
            Self {
                duration_ms,
                channels: 1,
                fail_extract: false,
                extract_as_dir: false,
                fail_encode_at: None,
                encoded: RefCell::new(Vec::new()),
                encoded_channels: RefCell::new(Vec::new()),
            }
        }
    }

    impl MediaToolkit for FakeToolkit {
        fn clip_extension(&self) -> &str {
            "raw"
        }

        fn extract_audio(&self, _video: &Path, dest: &Path) -> Result<()> {
            if self.fail_extract {
                return Err(Error::ExtractionFailure("no audio stream".into()));
            }
            if self.extract_as_dir {
                fs::create_dir(dest)?;
            } else {
                fs::write(dest, b"decoded")?;
            }
            Ok(())
        }

        fn load(&self, _decoded: &Path) -> Result<AudioBuffer> {
            let frames = self.duration_ms as usize;
            let samples = vec![0.0; frames * self.channels as usize];
            Ok(AudioBuffer::new(1_000, self.channels, samples))
        }

        fn encode(&self, clip: &AudioClip, out: &Path) -> Result<()> {
            let n = self.encoded.borrow().len();
            if self.fail_encode_at == Some(n) {
                return Err(Error::EncodingFailure {
                    path: out.to_path_buf(),
                    message: "disk full".into(),
                });
            }
            fs::write(out, b"clip")?;
            self.encoded.borrow_mut().push((out.to_path_buf(), clip.frames()));
            self.encoded_channels.borrow_mut().push(clip.channels);
            Ok(())
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        req: RunRequest,
    }

    fn fixture(subtitle_name: &str, subtitles: &str) -> anyhow::Result<Fixture> {
        let dir = tempfile::tempdir()?;
        let video = dir.path().join("video.mp4");
        let subs = dir.path().join(subtitle_name);
        fs::write(&video, b"not really a video")?;
        fs::write(&subs, subtitles)?;
        let req = RunRequest::new(video, subs, dir.path().join("out"));
        Ok(Fixture { dir, req })
    }

    const THREE_CUES: &str = "1\n00:00:00,000 --> 00:00:01,000\none\n\n\
                              2\n00:00:01,000 --> 00:00:02,500\ntwo\n\n\
                              3\n00:00:03,000 --> 00:00:04,000\nthree\n";

    #[test]
    fn produces_one_clip_per_cue_and_cleans_up() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", THREE_CUES)?;
        let segmenter = Segmenter::new(FakeToolkit::new(10_000), Opts::default());

        let outcome = segmenter.run(&fx.req, &mut crate::progress::NoProgress)?;
        let RunOutcome::Completed(report) = outcome else {
            panic!("expected a completed run");
        };

        assert_eq!(report.segments.len(), 3);
        assert_eq!(report.skipped, 0);
        assert!(report.manifest_path.exists());
        assert!(!fx.req.output_dir.join(TEMP_AUDIO_FILE).exists());

        let frames: Vec<usize> = segmenter
            .toolkit()
            .encoded
            .borrow()
            .iter()
            .map(|(_, f)| *f)
            .collect();
        assert_eq!(frames, vec![1_000, 1_500, 1_000]);

        for seg in &report.segments {
            assert!(Path::new(&seg.absolute_path).is_absolute());
            assert!(seg.absolute_path.ends_with(&seg.filename));
        }
        Ok(())
    }

    #[test]
    fn reports_documented_checkpoints() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", THREE_CUES)?;
        let segmenter = Segmenter::new(FakeToolkit::new(10_000), Opts::default());

        let mut events: Vec<Progress> = Vec::new();
        segmenter.run(&fx.req, &mut events)?;

        let percents: Vec<Option<u8>> = events.iter().map(|p| p.percent).collect();
        assert_eq!(
            percents,
            vec![
                Some(2),
                Some(10),
                Some(30),
                Some(35),
                Some(75), // 2 of 3 cues
                Some(95), // last cue
                Some(98),
                Some(100),
            ]
        );
        assert_eq!(events[5].message, "Processed 3/3 segments.");
        Ok(())
    }

    #[test]
    fn out_of_range_and_empty_windows_are_skipped() -> anyhow::Result<()> {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nin range\n\n\
                   2\n00:00:03,000 --> 00:00:03,000\nzero length\n\n\
                   3\n00:00:20,000 --> 00:00:21,000\npast the end\n";
        let fx = fixture("subs.srt", srt)?;
        let segmenter = Segmenter::new(FakeToolkit::new(5_000), Opts::default());

        let RunOutcome::Completed(report) = segmenter.run(&fx.req, &mut crate::progress::NoProgress)? else {
            panic!("expected a completed run");
        };

        assert_eq!(report.skipped, 2);
        assert_eq!(report.segments.len(), 1);
        assert_eq!(report.segments[0].text, "in range");

        let manifest = fs::read_to_string(&report.manifest_path)?;
        assert!(!manifest.contains("past the end"));
        Ok(())
    }

    #[test]
    fn zero_cues_short_circuits_without_output() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", "nothing that looks like a subtitle\n")?;
        let segmenter = Segmenter::new(FakeToolkit::new(10_000), Opts::default());

        let mut events: Vec<Progress> = Vec::new();
        let outcome = segmenter.run(&fx.req, &mut events)?;

        assert_eq!(outcome, RunOutcome::NoCues);
        assert!(!fx.req.output_dir.exists());
        let last = events.last().expect("a status message");
        assert_eq!(last.percent, Some(0));
        assert!(last.message.contains("No valid segments"));
        Ok(())
    }

    #[test]
    fn missing_input_fails_before_side_effects() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", THREE_CUES)?;
        let req = RunRequest::new(
            fx.dir.path().join("missing.mp4"),
            fx.req.subtitles.clone(),
            fx.req.output_dir.clone(),
        );
        let segmenter = Segmenter::new(FakeToolkit::new(10_000), Opts::default());

        let err = segmenter
            .run(&req, &mut crate::progress::NoProgress)
            .unwrap_err();
        assert!(matches!(err.root(), Error::InputNotFound(_)));
        assert!(!req.output_dir.exists());
        Ok(())
    }

    #[test]
    fn extraction_failure_is_fatal_and_reported() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", THREE_CUES)?;
        let mut toolkit = FakeToolkit::new(10_000);
        toolkit.fail_extract = true;
        let segmenter = Segmenter::new(toolkit, Opts::default());

        let mut events: Vec<Progress> = Vec::new();
        let err = segmenter.run(&fx.req, &mut events).unwrap_err();

        assert!(matches!(
            err,
            Error::Stage {
                stage: Stage::ExtractingAudio,
                ..
            }
        ));
        assert!(matches!(err.root(), Error::ExtractionFailure(_)));
        let last = events.last().expect("an error message");
        assert!(last.message.starts_with("Error: "));
        assert_eq!(last.percent, None);
        Ok(())
    }

    #[test]
    fn encoding_failure_keeps_earlier_clips_but_no_manifest() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", THREE_CUES)?;
        let mut toolkit = FakeToolkit::new(10_000);
        toolkit.fail_encode_at = Some(1);
        let segmenter = Segmenter::new(toolkit, Opts::default());

        let err = segmenter
            .run(&fx.req, &mut crate::progress::NoProgress)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Stage {
                stage: Stage::Slicing,
                ..
            }
        ));
        let encoded = segmenter.toolkit().encoded.borrow();
        assert_eq!(encoded.len(), 1);
        assert!(encoded[0].0.exists());
        assert!(!fx.req.output_dir.join("metadata.csv").exists());
        assert!(!fx.req.output_dir.join(TEMP_AUDIO_FILE).exists());
        Ok(())
    }

    #[test]
    fn invalid_srt_timestamp_fails_parsing() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", "1\n00:00:01.000 --> 00:00:02,000\nbad\n")?;
        let segmenter = Segmenter::new(FakeToolkit::new(10_000), Opts::default());

        let err = segmenter
            .run(&fx.req, &mut crate::progress::NoProgress)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Stage {
                stage: Stage::ParsingSubtitles,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn lrc_input_uses_configured_trailing_duration() -> anyhow::Result<()> {
        let fx = fixture("song.lrc", "[00:00.00]a\n[00:01.00]b\n")?;
        let opts = Opts {
            trailing_duration_ms: 5_000,
            ..Opts::default()
        };
        let segmenter = Segmenter::new(FakeToolkit::new(10_000), opts);

        segmenter.run(&fx.req, &mut crate::progress::NoProgress)?;

        let frames: Vec<usize> = segmenter
            .toolkit()
            .encoded
            .borrow()
            .iter()
            .map(|(_, f)| *f)
            .collect();
        assert_eq!(frames, vec![1_000, 5_000]);
        Ok(())
    }

    #[test]
    fn opts_downmix_applies_to_every_clip() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", THREE_CUES)?;
        let mut toolkit = FakeToolkit::new(10_000);
        toolkit.channels = 2;
        let opts = Opts {
            downmix_to_mono: true,
            ..Opts::default()
        };
        let segmenter = Segmenter::new(toolkit, opts);

        segmenter.run(&fx.req, &mut crate::progress::NoProgress)?;

        assert_eq!(*segmenter.toolkit().encoded_channels.borrow(), vec![1, 1, 1]);
        Ok(())
    }

    #[test]
    fn stereo_stays_stereo_without_downmix() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", THREE_CUES)?;
        let mut toolkit = FakeToolkit::new(10_000);
        toolkit.channels = 2;
        let segmenter = Segmenter::new(toolkit, Opts::default());

        segmenter.run(&fx.req, &mut crate::progress::NoProgress)?;

        assert_eq!(*segmenter.toolkit().encoded_channels.borrow(), vec![2, 2, 2]);
        Ok(())
    }

    #[test]
    fn failed_cleanup_does_not_fail_the_run() -> anyhow::Result<()> {
        let fx = fixture("subs.srt", THREE_CUES)?;
        let mut toolkit = FakeToolkit::new(10_000);
        toolkit.extract_as_dir = true;
        let segmenter = Segmenter::new(toolkit, Opts::default());

        let mut events: Vec<Progress> = Vec::new();
        let outcome = segmenter.run(&fx.req, &mut events)?;
        let RunOutcome::Completed(report) = outcome else {
            panic!("expected a completed run");
        };

        assert_eq!(report.segments.len(), 3);
        assert!(report.manifest_path.exists());
        // The temp path could not be removed and is left behind.
        assert!(fx.req.output_dir.join(TEMP_AUDIO_FILE).is_dir());
        assert_eq!(events.last().and_then(|p| p.percent), Some(100));
        Ok(())
    }
}
