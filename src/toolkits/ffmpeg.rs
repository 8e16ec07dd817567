use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::audio::{AudioBuffer, AudioClip};
use crate::toolkit::MediaToolkit;
use crate::toolkits::remove_partial;
use crate::wav::{pcm16_bytes, read_wav_file};
use crate::{Error, Result};

/// How to launch the `ffmpeg` executable.
///
/// Hosts that bundle their own binary or need platform-specific flags supply
/// this at startup; the segmenter never looks at it.
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// Executable to run. A bare name is resolved through `PATH`.
    pub program: PathBuf,

    /// Extra arguments placed before the per-call ones (e.g. `-threads 2`).
    pub global_args: Vec<String>,

    /// MP3 bitrate handed to `-b:a`.
    pub bitrate: String,

    /// Downmix to a single channel during extraction.
    pub downmix_to_mono: bool,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            global_args: Vec::new(),
            bitrate: "192k".to_owned(),
            downmix_to_mono: false,
        }
    }
}

/// Toolkit that shells out to `ffmpeg`.
///
/// - extraction: `ffmpeg -i <video> -vn -c:a pcm_s16le <dest>`
/// - clips: in-memory WAV piped to `ffmpeg`, encoded as MP3
#[derive(Debug, Clone, Default)]
pub struct FfmpegToolkit {
    config: FfmpegConfig,
}

impl FfmpegToolkit {
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FfmpegConfig {
        &self.config
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y"])
            .args(&self.config.global_args);
        cmd
    }

    fn extract_args(&self, video: &Path, dest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-i".into(),
            video.into(),
            "-vn".into(),
            "-c:a".into(),
            "pcm_s16le".into(),
        ];
        if self.config.downmix_to_mono {
            args.push("-ac".into());
            args.push("1".into());
        }
        args.push(dest.into());
        args
    }

    fn encode_args(&self, out: &Path) -> Vec<OsString> {
        vec![
            "-f".into(),
            "wav".into(),
            "-i".into(),
            "pipe:0".into(),
            "-c:a".into(),
            "libmp3lame".into(),
            "-b:a".into(),
            self.config.bitrate.clone().into(),
            out.into(),
        ]
    }
}

impl MediaToolkit for FfmpegToolkit {
    fn clip_extension(&self) -> &str {
        "mp3"
    }

    fn extract_audio(&self, video: &Path, dest: &Path) -> Result<()> {
        let args = self.extract_args(video, dest);
        debug!(program = %self.config.program.display(), ?args, "running ffmpeg extraction");

        let output = self
            .command()
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                Error::ExtractionFailure(format!(
                    "failed to run {}: {e}",
                    self.config.program.display()
                ))
            })?;

        if !output.status.success() {
            remove_partial(dest);
            return Err(Error::ExtractionFailure(stderr_summary(
                &output.stderr,
                output.status,
            )));
        }

        Ok(())
    }

    fn load(&self, decoded: &Path) -> Result<AudioBuffer> {
        Ok(read_wav_file(decoded)?)
    }

    fn encode(&self, clip: &AudioClip, out: &Path) -> Result<()> {
        let failure = |message: String| Error::EncodingFailure {
            path: out.to_path_buf(),
            message,
        };

        let wav = pcm16_bytes(clip).map_err(|e| failure(format!("{e:#}")))?;

        let mut child = self
            .command()
            .args(self.encode_args(out))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failure(format!("failed to run {}: {e}", self.config.program.display())))?;

        // `-loglevel error` keeps stderr small, so writing stdin first can't stall on a full pipe.
        let write_res = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&wav),
            None => Err(std::io::Error::other("ffmpeg stdin was not captured")),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| failure(format!("failed waiting for ffmpeg: {e}")))?;

        if !output.status.success() {
            return Err(failure(stderr_summary(&output.stderr, output.status)));
        }
        write_res.map_err(|e| failure(format!("failed to stream audio to ffmpeg: {e}")))?;

        Ok(())
    }
}

/// The last few non-empty stderr lines, or the exit status when ffmpeg said nothing.
fn stderr_summary(stderr: &[u8], status: std::process::ExitStatus) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return format!("ffmpeg exited with {status}");
    }

    let tail = lines.len().saturating_sub(5);
    lines[tail..].join("; ")
}
