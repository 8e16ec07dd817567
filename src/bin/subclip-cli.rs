use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use subclip::logging;
use subclip::{
    FfmpegConfig, FfmpegToolkit, ManifestFormat, MediaToolkit, NativeToolkit, Opts, Progress,
    RunOutcome, RunRequest, Segmenter,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ToolkitKind {
    /// Built-in decoder; clips are WAV.
    Native,
    /// External ffmpeg executable; clips are MP3.
    Ffmpeg,
}

#[derive(Parser, Debug)]
#[command(name = "subclip")]
#[command(about = "Slice a video's audio into one clip per subtitle line")]
struct Params {
    /// Source video (or audio) file.
    #[arg(long = "video")]
    video: PathBuf,

    /// Subtitle file (.srt or .lrc).
    #[arg(long = "subtitle")]
    subtitle: PathBuf,

    /// Directory for clips and the manifest (created if missing).
    #[arg(short = 'o', long = "output", default_value = "./output")]
    output: PathBuf,

    #[arg(long = "toolkit", value_enum, default_value_t = ToolkitKind::Native)]
    toolkit: ToolkitKind,

    /// ffmpeg executable used by `--toolkit ffmpeg`.
    #[arg(long = "ffmpeg", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// MP3 bitrate used by `--toolkit ffmpeg`.
    #[arg(long = "bitrate", default_value = "192k")]
    bitrate: String,

    /// Duration of the last LRC line, in milliseconds.
    #[arg(long = "trailing-ms", default_value_t = subclip::opts::DEFAULT_TRAILING_DURATION_MS)]
    trailing_ms: u64,

    #[arg(long = "manifest", value_enum, default_value_t = ManifestFormat::Csv)]
    manifest: ManifestFormat,

    /// Write the CSV manifest without a UTF-8 byte-order mark.
    #[arg(long = "no-bom", default_value_t = false)]
    no_bom: bool,

    /// Downmix clips to a single channel.
    #[arg(long = "mono", default_value_t = false)]
    mono: bool,
}

fn main() {
    logging::init();
    let params = Params::parse();

    if let Err(err) = run(params) {
        eprintln!("\nFatal Error: {err:#}");
        eprintln!("Please check that the media toolkit (and ffmpeg, if selected) is installed correctly.");
    }
}

fn run(params: Params) -> Result<()> {
    if !params.video.is_file() {
        println!("Error: Video file not found at {}", params.video.display());
        return Ok(());
    }
    if !params.subtitle.is_file() {
        println!(
            "Error: Subtitle file not found at {}",
            params.subtitle.display()
        );
        return Ok(());
    }

    let opts = Opts {
        trailing_duration_ms: params.trailing_ms,
        manifest_bom: !params.no_bom,
        manifest_format: params.manifest,
        downmix_to_mono: params.mono,
        ..Opts::default()
    };

    let toolkit: Box<dyn MediaToolkit + Send> = match params.toolkit {
        ToolkitKind::Native => Box::new(NativeToolkit::new().with_downmix(params.mono)),
        ToolkitKind::Ffmpeg => Box::new(FfmpegToolkit::new(FfmpegConfig {
            program: params.ffmpeg,
            bitrate: params.bitrate,
            downmix_to_mono: params.mono,
            ..FfmpegConfig::default()
        })),
    };

    let req = RunRequest::new(params.video, params.subtitle, params.output);

    println!("--- Starting Audio Segmentation ---");

    // The run happens on a worker; this thread only renders progress.
    let (tx, rx) = mpsc::channel::<Progress>();
    let worker = thread::spawn(move || {
        let segmenter = Segmenter::new(toolkit, opts);
        let mut tx = tx;
        segmenter.run(&req, &mut tx)
    });

    let pb = progress_bar();
    for event in rx {
        if let Some(percent) = event.percent {
            pb.set_position(percent as u64);
        }
        pb.println(event.to_string());
        pb.set_message(event.message);
    }
    pb.finish_and_clear();

    let outcome = worker
        .join()
        .map_err(|_| anyhow!("segmentation worker panicked"))??;

    match outcome {
        RunOutcome::NoCues => {}
        RunOutcome::Completed(report) => {
            println!(
                "{} clips written to {} ({} skipped), manifest: {}",
                report.segments.len(),
                report.segments_dir.display(),
                report.skipped,
                report.manifest_path.display()
            );
        }
    }

    Ok(())
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
