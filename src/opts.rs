use crate::manifest_format::ManifestFormat;

/// Default length of the last LRC cue, which has no following cue to end it.
pub const DEFAULT_TRAILING_DURATION_MS: u64 = 3_000;

/// Options that control how a run is performed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI maps user input into this type so other frontends (GUIs, batch jobs,
/// tests) can construct options programmatically.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Duration given to the final LRC cue.
    pub trailing_duration_ms: u64,

    /// Whether the CSV manifest starts with a UTF-8 byte-order mark.
    ///
    /// Spreadsheet tools use the BOM to detect UTF-8; plain CSV consumers may not want it.
    pub manifest_bom: bool,

    pub manifest_format: ManifestFormat,

    /// Subdirectory of the output directory that receives the clips.
    pub segments_subdir: String,

    /// How many leading characters of the cue text feed the filename hash.
    pub snippet_chars: usize,

    /// Report slicing progress every N cues (and always on the last one).
    pub progress_every: usize,

    /// Average all channels into one before writing clips.
    ///
    /// Applied to the loaded track, so it works with any toolkit. Toolkits that
    /// can downmix during extraction have their own flag for that.
    pub downmix_to_mono: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            trailing_duration_ms: DEFAULT_TRAILING_DURATION_MS,
            manifest_bom: true,
            manifest_format: ManifestFormat::Csv,
            segments_subdir: "audio_segments".to_owned(),
            snippet_chars: 10,
            progress_every: 2,
            downmix_to_mono: false,
        }
    }
}
