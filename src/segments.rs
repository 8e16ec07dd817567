use serde::Serialize;

/// One produced clip, as listed in the manifest.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Cue text the clip was cut for.
    pub text: String,
    /// Absolute path of the clip on disk.
    pub absolute_path: String,
    /// `seg_<hash>.<ext>`.
    pub filename: String,
}
