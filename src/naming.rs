/// Hex characters of the digest kept in a clip's filename.
pub const HASH_CHARS: usize = 12;

/// Deterministic clip filename: `seg_<12 hex>.<ext>`.
///
/// The hash covers `"{index}-{snippet}"` where `snippet` is the first
/// `snippet_chars` characters of `text`. Identical subtitle files therefore
/// reproduce identical names, and the index keeps apart cues whose text starts
/// the same way. Collisions are not detected.
pub fn segment_filename(index: usize, text: &str, snippet_chars: usize, ext: &str) -> String {
    let snippet: String = text.chars().take(snippet_chars).collect();
    let digest = md5::compute(format!("{index}-{snippet}").as_bytes());
    let hex = format!("{digest:x}");

    format!("seg_{}.{ext}", &hex[..HASH_CHARS])
}
