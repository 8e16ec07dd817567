//! Manifest output: one row per produced clip, written in a single pass.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::Result;
use crate::csv_manifest_encoder::CsvManifestEncoder;
use crate::json_manifest_encoder::JsonManifestEncoder;
use crate::manifest_encoder::ManifestEncoder;
use crate::manifest_format::ManifestFormat;
use crate::segments::Segment;

/// Create (or truncate) `path` and write every segment in order.
pub fn write_manifest(
    path: &Path,
    format: ManifestFormat,
    bom: bool,
    segments: &[Segment],
) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);

    match format {
        ManifestFormat::Csv => encode_all(&mut CsvManifestEncoder::new(writer, bom), segments),
        ManifestFormat::Json => encode_all(&mut JsonManifestEncoder::new(writer), segments),
    }
}

fn encode_all(encoder: &mut dyn ManifestEncoder, segments: &[Segment]) -> Result<()> {
    let run_res = segments.iter().try_for_each(|seg| encoder.write_segment(seg));
    merge_run_and_close(run_res, encoder.close())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), close_res) => close_res,
        (Err(err), _) => Err(err),
    }
}
