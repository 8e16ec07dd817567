use std::io::Write;

use crate::Result;
use crate::manifest_encoder::ManifestEncoder;
use crate::segments::Segment;

/// A `ManifestEncoder` that writes segments as a single JSON array.
///
/// Example output:
/// ```json
/// [
///   { "text": "hello", "absolute_path": "/out/audio_segments/seg_1a2b3c4d5e6f.wav", "filename": "seg_1a2b3c4d5e6f.wav" }
/// ]
/// ```
pub struct JsonManifestEncoder<W: Write> {
    w: W,

    /// Whether we have written the opening `[`.
    started: bool,

    /// Whether the next element is the first, so commas go between elements only.
    first: bool,

    closed: bool,
}

impl<W: Write> JsonManifestEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> ManifestEncoder for JsonManifestEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        serde_json::to_writer(&mut self.w, seg)?;
        Ok(())
    }

    /// Close the array and flush. Idempotent; an empty manifest is `[]`.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
