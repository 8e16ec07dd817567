use std::io::Write;

use crate::Result;
use crate::manifest_encoder::ManifestEncoder;
use crate::segments::Segment;

/// Column headers, in file order.
pub const CSV_HEADER: [&str; 3] = ["Transcript Text", "Absolute Audio Path", "Hashed Filename"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A `ManifestEncoder` that writes comma-separated rows.
///
/// - The optional BOM and the header row are written lazily, so even an empty
///   manifest gets a header on `close`.
/// - Fields containing a comma, quote or line break are quoted, with embedded
///   quotes doubled. Rows end in `\r\n`.
pub struct CsvManifestEncoder<W: Write> {
    w: W,
    bom: bool,
    started: bool,
    closed: bool,
}

impl<W: Write> CsvManifestEncoder<W> {
    pub fn new(w: W, bom: bool) -> Self {
        Self {
            w,
            bom,
            started: false,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            if self.bom {
                self.w.write_all(UTF8_BOM)?;
            }
            self.write_row(&CSV_HEADER)?;
            self.started = true;
        }
        Ok(())
    }

    fn write_row(&mut self, fields: &[&str]) -> Result<()> {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.w.write_all(b",")?;
            }
            self.w.write_all(escape_field(field).as_bytes())?;
        }
        self.w.write_all(b"\r\n")?;
        Ok(())
    }
}

impl<W: Write> ManifestEncoder for CsvManifestEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        self.start_if_needed()?;
        self.write_row(&[
            seg.text.as_str(),
            seg.absolute_path.as_str(),
            seg.filename.as_str(),
        ])
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

fn escape_field(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}
