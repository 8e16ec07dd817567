use crate::Result;
use crate::segments::Segment;

pub trait ManifestEncoder {
    fn write_segment(&mut self, seg: &Segment) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
