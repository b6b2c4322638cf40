use crate::shared::frame::Frame;

/// Receives the per-tick output of the pipeline.
pub trait FrameSink {
    /// `aligned` is present only on ticks that produced a crop.
    fn write(
        &mut self,
        annotated: &Frame,
        aligned: Option<&Frame>,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes buffered output. Default: no-op.
    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
