use crate::shared::frame::Frame;

/// Pull-based supplier of frames, one tick at a time.
///
/// Implementations own the decoding details; the stream driver only sees
/// [`Frame`]s in presentation order with consecutive indices.
pub trait FrameSource {
    /// Returns the next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Number of frames when known up front. `None` for capture devices.
    fn len_hint(&self) -> Option<usize> {
        None
    }
}
