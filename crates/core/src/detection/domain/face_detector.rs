use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::region::Candidate;

/// Domain interface for face detection.
///
/// Implementations own their model handles, hence `&mut self`. Returned
/// regions are clipped to the frame and never empty. Strategies without a
/// score ignore `confidence_threshold` and return unscored candidates.
pub trait FaceDetector {
    fn detect(
        &mut self,
        frame: &Frame,
        confidence_threshold: f32,
    ) -> Result<Vec<Candidate>, PipelineError>;
}
