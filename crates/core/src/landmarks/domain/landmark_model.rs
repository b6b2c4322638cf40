use super::face_landmarks::FaceLandmarks;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// A landmark regressor fitted to one face region at a time.
///
/// Returns points in frame coordinates, or `FitFailure` when the model
/// cannot produce a 68-point set.
pub trait LandmarkModel {
    fn fit(&mut self, frame: &Frame, face: &Region) -> Result<FaceLandmarks, PipelineError>;
}
