use crate::landmarks::domain::eye_locator::{EyeLocator, LocatedEye, LocatedEyes};
use crate::landmarks::domain::landmark_model::LandmarkModel;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Eyes from a 68-point landmark fit.
///
/// A fit failure is reported as "no landmarks" and never propagated.
pub struct LandmarkEyeLocator {
    model: Box<dyn LandmarkModel>,
}

impl LandmarkEyeLocator {
    pub fn new(model: Box<dyn LandmarkModel>) -> Self {
        Self { model }
    }
}

impl EyeLocator for LandmarkEyeLocator {
    fn locate(
        &mut self,
        frame: &Frame,
        face: &Region,
    ) -> Result<Option<LocatedEyes>, PipelineError> {
        let landmarks = match self.model.fit(frame, face) {
            Ok(landmarks) => landmarks,
            Err(PipelineError::FitFailure(reason)) => {
                log::debug!("Frame {}: landmark fit failed: {reason}", frame.index());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let eyes = landmarks
            .eye_regions()
            .into_iter()
            .zip(landmarks.eye_centers())
            .map(|(region, center)| LocatedEye { region, center })
            .collect();

        Ok(Some(LocatedEyes {
            eyes,
            landmarks: Some(landmarks),
        }))
    }
}
