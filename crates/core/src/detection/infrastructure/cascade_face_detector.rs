use crate::detection::domain::cascade_classifier::{CascadeClassifier, CascadeSettings};
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::region::Candidate;

/// Face detection through a multi-scale cascade classifier.
///
/// Size limits scale with `sqrt(frame area)`. Cascades carry no score, so
/// candidates are unscored and the confidence threshold is ignored.
pub struct CascadeFaceDetector {
    classifier: Box<dyn CascadeClassifier>,
    settings: CascadeSettings,
}

impl CascadeFaceDetector {
    pub fn new(
        classifier: Box<dyn CascadeClassifier>,
        settings: CascadeSettings,
    ) -> Result<Self, PipelineError> {
        settings.validate()?;
        Ok(Self {
            classifier,
            settings,
        })
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(
        &mut self,
        frame: &Frame,
        _confidence_threshold: f32,
    ) -> Result<Vec<Candidate>, PipelineError> {
        let gray = frame.to_gray_image().ok_or_else(|| {
            PipelineError::Inference(format!(
                "cannot convert a {}-channel frame to gray",
                frame.channels()
            ))
        })?;
        let side = frame.area().sqrt();
        let params = self.settings.params_for(side, side);

        let regions = self.classifier.detect_multi_scale(&gray, &params)?;
        Ok(regions
            .into_iter()
            .filter_map(|r| r.clip(frame.width(), frame.height()))
            .map(Candidate::unscored)
            .collect())
    }
}
