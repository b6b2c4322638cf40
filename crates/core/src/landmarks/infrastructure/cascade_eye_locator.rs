use image::imageops;

use crate::detection::domain::cascade_classifier::{CascadeClassifier, CascadeSettings};
use crate::landmarks::domain::eye_locator::{EyeLocator, LocatedEye, LocatedEyes};
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Eyes from a second cascade run inside the face region.
///
/// Eye sizes scale with the face width and height. Found regions are
/// returned in frame coordinates whatever their count.
pub struct CascadeEyeLocator {
    classifier: Box<dyn CascadeClassifier>,
    settings: CascadeSettings,
}

impl CascadeEyeLocator {
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

impl EyeLocator for CascadeEyeLocator {
    fn locate(
        &mut self,
        frame: &Frame,
        face: &Region,
    ) -> Result<Option<LocatedEyes>, PipelineError> {
        let Some(face) = face.clip(frame.width(), frame.height()) else {
            return Ok(Some(LocatedEyes {
                eyes: Vec::new(),
                landmarks: None,
            }));
        };

        let gray = frame.to_gray_image().ok_or_else(|| {
            PipelineError::Inference(format!(
                "cannot convert a {}-channel frame to gray",
                frame.channels()
            ))
        })?;
        let face_image = imageops::crop_imm(
            &gray,
            face.x as u32,
            face.y as u32,
            face.width as u32,
            face.height as u32,
        )
        .to_image();
        let params = self
            .settings
            .params_for(face.width as f64, face.height as f64);

        let eyes = self
            .classifier
            .detect_multi_scale(&face_image, &params)?
            .into_iter()
            .map(|r| {
                let region = r.offset(face.x, face.y);
                LocatedEye {
                    region,
                    center: region.center(),
                }
            })
            .collect();

        Ok(Some(LocatedEyes {
            eyes,
            landmarks: None,
        }))
    }
}
