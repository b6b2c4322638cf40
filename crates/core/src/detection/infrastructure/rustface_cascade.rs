//! `CascadeClassifier` backed by the `rustface` crate (SeetaFace FuSt
//! cascade).
//!
//! rustface merges overlapping windows internally, so `min_neighbors` has
//! no counterpart here. The pyramid step is `1 / scale_factor`.
//!
//! Only SeetaFace FuSt model files load. SeetaFace ships a face model but no
//! eye model, so the eye locator needs a FuSt cascade trained on eye crops.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::GrayImage;

use crate::detection::domain::cascade_classifier::{CascadeClassifier, CascadeParams};
use crate::shared::error::PipelineError;
use crate::shared::region::Region;

/// rustface refuses windows smaller than this.
const MIN_WINDOW: u32 = 20;

const DEFAULT_SCORE_THRESH: f64 = 2.0;
const DEFAULT_WINDOW_STEP: u32 = 4;

pub struct RustfaceCascade {
    model: rustface::model::Model,
    score_thresh: f64,
    window_step: u32,
}

impl RustfaceCascade {
    pub fn new(model_path: &Path) -> Result<Self, PipelineError> {
        let name = model_path.display().to_string();
        let file = File::open(model_path).map_err(|e| PipelineError::model_load(&name, e))?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| PipelineError::model_load(&name, e))?;
        log::info!("Loaded cascade model {name}");
        Ok(Self {
            model,
            score_thresh: DEFAULT_SCORE_THRESH,
            window_step: DEFAULT_WINDOW_STEP,
        })
    }
}

impl CascadeClassifier for RustfaceCascade {
    fn detect_multi_scale(
        &mut self,
        image: &GrayImage,
        params: &CascadeParams,
    ) -> Result<Vec<Region>, PipelineError> {
        let (w, h) = image.dimensions();
        if w < MIN_WINDOW || h < MIN_WINDOW {
            return Ok(Vec::new());
        }

        let (min_size, max_size) = window_limits(params);
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(min_size);
        if let Some(max) = max_size {
            detector.set_max_face_size(max);
        }
        detector.set_pyramid_scale_factor(pyramid_step(params.scale_factor));
        detector.set_score_thresh(self.score_thresh);
        detector.set_slide_window_step(self.window_step, self.window_step);

        let faces = detector.detect(&rustface::ImageData::new(image.as_raw(), w, h));
        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                Region::new(bbox.x(), bbox.y(), bbox.width() as i32, bbox.height() as i32)
            })
            .collect())
    }
}

/// Square window limits: the smaller side of `min_size` (at least 20) and
/// the larger side of `max_size` when bounded.
fn window_limits(params: &CascadeParams) -> (u32, Option<u32>) {
    let min = params.min_size.0.min(params.min_size.1).max(MIN_WINDOW);
    let max = params.max_size.0.max(params.max_size.1);
    let max = (max > 0).then(|| max.max(min));
    (min, max)
}

fn pyramid_step(scale_factor: f64) -> f32 {
    (1.0 / scale_factor).clamp(0.01, 0.99) as f32
}
