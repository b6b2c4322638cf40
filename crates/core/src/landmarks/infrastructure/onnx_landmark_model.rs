/// 68-point landmark regressor using ONNX Runtime via `ort`.
///
/// The face crop (with a margin) is resized to the model's square input and
/// scaled to [0, 1]. The model emits 136 values, `(x, y)` pairs normalized to
/// the crop, which are mapped back to frame coordinates.
use std::path::Path;

use image::imageops::{self, FilterType};

use crate::landmarks::domain::face_landmarks::{FaceLandmarks, LANDMARK_COUNT};
use crate::landmarks::domain::landmark_model::LandmarkModel;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;
use crate::shared::onnx_session;
use crate::shared::region::Region;

/// Fallback input resolution when the model's input shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 112;

pub const DEFAULT_MARGIN: f64 = 0.1;

pub struct OnnxLandmarkModel {
    session: ort::session::Session,
    input_size: u32,
    margin: f64,
}

impl OnnxLandmarkModel {
    pub fn new(model_path: &Path, margin: f64) -> Result<Self, PipelineError> {
        if !(0.0..=1.0).contains(&margin) {
            return Err(PipelineError::Config(format!(
                "landmark crop margin must be in [0.0, 1.0], got {margin}"
            )));
        }
        let session = onnx_session::load_session(model_path)?;
        let input_size = onnx_session::declared_input_size(&session).unwrap_or(DEFAULT_INPUT_SIZE);
        log::debug!("Landmark model input size {input_size}");
        Ok(Self {
            session,
            input_size,
            margin,
        })
    }
}

impl LandmarkModel for OnnxLandmarkModel {
    fn fit(&mut self, frame: &Frame, face: &Region) -> Result<FaceLandmarks, PipelineError> {
        let crop = face
            .expand(self.margin)
            .clip(frame.width(), frame.height())
            .ok_or_else(|| PipelineError::FitFailure("face region outside frame".into()))?;
        let tensor = preprocess(frame, &crop, self.input_size)?;

        let input_value = ort::value::Tensor::from_array(tensor)
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        if outputs.len() == 0 {
            return Err(PipelineError::FitFailure(
                "landmark model produced no outputs".into(),
            ));
        }
        let array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        let values: Vec<f32> = array.iter().copied().collect();

        decode_landmarks(&values, &crop)
    }
}

/// Crop, resize and scale to [0, 1], NCHW float32 in RGB order.
fn preprocess(
    frame: &Frame,
    crop: &Region,
    input_size: u32,
) -> Result<ndarray::Array4<f32>, PipelineError> {
    let rgb = frame
        .to_rgb_image()
        .ok_or_else(|| PipelineError::Inference("landmark model requires RGB frames".into()))?;
    let face = imageops::crop_imm(
        &rgb,
        crop.x as u32,
        crop.y as u32,
        crop.width as u32,
        crop.height as u32,
    )
    .to_image();
    let resized = imageops::resize(&face, input_size, input_size, FilterType::Triangle);

    let n = input_size as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, n, n));
    for (x, y, px) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = px.0[c] as f32 / 255.0;
        }
    }
    Ok(tensor)
}

fn decode_landmarks(values: &[f32], crop: &Region) -> Result<FaceLandmarks, PipelineError> {
    if values.len() != LANDMARK_COUNT * 2 {
        return Err(PipelineError::FitFailure(format!(
            "expected {} landmark values, got {}",
            LANDMARK_COUNT * 2,
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::FitFailure("non-finite landmark output".into()));
    }

    let points = values
        .chunks_exact(2)
        .map(|xy| {
            Point::new(
                crop.x as f64 + xy[0] as f64 * crop.width as f64,
                crop.y as f64 + xy[1] as f64 * crop.height as f64,
            )
        })
        .collect();
    FaceLandmarks::new(points)
}
