/// Single-shot face detector (ResNet-10 SSD, 300×300) using ONNX Runtime via `ort`.
///
/// The network emits `[1, 1, N, 7]` rows of
/// `(image_id, class_id, confidence, x1, y1, x2, y2)` with corners
/// normalized to the frame.
use std::path::Path;

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::onnx_session;
use crate::shared::region::{Candidate, Region};

const ROW_LEN: usize = 7;

/// Blob preparation for the SSD input tensor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsdConfig {
    pub input_size: u32,
    /// Per-channel means in B, G, R order.
    pub mean_bgr: [f32; 3],
    /// When true the tensor is in RGB channel order, otherwise BGR.
    pub swap_rb: bool,
    pub scale: f32,
}

impl Default for SsdConfig {
    fn default() -> Self {
        Self {
            input_size: 300,
            mean_bgr: [103.93, 116.77, 123.68],
            swap_rb: true,
            scale: 1.0,
        }
    }
}

pub struct OnnxSsdDetector {
    session: ort::session::Session,
    config: SsdConfig,
}

impl OnnxSsdDetector {
    pub fn new(model_path: &Path, config: SsdConfig) -> Result<Self, PipelineError> {
        if config.input_size == 0 {
            return Err(PipelineError::Config("SSD input size must be positive".into()));
        }
        let session = onnx_session::load_session(model_path)?;
        Ok(Self { session, config })
    }
}

impl FaceDetector for OnnxSsdDetector {
    fn detect(
        &mut self,
        frame: &Frame,
        confidence_threshold: f32,
    ) -> Result<Vec<Candidate>, PipelineError> {
        let tensor = preprocess(frame, &self.config)?;

        let input_value = ort::value::Tensor::from_array(tensor)
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        if outputs.len() == 0 {
            return Err(PipelineError::Inference(
                "SSD model produced no outputs".into(),
            ));
        }
        let array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        let shape = array.shape().to_vec();
        let data: Vec<f32> = array.iter().copied().collect();

        parse_detections(
            &shape,
            &data,
            frame.width(),
            frame.height(),
            confidence_threshold,
        )
    }
}

/// Resize to the square input and subtract channel means, NCHW float32.
fn preprocess(frame: &Frame, config: &SsdConfig) -> Result<ndarray::Array4<f32>, PipelineError> {
    let rgb = frame
        .to_rgb_image()
        .ok_or_else(|| PipelineError::Inference("SSD detector requires RGB frames".into()))?;
    let size = config.input_size;
    let resized = imageops::resize(&rgb, size, size, FilterType::Triangle);

    let n = size as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, n, n));
    for (x, y, px) in resized.enumerate_pixels() {
        for c in 0..3 {
            // Tensor channel c reads RGB channel c (swapped) or 2 - c (BGR).
            let (src, mean) = if config.swap_rb {
                (px.0[c], config.mean_bgr[2 - c])
            } else {
                (px.0[2 - c], config.mean_bgr[c])
            };
            tensor[[0, c, y as usize, x as usize]] = (src as f32 - mean) * config.scale;
        }
    }
    Ok(tensor)
}

/// Converts raw SSD rows to clipped pixel candidates scoring above
/// `threshold`. Corners are truncated toward zero.
fn parse_detections(
    shape: &[usize],
    data: &[f32],
    frame_w: u32,
    frame_h: u32,
    threshold: f32,
) -> Result<Vec<Candidate>, PipelineError> {
    let well_formed = shape.len() == 4
        && shape[0] == 1
        && shape[1] == 1
        && shape[3] == ROW_LEN
        && data.len() == shape[2] * ROW_LEN;
    if !well_formed {
        return Err(PipelineError::Inference(format!(
            "unexpected SSD output shape {shape:?} ({} values)",
            data.len()
        )));
    }

    let (fw, fh) = (frame_w as f32, frame_h as f32);
    let candidates = data
        .chunks_exact(ROW_LEN)
        .filter(|row| row[2] > threshold)
        .filter_map(|row| {
            // Coordinates are normalized; anything outside [0, 1] is off-frame.
            let x1 = (row[3].clamp(0.0, 1.0) * fw) as i32;
            let y1 = (row[4].clamp(0.0, 1.0) * fh) as i32;
            let x2 = (row[5].clamp(0.0, 1.0) * fw) as i32;
            let y2 = (row[6].clamp(0.0, 1.0) * fh) as i32;
            Region::from_corners(x1, y1, x2, y2)
                .clip(frame_w, frame_h)
                .map(|region| Candidate::scored(region, row[2]))
        })
        .collect();
    Ok(candidates)
}
