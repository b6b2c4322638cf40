use super::alignment_target::AlignmentTarget;
use super::similarity_transform::SimilarityTransform;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::geometry::EyePair;

/// A face warped into the canonical layout.
#[derive(Clone, Debug)]
pub struct AlignedFace {
    pub crop: Frame,
    pub transform: SimilarityTransform,
}

/// Warps frames so the eyes land on the target layout.
pub struct FaceAligner {
    target: AlignmentTarget,
}

impl FaceAligner {
    pub fn new(target: AlignmentTarget) -> Result<Self, PipelineError> {
        target.validate()?;
        Ok(Self { target })
    }

    pub fn target(&self) -> &AlignmentTarget {
        &self.target
    }

    /// Produces a `width × height` crop with the same channel count as
    /// `frame`. `None` when the eyes coincide.
    pub fn align(&self, frame: &Frame, eyes: &EyePair) -> Option<AlignedFace> {
        let transform = SimilarityTransform::for_eyes(eyes, &self.target)?;
        let inverse = transform.inverse()?;
        let data = warp_affine(frame, &inverse, self.target.width, self.target.height);
        let crop = Frame::new(
            data,
            self.target.width,
            self.target.height,
            frame.channels(),
            frame.index(),
        );
        Some(AlignedFace { crop, transform })
    }
}

/// Inverse-maps every output pixel through `inverse` and samples the source
/// bilinearly. Samples outside the frame read as black.
fn warp_affine(
    frame: &Frame,
    inverse: &SimilarityTransform,
    out_width: u32,
    out_height: u32,
) -> Vec<u8> {
    let src = frame.data();
    let (src_w, src_h) = (frame.width() as i64, frame.height() as i64);
    let channels = frame.channels() as usize;
    let [[a, b, tx], [c, d, ty]] = inverse.matrix();

    let mut output = vec![0u8; out_width as usize * out_height as usize * channels];

    let sample = |x: i64, y: i64, ch: usize| -> f64 {
        if x >= 0 && x < src_w && y >= 0 && y < src_h {
            src[(y as usize * src_w as usize + x as usize) * channels + ch] as f64
        } else {
            0.0
        }
    };

    for oy in 0..out_height as usize {
        for ox in 0..out_width as usize {
            let (fx_out, fy_out) = (ox as f64, oy as f64);
            let sx = a * fx_out + b * fy_out + tx;
            let sy = c * fx_out + d * fy_out + ty;

            let x0 = sx.floor() as i64;
            let y0 = sy.floor() as i64;
            let fx = sx - x0 as f64;
            let fy = sy - y0 as f64;

            let base = (oy * out_width as usize + ox) * channels;
            for ch in 0..channels {
                let val = sample(x0, y0, ch) * (1.0 - fx) * (1.0 - fy)
                    + sample(x0 + 1, y0, ch) * fx * (1.0 - fy)
                    + sample(x0, y0 + 1, ch) * (1.0 - fx) * fy
                    + sample(x0 + 1, y0 + 1, ch) * fx * fy;
                output[base + ch] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    output
}
