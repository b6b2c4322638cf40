//! Multi-scale sliding-window classifier contract shared by the face
//! detector and the eye locator.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::shared::error::PipelineError;
use crate::shared::region::Region;

/// Search parameters for one `detect_multi_scale` call. Sizes are in pixels;
/// a zero `max_size` dimension means unbounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CascadeParams {
    pub scale_factor: f64,
    pub min_neighbors: u32,
    pub min_size: (u32, u32),
    pub max_size: (u32, u32),
}

pub trait CascadeClassifier {
    fn detect_multi_scale(
        &mut self,
        image: &GrayImage,
        params: &CascadeParams,
    ) -> Result<Vec<Region>, PipelineError>;
}

/// Configurable form of [`CascadeParams`] with sizes as fractions of a
/// reference extent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeSettings {
    pub scale_factor: f64,
    pub min_neighbors: u32,
    pub min_size_fraction: f64,
    pub max_size_fraction: f64,
}

impl Default for CascadeSettings {
    fn default() -> Self {
        Self::for_faces()
    }
}

impl CascadeSettings {
    /// Faces between 5% and 55% of `sqrt(frame area)`.
    pub fn for_faces() -> Self {
        Self {
            scale_factor: 1.2,
            min_neighbors: 3,
            min_size_fraction: 0.05,
            max_size_fraction: 0.55,
        }
    }

    /// Eyes between 10% and 30% of the face size.
    pub fn for_eyes() -> Self {
        Self {
            min_size_fraction: 0.10,
            max_size_fraction: 0.30,
            ..Self::for_faces()
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.scale_factor.is_nan() || self.scale_factor <= 1.0 {
            return Err(PipelineError::Config(format!(
                "cascade scale factor must be greater than 1.0, got {}",
                self.scale_factor
            )));
        }
        if self.min_neighbors < 1 {
            return Err(PipelineError::Config(
                "cascade min_neighbors must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_size_fraction)
            || !(0.0..=1.0).contains(&self.max_size_fraction)
            || self.min_size_fraction > self.max_size_fraction
        {
            return Err(PipelineError::Config(format!(
                "cascade size fractions must satisfy 0 <= min <= max <= 1, got {} and {}",
                self.min_size_fraction, self.max_size_fraction
            )));
        }
        Ok(())
    }

    /// Pixel parameters for a reference extent of `width × height`.
    pub fn params_for(&self, width: f64, height: f64) -> CascadeParams {
        let px = |extent: f64, fraction: f64| (extent * fraction).round().max(0.0) as u32;
        CascadeParams {
            scale_factor: self.scale_factor,
            min_neighbors: self.min_neighbors,
            min_size: (
                px(width, self.min_size_fraction),
                px(height, self.min_size_fraction),
            ),
            max_size: (
                px(width, self.max_size_fraction),
                px(height, self.max_size_fraction),
            ),
        }
    }
}
