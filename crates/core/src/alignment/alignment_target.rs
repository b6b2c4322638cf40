use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_ALIGNED_SIZE, DEFAULT_EYE_POSITION, MIN_ALIGNED_SIZE};
use crate::shared::error::PipelineError;
use crate::shared::geometry::Point;

/// Canonical layout every aligned crop conforms to.
///
/// `eye_x`/`eye_y` place the left eye as fractions of the output size; the
/// right eye mirrors it about the vertical centre line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentTarget {
    pub width: u32,
    pub height: u32,
    pub eye_x: f64,
    pub eye_y: f64,
}

impl Default for AlignmentTarget {
    fn default() -> Self {
        Self {
            width: DEFAULT_ALIGNED_SIZE,
            height: DEFAULT_ALIGNED_SIZE,
            eye_x: DEFAULT_EYE_POSITION.0,
            eye_y: DEFAULT_EYE_POSITION.1,
        }
    }
}

impl AlignmentTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_eye_position(mut self, eye_x: f64, eye_y: f64) -> Self {
        self.eye_x = eye_x;
        self.eye_y = eye_y;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.width <= MIN_ALIGNED_SIZE || self.height <= MIN_ALIGNED_SIZE {
            return Err(PipelineError::Config(format!(
                "aligned crop must be larger than {MIN_ALIGNED_SIZE}px per side, got {}x{}",
                self.width, self.height
            )));
        }
        // eye_x == 0.5 would put both eyes on the centre line.
        if !(0.0..0.5).contains(&self.eye_x) {
            return Err(PipelineError::Config(format!(
                "eye x position must be in [0.0, 0.5), got {}",
                self.eye_x
            )));
        }
        if !(0.0..=1.0).contains(&self.eye_y) {
            return Err(PipelineError::Config(format!(
                "eye y position must be in [0.0, 1.0], got {}",
                self.eye_y
            )));
        }
        Ok(())
    }

    pub fn left_eye(&self) -> Point {
        Point::new(
            self.eye_x * self.width as f64,
            self.eye_y * self.height as f64,
        )
    }

    pub fn right_eye(&self) -> Point {
        Point::new(
            (1.0 - self.eye_x) * self.width as f64,
            self.eye_y * self.height as f64,
        )
    }

    /// Where the midpoint between the eyes lands in the crop.
    pub fn eyes_center(&self) -> Point {
        Point::new(self.width as f64 * 0.5, self.height as f64 * self.eye_y)
    }

    /// Desired inter-ocular distance in output pixels.
    pub fn eye_spacing(&self) -> f64 {
        (1.0 - 2.0 * self.eye_x) * self.width as f64
    }
}
