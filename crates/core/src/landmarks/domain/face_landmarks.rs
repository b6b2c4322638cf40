//! 68-point face landmarks (iBUG 300-W numbering).
//!
//! Points 36–41 outline the eye on the image's left for a frontal face and
//! 42–47 the eye on the image's right. Each eye's centre is the midpoint of
//! its two corners.

use std::ops::Range;

use crate::shared::error::PipelineError;
use crate::shared::geometry::Point;
use crate::shared::region::Region;

pub const LANDMARK_COUNT: usize = 68;

const LEFT_EYE: Range<usize> = 36..42;
const RIGHT_EYE: Range<usize> = 42..48;

/// Outer/inner corners of each eye.
const LEFT_EYE_CORNERS: (usize, usize) = (36, 39);
const RIGHT_EYE_CORNERS: (usize, usize) = (42, 45);

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    /// Fails with `FitFailure` unless exactly 68 points are given.
    pub fn new(points: Vec<Point>) -> Result<Self, PipelineError> {
        if points.len() != LANDMARK_COUNT {
            return Err(PipelineError::FitFailure(format!(
                "expected {LANDMARK_COUNT} landmarks, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn eye_contours(&self) -> [&[Point]; 2] {
        [&self.points[LEFT_EYE], &self.points[RIGHT_EYE]]
    }

    pub fn eye_centers(&self) -> [Point; 2] {
        let mid = |(a, b): (usize, usize)| self.points[a].midpoint(&self.points[b]);
        [mid(LEFT_EYE_CORNERS), mid(RIGHT_EYE_CORNERS)]
    }

    /// Points 36, 39, 42 and 45.
    pub fn eye_corners(&self) -> [Point; 4] {
        [
            self.points[LEFT_EYE_CORNERS.0],
            self.points[LEFT_EYE_CORNERS.1],
            self.points[RIGHT_EYE_CORNERS.0],
            self.points[RIGHT_EYE_CORNERS.1],
        ]
    }

    /// Bounding boxes of the two eye contours.
    pub fn eye_regions(&self) -> [Region; 2] {
        let [left, right] = self.eye_contours();
        // Contours are never empty: the point count is fixed at construction.
        let bound = |pts: &[Point]| Region::bounding(pts).unwrap_or(Region::new(0, 0, 1, 1));
        [bound(left), bound(right)]
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Synthetic landmarks with eye corners at the given centres, each eye
    /// `eye_w` wide and `eye_h` tall. Non-eye points sit at `centre`.
    pub fn landmarks_with_eyes(left: Point, right: Point, eye_w: f64, eye_h: f64) -> FaceLandmarks {
        let centre = left.midpoint(&right);
        let mut points = vec![centre; LANDMARK_COUNT];
        for (start, c) in [(36usize, left), (42usize, right)] {
            let (hw, hh) = (eye_w / 2.0, eye_h / 2.0);
            points[start] = Point::new(c.x - hw, c.y);
            points[start + 1] = Point::new(c.x - hw / 2.0, c.y - hh);
            points[start + 2] = Point::new(c.x + hw / 2.0, c.y - hh);
            points[start + 3] = Point::new(c.x + hw, c.y);
            points[start + 4] = Point::new(c.x + hw / 2.0, c.y + hh);
            points[start + 5] = Point::new(c.x - hw / 2.0, c.y + hh);
        }
        FaceLandmarks::new(points).unwrap()
    }
}
