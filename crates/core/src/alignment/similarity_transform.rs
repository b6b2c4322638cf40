//! 2×3 similarity transforms (uniform scale, rotation, translation).
//!
//! The matrix layout follows the classic rotation-about-a-centre form:
//!
//! ```text
//! |  α  β  (1-α)·cx - β·cy |
//! | -β  α  β·cx + (1-α)·cy |      α = s·cos θ,  β = s·sin θ
//! ```
//!
//! A positive angle rotates the image content counter-clockwise as seen on
//! screen (y axis pointing down).

use super::alignment_target::AlignmentTarget;
use crate::shared::geometry::{EyePair, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityTransform {
    m: [[f64; 3]; 2],
}

impl SimilarityTransform {
    /// Rotation by `angle_deg` and uniform `scale` about `center`.
    pub fn rotation_about(center: Point, angle_deg: f64, scale: f64) -> Self {
        let theta = angle_deg.to_radians();
        let alpha = scale * theta.cos();
        let beta = scale * theta.sin();
        Self {
            m: [
                [alpha, beta, (1.0 - alpha) * center.x - beta * center.y],
                [-beta, alpha, beta * center.x + (1.0 - alpha) * center.y],
            ],
        }
    }

    /// Transform that levels the eye line, scales the inter-ocular distance
    /// to the target spacing and moves the eyes' midpoint to
    /// `(width * 0.5, height * eye_y)`.
    ///
    /// The angle is `atan2(dY, dX)` with no offset, so a horizontal eye line
    /// gives 0°. Returns `None` for coincident eyes.
    pub fn for_eyes(eyes: &EyePair, target: &AlignmentTarget) -> Option<Self> {
        let distance = eyes.distance();
        if !distance.is_finite() || distance <= f64::EPSILON {
            return None;
        }

        let scale = target.eye_spacing() / distance;
        let angle = eye_line_angle(eyes);
        let center = eyes.center();

        let mut transform = Self::rotation_about(center, angle, scale);
        let dest = target.eyes_center();
        transform.m[0][2] += dest.x - center.x;
        transform.m[1][2] += dest.y - center.y;
        Some(transform)
    }

    pub fn matrix(&self) -> [[f64; 3]; 2] {
        self.m
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2],
            self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2],
        )
    }

    pub fn inverse(&self) -> Option<Self> {
        let [[a, b, tx], [c, d, ty]] = self.m;
        let det = a * d - b * c;
        if det.abs() <= f64::EPSILON {
            return None;
        }
        let (ia, ib, ic, id) = (d / det, -b / det, -c / det, a / det);
        Some(Self {
            m: [
                [ia, ib, -(ia * tx + ib * ty)],
                [ic, id, -(ic * tx + id * ty)],
            ],
        })
    }

    pub fn scale(&self) -> f64 {
        self.m[0][0].hypot(self.m[0][1])
    }

    /// Rotation angle in degrees, same sign convention as [`Self::rotation_about`].
    pub fn angle_degrees(&self) -> f64 {
        self.m[0][1].atan2(self.m[0][0]).to_degrees()
    }
}

/// Angle of the eye line, `atan2(dY, dX)` in degrees.
pub fn eye_line_angle(eyes: &EyePair) -> f64 {
    let dx = eyes.right.x - eyes.left.x;
    let dy = eyes.right.y - eyes.left.y;
    dy.atan2(dx).to_degrees()
}
