//! 2D point arithmetic shared by the locator, validator and aligner.

use serde::{Deserialize, Serialize};

/// A point in frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Integer pixel position, rounded to nearest.
    pub fn to_pixel(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// The two eye centres of one face, with `left.x <= right.x` in image space.
///
/// Built by the validator, which owns the left/right disambiguation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyePair {
    pub left: Point,
    pub right: Point,
}

impl EyePair {
    /// Orders two unordered eye centres: the smaller x becomes `left`.
    pub fn from_unordered(a: Point, b: Point) -> Self {
        if b.x < a.x {
            Self { left: b, right: a }
        } else {
            Self { left: a, right: b }
        }
    }

    pub fn center(&self) -> Point {
        self.left.midpoint(&self.right)
    }

    pub fn distance(&self) -> f64 {
        self.left.distance(&self.right)
    }
}
