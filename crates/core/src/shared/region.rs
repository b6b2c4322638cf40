use super::geometry::Point;

/// Axis-aligned rectangle in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning `(x1, y1)`–`(x2, y2)`; corners may come in any order.
    /// Sizes saturate at `i32::MAX`.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (left, top) = (x1.min(x2), y1.min(y2));
        Self::new(
            left,
            top,
            x1.max(x2).saturating_sub(left),
            y1.max(y2).saturating_sub(top),
        )
    }

    /// Smallest integer rectangle covering every point, at least 1×1.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut x1, mut y1, mut x2, mut y2) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x1 = x1.min(p.x);
            y1 = y1.min(p.y);
            x2 = x2.max(p.x);
            y2 = y2.max(p.y);
        }
        let x = x1.floor() as i32;
        let y = y1.floor() as i32;
        let w = (x2.ceil() as i32 - x).max(1);
        let h = (y2.ceil() as i32 - y).max(1);
        Some(Self::new(x, y, w, h))
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Region {
        Region::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Region::new(
            x,
            y,
            self.right().max(other.right()).saturating_sub(x),
            self.bottom().max(other.bottom()).saturating_sub(y),
        )
    }

    /// True when `other` lies entirely inside `self` (shared edges allowed).
    pub fn contains(&self, other: &Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Clips to `[0, frame_w) × [0, frame_h)`; `None` if nothing remains.
    pub fn clip(&self, frame_w: u32, frame_h: u32) -> Option<Region> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(frame_w as i32);
        let y2 = self.bottom().min(frame_h as i32);
        let clipped = Region::new(x1, y1, x2 - x1, y2 - y1);
        (!clipped.is_empty()).then_some(clipped)
    }

    /// Grows every side by `fraction` of the corresponding dimension.
    pub fn expand(&self, fraction: f64) -> Region {
        let dx = (self.width as f64 * fraction).round() as i32;
        let dy = (self.height as f64 * fraction).round() as i32;
        Region::new(
            self.x - dx,
            self.y - dy,
            self.width + 2 * dx,
            self.height + 2 * dy,
        )
    }
}

/// A detected face region before validation.
///
/// `confidence` is `None` for cascade detectors, which carry no score and
/// are always accepted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub region: Region,
    pub confidence: Option<f32>,
}

impl Candidate {
    pub fn scored(region: Region, confidence: f32) -> Self {
        Self {
            region,
            confidence: Some(confidence),
        }
    }

    pub fn unscored(region: Region) -> Self {
        Self {
            region,
            confidence: None,
        }
    }
}
