//! Geometric sanity checks between detection and alignment.
//!
//! Every check is a pure function returning `Result<_, Rejection>`; a
//! rejection is an expected per-frame outcome, not an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::landmarks::domain::eye_locator::LocatedEye;
use crate::shared::error::PipelineError;
use crate::shared::geometry::EyePair;
use crate::shared::region::{Candidate, Region};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Eye-line box must be strictly wider than `aspect * height`.
    pub eye_line_min_aspect: f64,
    /// Unset follows the detector: only the cascade detector computes it.
    pub check_face_ratio: Option<bool>,
    pub face_ratio_min_percent: f64,
    pub face_ratio_max_percent: f64,
    /// Unset follows the locator: only the multi-region cascade locator
    /// checks that the eye line sits inside the face.
    pub check_containment: Option<bool>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            eye_line_min_aspect: 2.0,
            check_face_ratio: None,
            face_ratio_min_percent: 5.0,
            face_ratio_max_percent: 55.0,
            check_containment: None,
        }
    }
}

impl ValidationConfig {
    /// Fills the unset checks from the strategy pair in use. Explicit
    /// settings are kept.
    pub fn resolved(self, cascade_detector: bool, cascade_locator: bool) -> Self {
        Self {
            check_face_ratio: Some(self.check_face_ratio.unwrap_or(cascade_detector)),
            check_containment: Some(self.check_containment.unwrap_or(cascade_locator)),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.eye_line_min_aspect.is_nan() || self.eye_line_min_aspect <= 0.0 {
            return Err(PipelineError::Config(format!(
                "eye line aspect must be positive, got {}",
                self.eye_line_min_aspect
            )));
        }
        let (lo, hi) = (self.face_ratio_min_percent, self.face_ratio_max_percent);
        if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo >= hi {
            return Err(PipelineError::Config(format!(
                "face ratio bounds must satisfy 0 <= min < max <= 100, got {lo} and {hi}"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    FaceCount(usize),
    FaceRatio { percent: f64 },
    NoLandmarks,
    EyeCount(usize),
    EyeLineAspect { width: i32, height: i32 },
    EyesOutsideFace,
    CoincidentEyes,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::FaceCount(n) => write!(f, "expected one face, found {n}"),
            Rejection::FaceRatio { percent } => {
                write!(f, "face covers {percent:.1}% of the frame")
            }
            Rejection::NoLandmarks => write!(f, "no landmarks"),
            Rejection::EyeCount(n) => write!(f, "expected two eyes, found {n}"),
            Rejection::EyeLineAspect { width, height } => {
                write!(f, "eye line box {width}x{height} is not wide enough")
            }
            Rejection::EyesOutsideFace => write!(f, "eyes extend outside the face"),
            Rejection::CoincidentEyes => write!(f, "eye centres coincide"),
        }
    }
}

/// The single candidate of a frame, or `FaceCount`.
pub fn select_face(candidates: &[Candidate]) -> Result<Candidate, Rejection> {
    match candidates {
        [only] => Ok(*only),
        _ => Err(Rejection::FaceCount(candidates.len())),
    }
}

/// Face area as a percentage of the frame must lie strictly inside the
/// configured bounds. Passes when the check is off or unresolved.
pub fn check_face_ratio(
    face: &Region,
    frame_width: u32,
    frame_height: u32,
    config: &ValidationConfig,
) -> Result<(), Rejection> {
    if config.check_face_ratio != Some(true) {
        return Ok(());
    }
    let frame_area = frame_width as f64 * frame_height as f64;
    let percent = if frame_area > 0.0 {
        100.0 * face.area() / frame_area
    } else {
        0.0
    };
    if percent > config.face_ratio_min_percent && percent < config.face_ratio_max_percent {
        Ok(())
    } else {
        Err(Rejection::FaceRatio { percent })
    }
}

/// Checks eye count, eye-line aspect and containment, then orders the eyes
/// so the one with the smaller x is `left`.
pub fn validate_eyes(
    eyes: &[LocatedEye],
    face: &Region,
    config: &ValidationConfig,
) -> Result<EyePair, Rejection> {
    let [a, b] = eyes else {
        return Err(Rejection::EyeCount(eyes.len()));
    };

    let eye_line = a.region.union(&b.region);
    if eye_line.width as f64 <= config.eye_line_min_aspect * eye_line.height as f64 {
        return Err(Rejection::EyeLineAspect {
            width: eye_line.width,
            height: eye_line.height,
        });
    }

    if config.check_containment == Some(true) && !face.contains(&eye_line) {
        return Err(Rejection::EyesOutsideFace);
    }

    let pair = EyePair::from_unordered(a.center, b.center);
    if pair.distance() <= f64::EPSILON {
        return Err(Rejection::CoincidentEyes);
    }
    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::Point;
    use rstest::rstest;

    fn eye(x: i32, y: i32, w: i32, h: i32) -> LocatedEye {
        let region = Region::new(x, y, w, h);
        LocatedEye {
            region,
            center: region.center(),
        }
    }

    fn face() -> Region {
        Region::new(200, 100, 240, 280)
    }

    /// Every check on, as in the cascade pipeline.
    fn strict() -> ValidationConfig {
        ValidationConfig::default().resolved(true, true)
    }

    #[rstest]
    #[case::none(0)]
    #[case::two(2)]
    #[case::five(5)]
    fn test_select_face_requires_exactly_one(#[case] n: usize) {
        let candidates = vec![Candidate::unscored(face()); n];
        assert_eq!(select_face(&candidates), Err(Rejection::FaceCount(n)));
    }

    #[test]
    fn test_select_face_returns_only_candidate() {
        let c = Candidate::scored(face(), 0.9);
        assert_eq!(select_face(&[c]), Ok(c));
    }

    #[rstest]
    // 100x100 frame: 5x100 covers exactly 5%.
    #[case::exactly_min(Region::new(0, 0, 5, 100), false)]
    #[case::exactly_max(Region::new(0, 0, 55, 100), false)]
    #[case::middle(Region::new(0, 0, 30, 100), true)]
    #[case::tiny(Region::new(0, 0, 2, 2), false)]
    #[case::whole_frame(Region::new(0, 0, 100, 100), false)]
    fn test_face_ratio_bounds_are_exclusive(#[case] face: Region, #[case] accepted: bool) {
        let result = check_face_ratio(&face, 100, 100, &strict());
        assert_eq!(result.is_ok(), accepted);
    }

    #[test]
    fn test_face_ratio_disabled_always_passes() {
        let config = ValidationConfig {
            check_face_ratio: Some(false),
            ..ValidationConfig::default()
        };
        assert!(check_face_ratio(&Region::new(0, 0, 100, 100), 100, 100, &config).is_ok());
        let unresolved = ValidationConfig::default();
        assert!(check_face_ratio(&Region::new(0, 0, 100, 100), 100, 100, &unresolved).is_ok());
    }

    #[rstest]
    #[case::ssd_landmarks(false, false, Some(false), Some(false))]
    #[case::ssd_cascade_eyes(false, true, Some(false), Some(true))]
    #[case::cascade_landmarks(true, false, Some(true), Some(false))]
    #[case::cascade_cascade(true, true, Some(true), Some(true))]
    fn test_checks_follow_strategy_pair(
        #[case] cascade_detector: bool,
        #[case] cascade_locator: bool,
        #[case] ratio: Option<bool>,
        #[case] containment: Option<bool>,
    ) {
        let config = ValidationConfig::default().resolved(cascade_detector, cascade_locator);
        assert_eq!(config.check_face_ratio, ratio);
        assert_eq!(config.check_containment, containment);
    }

    #[test]
    fn test_explicit_checks_survive_resolution() {
        let config = ValidationConfig {
            check_face_ratio: Some(true),
            check_containment: Some(false),
            ..ValidationConfig::default()
        }
        .resolved(false, true);
        assert_eq!(config.check_face_ratio, Some(true));
        assert_eq!(config.check_containment, Some(false));
    }

    #[test]
    fn test_face_ratio_rejection_reports_percent() {
        let err = check_face_ratio(&Region::new(0, 0, 80, 100), 100, 100, &strict()).unwrap_err();
        assert_eq!(err, Rejection::FaceRatio { percent: 80.0 });
    }

    #[rstest]
    #[case::none(vec![])]
    #[case::one(vec![eye(250, 180, 30, 12)])]
    #[case::three(vec![eye(250, 180, 30, 12), eye(330, 180, 30, 12), eye(300, 250, 30, 12)])]
    fn test_eye_count_gate(#[case] eyes: Vec<LocatedEye>) {
        let err = validate_eyes(&eyes, &face(), &ValidationConfig::default()).unwrap_err();
        assert_eq!(err, Rejection::EyeCount(eyes.len()));
    }

    #[test]
    fn test_aspect_boundary_equal_rejects() {
        // Union is 40 wide and 20 tall: width == 2 * height.
        let eyes = [eye(250, 180, 10, 20), eye(280, 180, 10, 20)];
        let err = validate_eyes(&eyes, &face(), &ValidationConfig::default()).unwrap_err();
        assert_eq!(err, Rejection::EyeLineAspect { width: 40, height: 20 });
    }

    #[test]
    fn test_aspect_just_above_boundary_passes() {
        let eyes = [eye(250, 180, 10, 20), eye(281, 180, 10, 20)];
        assert!(validate_eyes(&eyes, &face(), &ValidationConfig::default()).is_ok());
    }

    #[test]
    fn test_square_eye_line_rejected() {
        let eyes = [eye(250, 180, 20, 40), eye(250, 200, 20, 20)];
        assert!(matches!(
            validate_eyes(&eyes, &face(), &ValidationConfig::default()),
            Err(Rejection::EyeLineAspect { .. })
        ));
    }

    #[test]
    fn test_containment() {
        // Right eye pokes past the face's right edge at x = 440.
        let eyes = [eye(300, 180, 30, 12), eye(420, 180, 30, 12)];
        assert_eq!(
            validate_eyes(&eyes, &face(), &strict()),
            Err(Rejection::EyesOutsideFace)
        );

        let landmark_pipeline = ValidationConfig::default().resolved(false, false);
        assert!(validate_eyes(&eyes, &face(), &landmark_pipeline).is_ok());
    }

    #[test]
    fn test_eyes_ordered_left_to_right() {
        let eyes = [eye(360, 184, 40, 16), eye(240, 192, 40, 16)];
        let pair = validate_eyes(&eyes, &face(), &ValidationConfig::default()).unwrap();
        assert_eq!(pair.left, Point::new(260.0, 200.0));
        assert_eq!(pair.right, Point::new(380.0, 192.0));
    }

    #[test]
    fn test_coincident_centres_rejected() {
        let same = LocatedEye {
            region: Region::new(250, 180, 30, 10),
            center: Point::new(300.0, 185.0),
        };
        let other = LocatedEye {
            region: Region::new(330, 180, 30, 10),
            center: Point::new(300.0, 185.0),
        };
        assert_eq!(
            validate_eyes(&[same, other], &face(), &ValidationConfig::default()),
            Err(Rejection::CoincidentEyes)
        );
    }

    #[rstest]
    #[case::zero_aspect(ValidationConfig { eye_line_min_aspect: 0.0, ..ValidationConfig::default() })]
    #[case::inverted_ratio(ValidationConfig { face_ratio_min_percent: 60.0, ..ValidationConfig::default() })]
    #[case::ratio_over_100(ValidationConfig { face_ratio_max_percent: 120.0, ..ValidationConfig::default() })]
    fn test_invalid_config(#[case] config: ValidationConfig) {
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(Rejection::FaceCount(2).to_string(), "expected one face, found 2");
        assert_eq!(Rejection::NoLandmarks.to_string(), "no landmarks");
    }
}
