use super::face_landmarks::FaceLandmarks;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;
use crate::shared::region::Region;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocatedEye {
    pub region: Region,
    pub center: Point,
}

/// Raw, unordered locator output for one face.
#[derive(Clone, Debug, PartialEq)]
pub struct LocatedEyes {
    pub eyes: Vec<LocatedEye>,
    /// Present when the strategy fits a full landmark set.
    pub landmarks: Option<FaceLandmarks>,
}

/// Domain interface for finding the eyes inside a face region.
///
/// `Ok(None)` means the strategy produced no landmarks for this face. The
/// number of eyes is not checked here.
pub trait EyeLocator {
    fn locate(&mut self, frame: &Frame, face: &Region)
        -> Result<Option<LocatedEyes>, PipelineError>;
}
