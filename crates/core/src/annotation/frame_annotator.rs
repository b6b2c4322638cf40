//! Composites detection results onto a copy of the input frame.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_text_mut,
};
use imageproc::rect::Rect;

use crate::landmarks::domain::face_landmarks::FaceLandmarks;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::geometry::{EyePair, Point};
use crate::shared::region::Region;

const FACE_COLOR: Rgb<u8> = Rgb([250, 128, 114]);
const LANDMARK_COLOR: Rgb<u8> = Rgb([30, 144, 255]);
const EYE_CENTER_COLOR: Rgb<u8> = Rgb([240, 230, 140]);
const EYE_LINE_COLOR: Rgb<u8> = Rgb([221, 160, 221]);
const INSET_BORDER_COLOR: Rgb<u8> = Rgb([112, 128, 144]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const INSET_BORDER: u32 = 2;
const MARKER_RADIUS: i32 = 3;
const TEXT_MARGIN: i32 = 8;

/// What to draw for one frame. Empty for passthrough frames.
#[derive(Clone, Debug, Default)]
pub struct Overlay<'a> {
    pub face: Option<Region>,
    pub eyes: Option<EyePair>,
    pub landmarks: Option<&'a FaceLandmarks>,
    pub aligned: Option<&'a Frame>,
    pub status_lines: Vec<String>,
}

pub struct FrameAnnotator {
    show_landmarks: bool,
    font: Option<(FontVec, PxScale)>,
}

impl FrameAnnotator {
    pub fn new(show_landmarks: bool) -> Self {
        Self {
            show_landmarks,
            font: None,
        }
    }

    /// Enables the text overlay.
    pub fn with_font(mut self, font: FontVec, size: f32) -> Self {
        self.font = Some((font, PxScale::from(size)));
        self
    }

    pub fn load_font(path: &Path) -> Result<FontVec, PipelineError> {
        let bytes = std::fs::read(path).map_err(|e| {
            PipelineError::Config(format!("cannot read font {}: {e}", path.display()))
        })?;
        FontVec::try_from_vec(bytes).map_err(|e| {
            PipelineError::Config(format!("invalid font {}: {e}", path.display()))
        })
    }

    pub fn has_text(&self) -> bool {
        self.font.is_some()
    }

    /// Returns an annotated copy; the input frame is left untouched.
    pub fn annotate(&self, frame: &Frame, overlay: &Overlay<'_>) -> Frame {
        let draws_text = self.font.is_some() && !overlay.status_lines.is_empty();
        let draws_points =
            self.show_landmarks && (overlay.eyes.is_some() || overlay.landmarks.is_some());
        let draws_shapes = overlay.face.is_some() || overlay.aligned.is_some() || draws_points;
        if !draws_text && !draws_shapes {
            return frame.clone();
        }
        let Some(mut canvas) = frame.to_rgb_image() else {
            log::debug!("Frame {}: not RGB, skipping overlay", frame.index());
            return frame.clone();
        };

        if let Some(face) = overlay.face {
            draw_face(&mut canvas, &face);
        }
        if self.show_landmarks {
            if let Some(eyes) = overlay.eyes {
                draw_eyes(&mut canvas, &eyes);
            }
            if let Some(landmarks) = overlay.landmarks {
                for p in landmarks.eye_corners() {
                    draw_filled_circle_mut(&mut canvas, p.to_pixel(), 2, LANDMARK_COLOR);
                }
            }
        }
        if let Some(aligned) = overlay.aligned {
            draw_inset(&mut canvas, aligned);
        }
        if let Some((font, scale)) = &self.font {
            let line_height = (scale.y * 1.2).ceil() as i32;
            for (i, line) in overlay.status_lines.iter().enumerate() {
                let y = TEXT_MARGIN + i as i32 * line_height;
                draw_text_mut(&mut canvas, TEXT_COLOR, TEXT_MARGIN, y, *scale, font, line);
            }
        }

        Frame::from_rgb_image(canvas, frame.index())
    }
}

fn draw_face(canvas: &mut RgbImage, face: &Region) {
    draw_hollow_rect_mut(
        canvas,
        Rect::at(face.x, face.y).of_size(face.width as u32, face.height as u32),
        FACE_COLOR,
    );
    if face.width > 2 && face.height > 2 {
        draw_hollow_rect_mut(
            canvas,
            Rect::at(face.x + 1, face.y + 1).of_size(face.width as u32 - 2, face.height as u32 - 2),
            FACE_COLOR,
        );
    }
}

fn draw_eyes(canvas: &mut RgbImage, eyes: &EyePair) {
    let as_f32 = |p: Point| (p.x as f32, p.y as f32);
    draw_line_segment_mut(canvas, as_f32(eyes.left), as_f32(eyes.right), EYE_LINE_COLOR);
    draw_filled_circle_mut(canvas, eyes.left.to_pixel(), MARKER_RADIUS, EYE_CENTER_COLOR);
    draw_filled_circle_mut(canvas, eyes.right.to_pixel(), MARKER_RADIUS, EYE_CENTER_COLOR);
    draw_filled_circle_mut(canvas, eyes.center().to_pixel(), MARKER_RADIUS, EYE_LINE_COLOR);
}

/// Bottom-right thumbnail with a border; skipped when it does not fit.
fn draw_inset(canvas: &mut RgbImage, aligned: &Frame) {
    let Some(crop) = aligned.to_rgb_image() else {
        return;
    };
    let (fw, fh) = canvas.dimensions();
    let outer_w = crop.width() + 2 * INSET_BORDER;
    let outer_h = crop.height() + 2 * INSET_BORDER;
    if outer_w > fw || outer_h > fh {
        return;
    }
    let (x0, y0) = (fw - outer_w, fh - outer_h);
    draw_filled_rect_mut(
        canvas,
        Rect::at(x0 as i32, y0 as i32).of_size(outer_w, outer_h),
        INSET_BORDER_COLOR,
    );
    imageops::overlay(
        canvas,
        &crop,
        (x0 + INSET_BORDER) as i64,
        (y0 + INSET_BORDER) as i64,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::domain::face_landmarks::fixtures::landmarks_with_eyes;

    fn gray_frame(w: u32, h: u32) -> Frame {
        Frame::new(vec![60u8; (w * h * 3) as usize], w, h, 3, 9)
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * frame.width() + x) * 3) as usize;
        [frame.data()[i], frame.data()[i + 1], frame.data()[i + 2]]
    }

    fn eyes() -> EyePair {
        EyePair {
            left: Point::new(100.0, 80.0),
            right: Point::new(160.0, 80.0),
        }
    }

    #[test]
    fn test_passthrough_is_unchanged_copy() {
        let frame = gray_frame(64, 48);
        let out = FrameAnnotator::new(true).annotate(&frame, &Overlay::default());
        assert_eq!(out, frame);
    }

    #[test]
    fn test_face_rectangle_drawn_and_input_untouched() {
        let frame = gray_frame(320, 240);
        let overlay = Overlay {
            face: Some(Region::new(40, 30, 100, 120)),
            ..Overlay::default()
        };
        let out = FrameAnnotator::new(false).annotate(&frame, &overlay);

        assert_eq!(pixel(&out, 40, 30), FACE_COLOR.0);
        assert_eq!(pixel(&out, 41, 60), FACE_COLOR.0);
        assert_eq!(pixel(&out, 90, 90), [60, 60, 60]);
        assert_eq!(pixel(&frame, 40, 30), [60, 60, 60]);
        assert_eq!(out.index(), 9);
    }

    #[test]
    fn test_eye_markers_and_line_only_when_enabled() {
        let frame = gray_frame(320, 240);
        let overlay = Overlay {
            eyes: Some(eyes()),
            ..Overlay::default()
        };

        let hidden = FrameAnnotator::new(false).annotate(&frame, &overlay);
        assert_eq!(hidden, frame);

        let out = FrameAnnotator::new(true).annotate(&frame, &overlay);
        assert_eq!(pixel(&out, 100, 80), EYE_CENTER_COLOR.0);
        assert_eq!(pixel(&out, 160, 80), EYE_CENTER_COLOR.0);
        assert_eq!(pixel(&out, 130, 80), EYE_LINE_COLOR.0);
        assert_eq!(pixel(&out, 115, 80), EYE_LINE_COLOR.0);
    }

    #[test]
    fn test_landmarks_only_when_enabled() {
        let lm = landmarks_with_eyes(Point::new(100.0, 80.0), Point::new(160.0, 80.0), 20.0, 8.0);
        let frame = gray_frame(320, 240);
        let overlay = Overlay {
            landmarks: Some(&lm),
            face: Some(Region::new(50, 20, 160, 180)),
            ..Overlay::default()
        };

        let hidden = FrameAnnotator::new(false).annotate(&frame, &overlay);
        assert_eq!(pixel(&hidden, 90, 80), [60, 60, 60]);

        let shown = FrameAnnotator::new(true).annotate(&frame, &overlay);
        assert_eq!(pixel(&shown, 90, 80), LANDMARK_COLOR.0);
        assert_eq!(pixel(&shown, 170, 80), LANDMARK_COLOR.0);
    }

    #[test]
    fn test_inset_in_bottom_right_with_border() {
        let frame = gray_frame(320, 240);
        let crop = Frame::new(vec![200u8; 40 * 40 * 3], 40, 40, 3, 9);
        let overlay = Overlay {
            face: Some(Region::new(10, 10, 50, 50)),
            aligned: Some(&crop),
            ..Overlay::default()
        };
        let out = FrameAnnotator::new(false).annotate(&frame, &overlay);

        // Border occupies x 276..320, y 196..240; crop starts at (278, 198).
        assert_eq!(pixel(&out, 276, 196), INSET_BORDER_COLOR.0);
        assert_eq!(pixel(&out, 319, 239), INSET_BORDER_COLOR.0);
        assert_eq!(pixel(&out, 278, 198), [200, 200, 200]);
        assert_eq!(pixel(&out, 317, 237), [200, 200, 200]);
        assert_eq!(pixel(&out, 275, 196), [60, 60, 60]);
    }

    #[test]
    fn test_inset_skipped_when_too_large() {
        let frame = gray_frame(64, 48);
        let crop = Frame::new(vec![200u8; 224 * 224 * 3], 224, 224, 3, 0);
        let overlay = Overlay {
            aligned: Some(&crop),
            ..Overlay::default()
        };
        let out = FrameAnnotator::new(false).annotate(&frame, &overlay);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_text_ignored_without_font() {
        let frame = gray_frame(64, 48);
        let overlay = Overlay {
            status_lines: vec!["face 100%".into()],
            ..Overlay::default()
        };
        let annotator = FrameAnnotator::new(false);
        assert!(!annotator.has_text());
        assert_eq!(annotator.annotate(&frame, &overlay), frame);
    }

    #[test]
    fn test_invalid_font_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(
            FrameAnnotator::load_font(&path),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            FrameAnnotator::load_font(&dir.path().join("missing.ttf")),
            Err(PipelineError::Config(_))
        ));
    }
}
