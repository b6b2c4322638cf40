use std::time::{Duration, Instant};

use crate::alignment::face_aligner::{AlignedFace, FaceAligner};
use crate::annotation::frame_annotator::{FrameAnnotator, Overlay};
use crate::detection::domain::face_detector::FaceDetector;
use crate::landmarks::domain::eye_locator::EyeLocator;
use crate::pipeline::frame_metrics::{FrameMetrics, MetricsSnapshot, Stage};
use crate::pipeline::pipeline_settings::PipelineSettings;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::validation::detection_validator::{
    check_face_ratio, select_face, validate_eyes, Rejection, ValidationConfig,
};

/// How a single tick ended.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    Aligned,
    Rejected(Rejection),
    /// A stage failed at inference time; the frame passed through untouched.
    Skipped(String),
}

pub struct PipelineOutput {
    pub annotated: Frame,
    pub aligned: Option<AlignedFace>,
    pub outcome: FrameOutcome,
    /// Stages that ran this tick, in execution order.
    pub timings: Vec<(Stage, Duration)>,
}

/// Detect, locate eyes, validate and align, one frame at a time.
///
/// Owns its detector and locator; construction fixes every threshold, so a
/// running pipeline has no configuration left to get wrong. Only startup
/// errors (`Config`, `ModelLoad`) escape [`process`](Self::process); a stage
/// failing on one frame turns into [`FrameOutcome::Skipped`]. Only aligned
/// frames are annotated.
pub struct FaceAlignmentPipeline {
    detector: Box<dyn FaceDetector>,
    locator: Box<dyn EyeLocator>,
    aligner: FaceAligner,
    annotator: FrameAnnotator,
    validation: ValidationConfig,
    confidence: f32,
    metrics: FrameMetrics,
}

impl FaceAlignmentPipeline {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        locator: Box<dyn EyeLocator>,
        annotator: FrameAnnotator,
        settings: &PipelineSettings,
    ) -> Result<Self, PipelineError> {
        settings.validate()?;
        Ok(Self {
            detector,
            locator,
            aligner: FaceAligner::new(settings.target)?,
            annotator,
            validation: settings.effective_validation(),
            confidence: settings.confidence,
            metrics: FrameMetrics::new(),
        })
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn process(&mut self, frame: &Frame) -> Result<PipelineOutput, PipelineError> {
        self.metrics.record_frame();
        let mut timings = Vec::with_capacity(Stage::ALL.len());

        let start = Instant::now();
        let detected = self.detector.detect(frame, self.confidence);
        self.record(Stage::Detect, start, &mut timings);
        let candidates = match detected {
            Ok(candidates) => candidates,
            Err(e) => return self.skip(frame, e, timings),
        };

        let face = match select_face(&candidates).and_then(|c| {
            check_face_ratio(&c.region, frame.width(), frame.height(), &self.validation)
                .map(|_| c.region)
        }) {
            Ok(face) => face,
            Err(rejection) => return Ok(self.reject(frame, rejection, timings)),
        };
        self.metrics.record_face();

        let start = Instant::now();
        let located = self.locator.locate(frame, &face);
        self.record(Stage::Locate, start, &mut timings);
        let located = match located {
            Ok(Some(located)) => located,
            Ok(None) => return Ok(self.reject(frame, Rejection::NoLandmarks, timings)),
            Err(e) => return self.skip(frame, e, timings),
        };

        let eyes = match validate_eyes(&located.eyes, &face, &self.validation) {
            Ok(eyes) => eyes,
            Err(rejection) => return Ok(self.reject(frame, rejection, timings)),
        };
        self.metrics.record_eyes();

        let start = Instant::now();
        let aligned = self.aligner.align(frame, &eyes);
        self.record(Stage::Align, start, &mut timings);
        let Some(aligned) = aligned else {
            return Ok(self.reject(frame, Rejection::CoincidentEyes, timings));
        };
        self.metrics.record_aligned();

        let overlay = Overlay {
            face: Some(face),
            eyes: Some(eyes),
            landmarks: located.landmarks.as_ref(),
            aligned: Some(&aligned.crop),
            ..Overlay::default()
        };
        let annotated = self.composite(frame, overlay, &mut timings);
        log::debug!("Frame {}: aligned", frame.index());

        Ok(PipelineOutput {
            annotated,
            aligned: Some(aligned),
            outcome: FrameOutcome::Aligned,
            timings,
        })
    }

    fn record(&mut self, stage: Stage, start: Instant, timings: &mut Vec<(Stage, Duration)>) {
        let elapsed = start.elapsed();
        self.metrics.record_stage(stage, elapsed);
        timings.push((stage, elapsed));
    }

    fn composite(
        &mut self,
        frame: &Frame,
        mut overlay: Overlay<'_>,
        timings: &mut Vec<(Stage, Duration)>,
    ) -> Frame {
        let start = Instant::now();
        if self.annotator.has_text() {
            overlay.status_lines = self.metrics.snapshot().status_lines();
        }
        let annotated = self.annotator.annotate(frame, &overlay);
        self.record(Stage::Composite, start, timings);
        annotated
    }

    /// A rejected frame carries no overlay, only the optional status text.
    fn reject(
        &mut self,
        frame: &Frame,
        rejection: Rejection,
        mut timings: Vec<(Stage, Duration)>,
    ) -> PipelineOutput {
        log::debug!("Frame {}: rejected, {rejection}", frame.index());
        let annotated = self.composite(frame, Overlay::default(), &mut timings);
        PipelineOutput {
            annotated,
            aligned: None,
            outcome: FrameOutcome::Rejected(rejection),
            timings,
        }
    }

    fn skip(
        &mut self,
        frame: &Frame,
        error: PipelineError,
        mut timings: Vec<(Stage, Duration)>,
    ) -> Result<PipelineOutput, PipelineError> {
        if !error.is_per_frame() {
            return Err(error);
        }
        log::warn!("Frame {}: skipped, {error}", frame.index());
        self.metrics.record_skipped();
        let annotated = self.composite(frame, Overlay::default(), &mut timings);
        Ok(PipelineOutput {
            annotated,
            aligned: None,
            outcome: FrameOutcome::Skipped(error.to_string()),
            timings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::domain::eye_locator::{LocatedEye, LocatedEyes};
    use crate::pipeline::pipeline_settings::DetectorKind;
    use crate::shared::region::{Candidate, Region};

    struct StubDetector {
        result: fn() -> Result<Vec<Candidate>, PipelineError>,
    }

    impl FaceDetector for StubDetector {
        fn detect(&mut self, _: &Frame, _: f32) -> Result<Vec<Candidate>, PipelineError> {
            (self.result)()
        }
    }

    struct StubLocator {
        result: fn() -> Result<Option<LocatedEyes>, PipelineError>,
    }

    impl EyeLocator for StubLocator {
        fn locate(&mut self, _: &Frame, _: &Region) -> Result<Option<LocatedEyes>, PipelineError> {
            (self.result)()
        }
    }

    fn one_face() -> Result<Vec<Candidate>, PipelineError> {
        Ok(vec![Candidate::scored(Region::new(200, 100, 240, 280), 0.95)])
    }

    fn eye(x: i32, y: i32) -> LocatedEye {
        eye_box(x, y, 40, 16)
    }

    fn eye_box(x: i32, y: i32, w: i32, h: i32) -> LocatedEye {
        let region = Region::new(x, y, w, h);
        LocatedEye {
            region,
            center: region.center(),
        }
    }

    fn two_eyes() -> Result<Option<LocatedEyes>, PipelineError> {
        Ok(Some(LocatedEyes {
            eyes: vec![eye(240, 192), eye(360, 192)],
            landmarks: None,
        }))
    }

    fn pipeline(
        detect: fn() -> Result<Vec<Candidate>, PipelineError>,
        locate: fn() -> Result<Option<LocatedEyes>, PipelineError>,
    ) -> FaceAlignmentPipeline {
        pipeline_with(detect, locate, &PipelineSettings::default())
    }

    fn pipeline_with(
        detect: fn() -> Result<Vec<Candidate>, PipelineError>,
        locate: fn() -> Result<Option<LocatedEyes>, PipelineError>,
        settings: &PipelineSettings,
    ) -> FaceAlignmentPipeline {
        FaceAlignmentPipeline::new(
            Box::new(StubDetector { result: detect }),
            Box::new(StubLocator { result: locate }),
            FrameAnnotator::new(true),
            settings,
        )
        .unwrap()
    }

    fn cascade_settings() -> PipelineSettings {
        PipelineSettings {
            detector: DetectorKind::Cascade,
            ..PipelineSettings::default()
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![90u8; 640 * 480 * 3], 640, 480, 3, 0)
    }

    #[test]
    fn test_aligned_frame_runs_every_stage() {
        let mut p = pipeline(one_face, two_eyes);
        let input = frame();
        let out = p.process(&input).unwrap();

        assert_eq!(out.outcome, FrameOutcome::Aligned);
        let crop = &out.aligned.as_ref().unwrap().crop;
        assert_eq!((crop.width(), crop.height()), (224, 224));
        let stages: Vec<Stage> = out.timings.iter().map(|(s, _)| *s).collect();
        assert_eq!(stages, Stage::ALL);
        assert_ne!(out.annotated, input);
        assert_eq!(input.data()[0], 90);

        let snap = p.snapshot();
        assert_eq!(
            (snap.frames_total, snap.frames_face, snap.frames_eyes, snap.frames_aligned),
            (1, 1, 1, 1)
        );
    }

    #[test]
    fn test_no_face_is_passthrough() {
        let mut p = pipeline(|| Ok(vec![]), two_eyes);
        let input = frame();
        let out = p.process(&input).unwrap();

        assert_eq!(out.outcome, FrameOutcome::Rejected(Rejection::FaceCount(0)));
        assert_eq!(out.annotated, input);
        assert!(out.aligned.is_none());
        let stages: Vec<Stage> = out.timings.iter().map(|(s, _)| *s).collect();
        assert_eq!(stages, [Stage::Detect, Stage::Composite]);
        assert_eq!(p.snapshot().frames_face, 0);
    }

    #[test]
    fn test_oversized_face_is_not_counted_by_cascade_pipeline() {
        let mut p = pipeline_with(
            || Ok(vec![Candidate::unscored(Region::new(0, 0, 600, 460))]),
            two_eyes,
            &cascade_settings(),
        );
        let input = frame();
        let out = p.process(&input).unwrap();
        assert!(matches!(
            out.outcome,
            FrameOutcome::Rejected(Rejection::FaceRatio { .. })
        ));
        assert_eq!(out.annotated, input);
        assert_eq!(p.snapshot().frames_face, 0);
    }

    #[test]
    fn test_close_up_face_aligns_with_ssd_and_landmarks() {
        // Covers about 60% of the frame, above the cascade ratio bound.
        let mut p = pipeline(
            || Ok(vec![Candidate::scored(Region::new(120, 20, 400, 460), 0.98)]),
            two_eyes,
        );
        let out = p.process(&frame()).unwrap();
        assert_eq!(out.outcome, FrameOutcome::Aligned);
        assert_eq!(p.snapshot().frames_face, 1);
    }

    #[test]
    fn test_fit_failure_surfaces_as_skip() {
        let mut p = pipeline(one_face, || Err(PipelineError::FitFailure("diverged".into())));
        let out = p.process(&frame()).unwrap();
        assert!(matches!(out.outcome, FrameOutcome::Skipped(_)));

        let snap = p.snapshot();
        assert_eq!((snap.frames_face, snap.frames_eyes, snap.frames_skipped), (1, 0, 1));
    }

    #[test]
    fn test_missing_landmarks_rejected_without_overlay() {
        let mut p = pipeline(one_face, || Ok(None));
        let out = p.process(&frame()).unwrap();
        assert_eq!(out.outcome, FrameOutcome::Rejected(Rejection::NoLandmarks));
        assert_eq!(out.annotated, frame());
    }

    #[test]
    fn test_square_eye_box_rejected_without_overlay() {
        let mut p = pipeline(one_face, || {
            Ok(Some(LocatedEyes {
                eyes: vec![eye_box(280, 200, 20, 40), eye_box(300, 200, 20, 40)],
                landmarks: None,
            }))
        });
        let input = frame();
        let out = p.process(&input).unwrap();
        assert_eq!(
            out.outcome,
            FrameOutcome::Rejected(Rejection::EyeLineAspect { width: 40, height: 40 })
        );
        assert!(out.aligned.is_none());
        assert_eq!(out.annotated, input);
    }

    #[test]
    fn test_coincident_eyes_rejected_without_overlay() {
        let mut p = pipeline(one_face, || {
            let mut right = eye(360, 192);
            let left = eye(240, 192);
            right.center = left.center;
            Ok(Some(LocatedEyes {
                eyes: vec![left, right],
                landmarks: None,
            }))
        });
        let input = frame();
        let out = p.process(&input).unwrap();
        assert_eq!(out.outcome, FrameOutcome::Rejected(Rejection::CoincidentEyes));
        assert_eq!(out.annotated, input);
        assert_eq!(p.snapshot().frames_aligned, 0);
    }

    #[test]
    fn test_inference_error_skips_frame_and_keeps_running() {
        let mut p = pipeline(|| Err(PipelineError::Inference("bad shape".into())), two_eyes);
        let input = frame();
        for _ in 0..3 {
            let out = p.process(&input).unwrap();
            assert!(matches!(out.outcome, FrameOutcome::Skipped(ref m) if m.contains("bad shape")));
            assert_eq!(out.annotated, input);
        }
        let snap = p.snapshot();
        assert_eq!((snap.frames_total, snap.frames_skipped), (3, 3));
    }

    #[test]
    fn test_startup_errors_propagate() {
        let mut p = pipeline(|| Err(PipelineError::model_load("ssd.onnx", "gone")), two_eyes);
        assert!(matches!(
            p.process(&frame()),
            Err(PipelineError::ModelLoad { .. })
        ));
    }

    #[test]
    fn test_single_eye_rejected_after_face_counted() {
        let mut p = pipeline(one_face, || {
            Ok(Some(LocatedEyes {
                eyes: vec![eye(240, 192)],
                landmarks: None,
            }))
        });
        let out = p.process(&frame()).unwrap();
        assert_eq!(out.outcome, FrameOutcome::Rejected(Rejection::EyeCount(1)));
        let snap = p.snapshot();
        assert_eq!((snap.frames_face, snap.frames_eyes), (1, 0));
    }

    #[test]
    fn test_invalid_settings_rejected_at_construction() {
        let settings = PipelineSettings {
            confidence: 0.05,
            ..PipelineSettings::default()
        };
        let result = FaceAlignmentPipeline::new(
            Box::new(StubDetector { result: one_face }),
            Box::new(StubLocator { result: two_eyes }),
            FrameAnnotator::new(false),
            &settings,
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
