use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::pipeline::face_alignment_pipeline::{FaceAlignmentPipeline, FrameOutcome};
use crate::pipeline::frame_metrics::MetricsSnapshot;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::video::domain::frame_sink::FrameSink;
use crate::video::domain::frame_source::FrameSource;

/// Drives a pipeline over a frame source until the source ends, the frame
/// limit is hit or the cancel flag is raised.
///
/// The flag is checked between ticks, so a frame in flight always
/// completes.
pub struct RunStreamUseCase {
    source: Box<dyn FrameSource>,
    pipeline: FaceAlignmentPipeline,
    sink: Option<Box<dyn FrameSink>>,
    logger: Box<dyn PipelineLogger>,
    cancelled: Arc<AtomicBool>,
    max_frames: Option<usize>,
}

impl RunStreamUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        pipeline: FaceAlignmentPipeline,
        sink: Option<Box<dyn FrameSink>>,
        logger: Box<dyn PipelineLogger>,
        cancelled: Arc<AtomicBool>,
        max_frames: Option<usize>,
    ) -> Self {
        Self {
            source,
            pipeline,
            sink,
            logger,
            cancelled,
            max_frames,
        }
    }

    pub fn execute(&mut self) -> Result<MetricsSnapshot, Box<dyn std::error::Error>> {
        let total = match (self.source.len_hint(), self.max_frames) {
            (Some(n), Some(max)) => n.min(max),
            (Some(n), None) => n,
            (None, Some(max)) => max,
            (None, None) => 0,
        };
        let mut processed = 0usize;

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                self.logger.info("Cancelled, stopping stream");
                break;
            }
            if self.max_frames.is_some_and(|max| processed >= max) {
                break;
            }
            let Some(frame) = self.source.next_frame()? else {
                break;
            };

            let output = self.pipeline.process(&frame)?;
            for (stage, elapsed) in &output.timings {
                self.logger
                    .timing(stage.name(), elapsed.as_secs_f64() * 1000.0);
            }
            let aligned = matches!(output.outcome, FrameOutcome::Aligned);
            self.logger.metric("aligned", if aligned { 1.0 } else { 0.0 });

            if let Some(sink) = self.sink.as_mut() {
                sink.write(&output.annotated, output.aligned.as_ref().map(|a| &a.crop))?;
            }

            processed += 1;
            self.logger.progress(processed, total);
        }

        if let Some(sink) = self.sink.as_mut() {
            sink.finish()?;
        }

        let snapshot = self.pipeline.snapshot();
        self.logger.info(&format!(
            "{} frames: face {:.1}%, eyes {:.1}%, aligned {:.1}%, skipped {}",
            snapshot.frames_total,
            snapshot.face_fraction() * 100.0,
            snapshot.eyes_fraction() * 100.0,
            snapshot.aligned_fraction() * 100.0,
            snapshot.frames_skipped
        ));
        self.logger.summary();
        Ok(snapshot)
    }
}
