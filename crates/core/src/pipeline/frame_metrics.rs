use std::time::Duration;

/// Timed stages of one pipeline tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Detect,
    Locate,
    Align,
    Composite,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Detect, Stage::Locate, Stage::Align, Stage::Composite];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Detect => "detect",
            Stage::Locate => "locate",
            Stage::Align => "align",
            Stage::Composite => "composite",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTiming {
    pub total: Duration,
    pub calls: u64,
}

impl StageTiming {
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls as u32
        }
    }
}

/// Counters owned by one pipeline instance, zeroed on construction.
#[derive(Debug, Default)]
pub struct FrameMetrics {
    frames_total: u64,
    frames_face: u64,
    frames_eyes: u64,
    frames_aligned: u64,
    frames_skipped: u64,
    stages: [StageTiming; 4],
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&mut self) {
        self.frames_total += 1;
    }

    pub fn record_face(&mut self) {
        self.frames_face += 1;
    }

    pub fn record_eyes(&mut self) {
        self.frames_eyes += 1;
    }

    pub fn record_aligned(&mut self) {
        self.frames_aligned += 1;
    }

    pub fn record_skipped(&mut self) {
        self.frames_skipped += 1;
    }

    pub fn record_stage(&mut self, stage: Stage, elapsed: Duration) {
        let timing = &mut self.stages[stage.slot()];
        timing.total += elapsed;
        timing.calls += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_total: self.frames_total,
            frames_face: self.frames_face,
            frames_eyes: self.frames_eyes,
            frames_aligned: self.frames_aligned,
            frames_skipped: self.frames_skipped,
            stages: self.stages,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub frames_total: u64,
    pub frames_face: u64,
    pub frames_eyes: u64,
    pub frames_aligned: u64,
    /// Ticks abandoned after an inference error.
    pub frames_skipped: u64,
    stages: [StageTiming; 4],
}

impl MetricsSnapshot {
    pub fn stage(&self, stage: Stage) -> StageTiming {
        self.stages[stage.slot()]
    }

    pub fn face_fraction(&self) -> f64 {
        self.fraction(self.frames_face)
    }

    pub fn eyes_fraction(&self) -> f64 {
        self.fraction(self.frames_eyes)
    }

    pub fn aligned_fraction(&self) -> f64 {
        self.fraction(self.frames_aligned)
    }

    fn fraction(&self, count: u64) -> f64 {
        if self.frames_total == 0 {
            0.0
        } else {
            count as f64 / self.frames_total as f64
        }
    }

    /// Short human-readable lines for the on-frame status text.
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "face {:.0}%  eyes {:.0}%  aligned {:.0}%",
            self.face_fraction() * 100.0,
            self.eyes_fraction() * 100.0,
            self.aligned_fraction() * 100.0
        )];
        let timings: Vec<String> = Stage::ALL
            .iter()
            .filter(|s| self.stage(**s).calls > 0)
            .map(|s| {
                let avg_ms = self.stage(*s).average().as_secs_f64() * 1000.0;
                format!("{} {avg_ms:.1}ms", s.name())
            })
            .collect();
        if !timings.is_empty() {
            lines.push(timings.join("  "));
        }
        lines
    }
}
