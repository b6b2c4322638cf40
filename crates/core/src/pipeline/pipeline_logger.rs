use std::collections::BTreeMap;
use std::time::Instant;

/// Where stream events go: progress, per-frame stage timings and values,
/// status messages and a closing summary.
pub trait PipelineLogger: Send {
    /// `total` is 0 when the source length is unknown (live capture).
    fn progress(&mut self, current: usize, total: usize);

    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A per-frame value, e.g. 1.0 when the frame was aligned.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    fn summary(&self) {}
}

pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Count, sum and extremes of a stream of samples, in constant space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunningStat {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl RunningStat {
    fn new(first: f64) -> Self {
        Self {
            count: 1,
            sum: first,
            min: first,
            max: first,
        }
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

fn accumulate(stats: &mut BTreeMap<String, RunningStat>, key: &str, value: f64) {
    match stats.get_mut(key) {
        Some(stat) => stat.push(value),
        None => {
            stats.insert(key.to_string(), RunningStat::new(value));
        }
    }
}

/// Sends progress and messages to the `log` facade and keeps running
/// statistics per stage and per metric for the end-of-stream summary.
///
/// Memory stays bounded by the number of distinct keys, so live sources
/// can run indefinitely. Progress lines are emitted every `every` frames.
pub struct LogPipelineLogger {
    every: usize,
    started: Instant,
    frames: usize,
    stages: BTreeMap<String, RunningStat>,
    metrics: BTreeMap<String, RunningStat>,
}

impl LogPipelineLogger {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            started: Instant::now(),
            frames: 0,
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn stage(&self, name: &str) -> Option<&RunningStat> {
        self.stages.get(name)
    }

    pub fn metric_stat(&self, name: &str) -> Option<&RunningStat> {
        self.metrics.get(name)
    }

    /// `None` until a timing or metric has been recorded.
    pub fn summary_text(&self) -> Option<String> {
        if self.stages.is_empty() && self.metrics.is_empty() {
            return None;
        }
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Stream summary: {} frames in {:.1}s",
            self.frames,
            elapsed_ms / 1000.0
        )];

        for (stage, stat) in &self.stages {
            let share = if elapsed_ms > 0.0 {
                stat.sum / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:10} mean {:6.1}ms  min {:6.1}ms  max {:6.1}ms  ({share:4.1}% of wall time)",
                stat.mean(),
                stat.min,
                stat.max
            ));
        }
        for (name, stat) in &self.metrics {
            lines.push(format!("  {name}: mean {:.2} over {} frames", stat.mean(), stat.count));
        }
        if self.frames > 0 && elapsed_ms > 0.0 {
            lines.push(format!(
                "  {:.1} frames/s",
                self.frames as f64 / (elapsed_ms / 1000.0)
            ));
        }
        Some(lines.join("\n"))
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames = current;
        if total == 0 {
            if current % self.every == 0 {
                log::info!("Frame {current}");
            }
        } else if current % self.every == 0 || current == total {
            log::info!(
                "Frame {current}/{total} ({:.0}%)",
                current as f64 / total as f64 * 100.0
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        accumulate(&mut self.stages, stage, duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        accumulate(&mut self.metrics, name, value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_text() {
            log::info!("\n{text}");
        }
    }
}
