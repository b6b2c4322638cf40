use thiserror::Error;

use super::model_resolver::ModelResolveError;

/// Failures raised by pipeline stages and their construction.
///
/// Startup errors (`Config`, `ModelLoad`) are fatal. `Inference` skips the
/// current frame and `FitFailure` means "no landmarks"; the driver absorbs
/// both and keeps the loop running.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to load model {model}: {reason}")]
    ModelLoad { model: String, reason: String },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("landmark fit failed: {0}")]
    FitFailure(String),
}

impl PipelineError {
    pub fn model_load(model: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::ModelLoad {
            model: model.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that only invalidate the current frame.
    pub fn is_per_frame(&self) -> bool {
        matches!(self, PipelineError::Inference(_) | PipelineError::FitFailure(_))
    }
}

impl From<ModelResolveError> for PipelineError {
    fn from(e: ModelResolveError) -> Self {
        let model = match &e {
            ModelResolveError::NotFound { name } => name.clone(),
            ModelResolveError::Download { url, .. } => url.clone(),
            ModelResolveError::Write { path, .. } => path.display().to_string(),
            ModelResolveError::CacheDir(_) | ModelResolveError::NoCacheDir => String::new(),
        };
        PipelineError::ModelLoad {
            model,
            reason: e.to_string(),
        }
    }
}
