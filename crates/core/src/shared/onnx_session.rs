use std::path::Path;

use crate::shared::error::PipelineError;

/// Return the preferred ONNX execution providers for the current platform.
///
/// Falls back to CPU if the platform-specific provider is unavailable.
pub fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

/// Opens an ONNX model, mapping every failure to `ModelLoad`.
pub fn load_session(model_path: &Path) -> Result<ort::session::Session, PipelineError> {
    let model = model_path.display().to_string();
    if !model_path.is_file() {
        return Err(PipelineError::model_load(model, "file not found"));
    }
    open_session(model_path).map_err(|e| PipelineError::model_load(model, e))
}

fn open_session(model_path: &Path) -> Result<ort::session::Session, Box<dyn std::error::Error>> {
    let session = ort::session::Session::builder()?
        .with_execution_providers(preferred_execution_providers())?
        .commit_from_file(model_path)?;
    log::info!("Loaded ONNX model {}", model_path.display());
    Ok(session)
}

/// Square spatial size from an NCHW input shape, if the model declares one.
pub fn declared_input_size(session: &ort::session::Session) -> Option<u32> {
    session.inputs().first().and_then(|input| {
        if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
            (shape.len() >= 4 && shape[2] > 0).then(|| shape[2] as u32)
        } else {
            None
        }
    })
}
