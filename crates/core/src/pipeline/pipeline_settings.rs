use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alignment::alignment_target::AlignmentTarget;
use crate::detection::domain::cascade_classifier::CascadeSettings;
use crate::detection::infrastructure::onnx_ssd_detector::SsdConfig;
use crate::landmarks::infrastructure::onnx_landmark_model::DEFAULT_MARGIN;
use crate::shared::constants::{
    DEFAULT_CONFIDENCE, FACE_CASCADE_MODEL_NAME, LANDMARK_MODEL_NAME, SSD_MODEL_NAME,
};
use crate::shared::error::PipelineError;
use crate::validation::detection_validator::ValidationConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Cascade,
    #[default]
    Ssd,
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorKind::Cascade => write!(f, "cascade"),
            DetectorKind::Ssd => write!(f, "ssd"),
        }
    }
}

impl FromStr for DetectorKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cascade" => Ok(DetectorKind::Cascade),
            "ssd" => Ok(DetectorKind::Ssd),
            other => Err(PipelineError::Config(format!("unknown detector '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    #[default]
    Landmarks,
    Cascade,
}

impl std::fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocatorKind::Landmarks => write!(f, "landmarks"),
            LocatorKind::Cascade => write!(f, "cascade"),
        }
    }
}

impl FromStr for LocatorKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "landmarks" => Ok(LocatorKind::Landmarks),
            "cascade" => Ok(LocatorKind::Cascade),
            other => Err(PipelineError::Config(format!("unknown locator '{other}'"))),
        }
    }
}

/// Model identifiers: a path, or a file name looked up in the model cache.
/// URLs are only used when the file is missing locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub ssd: String,
    pub ssd_url: Option<String>,
    pub landmarks: String,
    pub landmarks_url: Option<String>,
    pub face_cascade: String,
    pub face_cascade_url: Option<String>,
    /// No eye cascade ships by default; required by the cascade locator.
    pub eye_cascade: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            ssd: SSD_MODEL_NAME.to_string(),
            ssd_url: None,
            landmarks: LANDMARK_MODEL_NAME.to_string(),
            landmarks_url: None,
            face_cascade: FACE_CASCADE_MODEL_NAME.to_string(),
            face_cascade_url: None,
            eye_cascade: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub show_landmarks: bool,
    /// TrueType/OpenType font for the status text; no text without one.
    pub font: Option<PathBuf>,
    pub font_size: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            show_landmarks: false,
            font: None,
            font_size: 16.0,
        }
    }
}

/// Everything needed to build a pipeline, fixed before the first frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub detector: DetectorKind,
    pub locator: LocatorKind,
    pub confidence: f32,
    pub target: AlignmentTarget,
    pub validation: ValidationConfig,
    pub face_cascade: CascadeSettings,
    #[serde(default = "CascadeSettings::for_eyes")]
    pub eye_cascade: CascadeSettings,
    pub ssd: SsdConfig,
    pub landmark_margin: f64,
    pub overlay: OverlaySettings,
    pub models: ModelSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            detector: DetectorKind::default(),
            locator: LocatorKind::default(),
            confidence: DEFAULT_CONFIDENCE,
            target: AlignmentTarget::default(),
            validation: ValidationConfig::default(),
            face_cascade: CascadeSettings::for_faces(),
            eye_cascade: CascadeSettings::for_eyes(),
            ssd: SsdConfig::default(),
            landmark_margin: DEFAULT_MARGIN,
            overlay: OverlaySettings::default(),
            models: ModelSettings::default(),
        }
    }
}

impl PipelineSettings {
    pub fn load_json(path: &Path) -> Result<Self, PipelineError> {
        let json = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&json)
            .map_err(|e| PipelineError::Config(format!("invalid settings {}: {e}", path.display())))
    }

    pub fn save_json(&self, path: &Path) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::Config(e.to_string()))?;
        }
        fs::write(path, json)
            .map_err(|e| PipelineError::Config(format!("cannot write {}: {e}", path.display())))
    }

    /// Validation thresholds with the optional checks settled for the
    /// configured detector and locator.
    pub fn effective_validation(&self) -> ValidationConfig {
        self.validation.resolved(
            self.detector == DetectorKind::Cascade,
            self.locator == LocatorKind::Cascade,
        )
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.confidence > 0.1 && self.confidence <= 1.0) {
            return Err(PipelineError::Config(format!(
                "confidence must be in (0.1, 1.0], got {}",
                self.confidence
            )));
        }
        self.target.validate()?;
        self.validation.validate()?;
        if self.detector == DetectorKind::Cascade {
            self.face_cascade.validate()?;
        }
        if self.locator == LocatorKind::Cascade {
            self.eye_cascade.validate()?;
            if self.models.eye_cascade.is_none() {
                return Err(PipelineError::Config(
                    "the cascade eye locator needs an eye cascade model".into(),
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.landmark_margin) {
            return Err(PipelineError::Config(format!(
                "landmark margin must be in [0.0, 1.0], got {}",
                self.landmark_margin
            )));
        }
        if self.overlay.font_size.is_nan() || self.overlay.font_size <= 0.0 {
            return Err(PipelineError::Config(format!(
                "font size must be positive, got {}",
                self.overlay.font_size
            )));
        }
        Ok(())
    }
}
