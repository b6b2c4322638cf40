pub const SSD_MODEL_NAME: &str = "face_detector_ssd_300.onnx";
pub const LANDMARK_MODEL_NAME: &str = "face_landmarks_68.onnx";
pub const FACE_CASCADE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";

/// Default detector confidence; the accepted range is (0.1, 1.0].
pub const DEFAULT_CONFIDENCE: f32 = 0.7;

/// Default canonical crop size in pixels.
pub const DEFAULT_ALIGNED_SIZE: u32 = 224;

/// Crop sides must exceed this many pixels.
pub const MIN_ALIGNED_SIZE: u32 = 31;

/// Default fractional position of the left eye in the aligned crop.
pub const DEFAULT_EYE_POSITION: (f64, f64) = (0.35, 0.35);

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
