pub mod cascade_eye_locator;
pub mod landmark_eye_locator;
pub mod onnx_landmark_model;
