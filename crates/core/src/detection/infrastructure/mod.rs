pub mod cascade_face_detector;
pub mod onnx_ssd_detector;
pub mod rustface_cascade;
