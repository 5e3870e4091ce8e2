pub mod arcface_embedder;
pub mod cosine_face_comparator;
pub mod execution_provider;
pub mod math;
pub mod onnx_yolo_detector;
