pub mod face_comparator;
pub mod face_detector;
pub mod face_embedder;
