pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

/// Matched case-sensitively against the file extension.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg"];

pub const PERSON_DIR_PREFIX: &str = "person";
pub const FACE_FILE_PREFIX: &str = "face";
pub const FACE_FILE_EXTENSION: &str = "jpg";

/// Application directory name under the platform cache directory.
pub const APP_DIR_NAME: &str = "FaceSort";
