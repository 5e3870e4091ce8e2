use std::path::PathBuf;

use crate::shared::frame::Frame;

/// Fixed-length face descriptor produced by an embedding model.
///
/// Opaque to everything except a [`FaceComparator`](crate::detection::domain::face_comparator::FaceComparator).
pub type Embedding = Vec<f32>;

/// One detected face: its embedding and the cropped raster it came from.
#[derive(Clone, Debug)]
pub struct Face {
    pub embedding: Embedding,
    pub image: Frame,
    /// Photo the face was found in.
    pub source: PathBuf,
}

impl Face {
    pub fn new(embedding: Embedding, image: Frame, source: PathBuf) -> Self {
        Self {
            embedding,
            image,
            source,
        }
    }
}
