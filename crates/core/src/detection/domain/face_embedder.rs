use crate::shared::face::Embedding;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for face embedding extraction.
///
/// Must return exactly one embedding per box, in box order. Callers treat a
/// count mismatch as an integrity failure.
pub trait FaceEmbedder: Send {
    fn embed(
        &mut self,
        frame: &Frame,
        boxes: &[FaceBox],
    ) -> Result<Vec<Embedding>, Box<dyn std::error::Error>>;
}
