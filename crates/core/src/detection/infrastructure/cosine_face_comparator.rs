use crate::detection::domain::face_comparator::FaceComparator;
use crate::detection::infrastructure::math::cosine_similarity;

/// Minimum cosine similarity for two ArcFace embeddings to count as the
/// same person.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Thresholded cosine similarity over L2-normalized embeddings.
pub struct CosineFaceComparator {
    threshold: f64,
}

impl CosineFaceComparator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for CosineFaceComparator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl FaceComparator for CosineFaceComparator {
    fn compare(&self, reference: &[f32], candidates: &[&[f32]]) -> Vec<bool> {
        candidates
            .iter()
            .map(|c| cosine_similarity(reference, c) >= self.threshold)
            .collect()
    }
}
