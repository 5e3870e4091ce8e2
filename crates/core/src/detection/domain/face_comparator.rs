/// Domain interface for the same-person decision.
///
/// Returns a mask aligned to `candidates`: entry `i` is `true` when
/// `candidates[i]` depicts the same person as `reference`.
pub trait FaceComparator: Send {
    fn compare(&self, reference: &[f32], candidates: &[&[f32]]) -> Vec<bool>;
}
