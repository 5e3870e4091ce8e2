use crate::clustering::domain::face_group::FaceGroup;
use crate::detection::domain::face_comparator::FaceComparator;
use crate::shared::face::Face;

/// How a face that already joined a group is treated by later pivots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusteringPolicy {
    /// Matched faces leave the pool. Produces a true partition with one
    /// comparator pass per group.
    StrictExclusive,
    /// Only the pivot leaves the pool, so every face is compared against
    /// every later pivot. Groups may overlap; a group that some earlier group
    /// already covers is dropped.
    TransitiveLenient,
}

impl ClusteringPolicy {
    pub fn from_transitive(transitive: bool) -> Self {
        if transitive {
            Self::TransitiveLenient
        } else {
            Self::StrictExclusive
        }
    }
}

/// Greedy single-link clustering over an external same-person predicate.
///
/// Output depends on face list order: the first remaining face is always the
/// next pivot, and a pivot is placed after the faces it matched.
pub struct FaceClusterer {
    comparator: Box<dyn FaceComparator>,
    policy: ClusteringPolicy,
}

impl FaceClusterer {
    pub fn new(comparator: Box<dyn FaceComparator>, policy: ClusteringPolicy) -> Self {
        Self { comparator, policy }
    }

    pub fn cluster(&self, faces: &[Face]) -> Vec<FaceGroup> {
        let groups = match self.policy {
            ClusteringPolicy::StrictExclusive => self.cluster_strict(faces),
            ClusteringPolicy::TransitiveLenient => self.cluster_lenient(faces),
        };
        log::info!(
            "Clustered {} faces into {} groups ({:?})",
            faces.len(),
            groups.len(),
            self.policy
        );
        groups
    }

    fn cluster_strict(&self, faces: &[Face]) -> Vec<FaceGroup> {
        let mut consumed = vec![false; faces.len()];
        let mut remaining: Vec<usize> = (0..faces.len()).collect();
        let mut groups = Vec::new();

        while remaining.len() > 1 {
            let (pivot, rest) = (remaining[0], &remaining[1..]);
            let matched = self.match_pivot(faces, pivot, rest);
            for &idx in &matched {
                consumed[idx] = true;
            }
            consumed[pivot] = true;
            groups.push(with_pivot(matched, pivot));
            remaining = rest.iter().copied().filter(|&idx| !consumed[idx]).collect();
        }

        if let [last] = remaining.as_slice() {
            groups.push(FaceGroup::new(vec![*last]));
        }
        groups
    }

    fn cluster_lenient(&self, faces: &[Face]) -> Vec<FaceGroup> {
        let mut remaining: Vec<usize> = (0..faces.len()).collect();
        let mut groups: Vec<FaceGroup> = Vec::new();

        while remaining.len() > 1 {
            let (pivot, rest) = (remaining[0], &remaining[1..]);
            let matched = self.match_pivot(faces, pivot, rest);
            let candidate = with_pivot(matched, pivot);
            if is_already_matched(&groups, candidate.members()) {
                log::debug!("Dropping group {:?}: already covered", candidate.members());
            } else {
                groups.push(candidate);
            }
            remaining = rest.to_vec();
        }

        if let [last] = remaining.as_slice() {
            if !is_already_matched(&groups, &[*last]) {
                groups.push(FaceGroup::new(vec![*last]));
            }
        }
        groups
    }

    /// Faces in `rest` that the comparator matches against `pivot`, in `rest` order.
    fn match_pivot(&self, faces: &[Face], pivot: usize, rest: &[usize]) -> Vec<usize> {
        let candidates: Vec<&[f32]> = rest
            .iter()
            .map(|&idx| faces[idx].embedding.as_slice())
            .collect();
        let mask = self.comparator.compare(&faces[pivot].embedding, &candidates);
        if mask.len() != rest.len() {
            log::warn!(
                "Comparator returned {} results for {} candidates; missing entries count as no match",
                mask.len(),
                rest.len()
            );
        }

        rest.iter()
            .zip(mask)
            .filter_map(|(&idx, is_match)| is_match.then_some(idx))
            .collect()
    }
}

fn with_pivot(mut matched: Vec<usize>, pivot: usize) -> FaceGroup {
    matched.push(pivot);
    FaceGroup::new(matched)
}

/// True when some existing group already holds every face of `candidate`.
pub fn is_already_matched(groups: &[FaceGroup], candidate: &[usize]) -> bool {
    groups.iter().any(|g| g.contains_all(candidate))
}
