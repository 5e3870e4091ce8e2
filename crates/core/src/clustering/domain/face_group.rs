use crate::shared::face::Face;

/// Faces believed to depict one person, as positions in the face list.
///
/// Groups refer to faces by index so that overlapping groups share rasters
/// instead of copying them. Member order is significant: it becomes the
/// `face<M>` numbering on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceGroup {
    members: Vec<usize>,
}

impl FaceGroup {
    pub fn new(members: Vec<usize>) -> Self {
        debug_assert!(!members.is_empty(), "a face group is never empty");
        Self { members }
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True when every face in `candidate` is also in this group.
    pub fn contains_all(&self, candidate: &[usize]) -> bool {
        candidate.iter().all(|idx| self.members.contains(idx))
    }

    /// Resolves member indices against the face list the group was built from.
    pub fn faces<'a>(&'a self, faces: &'a [Face]) -> impl Iterator<Item = &'a Face> + 'a {
        self.members.iter().map(move |&idx| &faces[idx])
    }
}
