pub mod face_clusterer;
pub mod face_group;
