pub mod extract_faces_use_case;
pub mod sort_faces_use_case;
