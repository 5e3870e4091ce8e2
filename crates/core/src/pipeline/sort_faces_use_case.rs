use std::path::{Path, PathBuf};

use crate::clustering::domain::face_clusterer::FaceClusterer;
use crate::persons::infrastructure::person_directory_writer::PersonDirectoryWriter;
use crate::pipeline::extract_faces_use_case::ExtractFacesUseCase;

/// What a sorting run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSummary {
    pub faces: usize,
    pub groups: usize,
    pub directories: Vec<PathBuf>,
}

/// Full batch: extract faces from a photo folder, cluster them by person,
/// and write one directory per group.
///
/// Runs to completion or stops at the first error. Directories written
/// before a failure are left in place.
pub struct SortFacesUseCase {
    extractor: ExtractFacesUseCase,
    clusterer: FaceClusterer,
    writer: PersonDirectoryWriter,
}

impl SortFacesUseCase {
    pub fn new(
        extractor: ExtractFacesUseCase,
        clusterer: FaceClusterer,
        writer: PersonDirectoryWriter,
    ) -> Self {
        Self {
            extractor,
            clusterer,
            writer,
        }
    }

    pub fn execute(
        &mut self,
        source: &Path,
        destination: &Path,
    ) -> Result<SortSummary, Box<dyn std::error::Error>> {
        let faces = self.extractor.execute(source)?;
        let groups = self.clusterer.cluster(&faces);
        let directories = self.writer.write(&faces, &groups, destination)?;

        Ok(SortSummary {
            faces: faces.len(),
            groups: groups.len(),
            directories,
        })
    }
}
