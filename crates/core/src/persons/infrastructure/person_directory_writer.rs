use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::clustering::domain::face_group::FaceGroup;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::persons::domain::person_number::{NumberingError, PersonNumber};
use crate::shared::constants::{FACE_FILE_EXTENSION, FACE_FILE_PREFIX};
use crate::shared::face::Face;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create person directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot number person directories in {path}: {source}")]
    Numbering {
        path: PathBuf,
        #[source]
        source: NumberingError,
    },
    #[error("failed to write face image {path}: {source}")]
    WriteImage {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
}

/// Highest `person<N>` subdirectory number in `dir`, if any.
///
/// Only directories count; files with matching names are ignored.
pub fn highest_person_number(dir: &Path) -> Result<Option<PersonNumber>, WriteError> {
    let scan_err = |e: std::io::Error| WriteError::Scan {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut highest = None;
    for entry in fs::read_dir(dir).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        if !entry.file_type().map_err(scan_err)?.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let parsed = PersonNumber::parse_dir_name(name).map_err(|e| WriteError::Numbering {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let Some(number) = parsed else {
            continue;
        };
        highest = highest.max(Some(number));
    }
    Ok(highest)
}

/// Persists each group as `person<N>/face<M>.jpg` under a destination.
///
/// Numbering continues after the highest existing person directory, so
/// repeated runs into the same destination never reuse a directory.
pub struct PersonDirectoryWriter {
    image_writer: Box<dyn ImageWriter>,
}

impl PersonDirectoryWriter {
    pub fn new(image_writer: Box<dyn ImageWriter>) -> Self {
        Self { image_writer }
    }

    /// Writes every group in order and returns the created directories.
    ///
    /// Directories are created non-recursively; an existing entry with the
    /// same name is an error. Groups written before a failure stay on disk.
    pub fn write(
        &self,
        faces: &[Face],
        groups: &[FaceGroup],
        destination: &Path,
    ) -> Result<Vec<PathBuf>, WriteError> {
        let numbering_err = |e: NumberingError| WriteError::Numbering {
            path: destination.to_path_buf(),
            source: e,
        };
        let start = PersonNumber::next_after(highest_person_number(destination)?)
            .map_err(numbering_err)?;
        let mut created = Vec::with_capacity(groups.len());

        for (offset, group) in groups.iter().enumerate() {
            let number = start.offset(offset).map_err(numbering_err)?;
            let person_dir = destination.join(number.dir_name());
            fs::create_dir(&person_dir).map_err(|e| WriteError::CreateDir {
                path: person_dir.clone(),
                source: e,
            })?;

            for (j, face) in group.faces(faces).enumerate() {
                let path = person_dir.join(format!(
                    "{FACE_FILE_PREFIX}{}.{FACE_FILE_EXTENSION}",
                    j + 1
                ));
                self.image_writer
                    .write(&path, &face.image)
                    .map_err(|e| WriteError::WriteImage {
                        path: path.clone(),
                        source: e,
                    })?;
            }

            log::debug!(
                "Wrote {} faces to {}",
                group.len(),
                person_dir.display()
            );
            created.push(person_dir);
        }

        Ok(created)
    }
}
