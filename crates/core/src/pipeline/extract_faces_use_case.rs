use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_embedder::FaceEmbedder;
use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::face::Face;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to list {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("face detection failed for {path}: {source}")]
    Detection {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("face embedding failed for {path}: {source}")]
    Embedding {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("{path}: detector found {boxes} faces but embedder produced {embeddings} vectors")]
    Integrity {
        path: PathBuf,
        boxes: usize,
        embeddings: usize,
    },
}

/// Image files directly inside `dir`, in directory listing order.
///
/// Extensions are matched case-sensitively, so `photo.JPG` is skipped.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let list_err = |e: std::io::Error| ExtractError::List {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut images = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && has_image_extension(&path) {
            images.push(path);
        }
    }
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}

/// Turns a folder of photos into a flat, ordered face list:
/// read → detect → embed → check counts → crop.
///
/// Faces from earlier files precede faces from later files; within a file
/// they follow the detector's box order.
pub struct ExtractFacesUseCase {
    reader: Box<dyn ImageReader>,
    detector: Box<dyn FaceDetector>,
    embedder: Box<dyn FaceEmbedder>,
    on_progress: Option<Box<dyn Fn(usize, usize) + Send>>,
}

impl ExtractFacesUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        detector: Box<dyn FaceDetector>,
        embedder: Box<dyn FaceEmbedder>,
        on_progress: Option<Box<dyn Fn(usize, usize) + Send>>,
    ) -> Self {
        Self {
            reader,
            detector,
            embedder,
            on_progress,
        }
    }

    pub fn execute(&mut self, source: &Path) -> Result<Vec<Face>, ExtractError> {
        let images = list_images(source)?;
        log::info!("Found {} images in {}", images.len(), source.display());

        let mut faces = Vec::new();
        for (i, path) in images.iter().enumerate() {
            let found = self.extract_image(path)?;
            log::debug!("{}: {} faces", path.display(), found.len());
            faces.extend(found);

            if let Some(ref callback) = self.on_progress {
                callback(i + 1, images.len());
            }
        }

        log::info!("Extracted {} faces", faces.len());
        Ok(faces)
    }

    fn extract_image(&mut self, path: &Path) -> Result<Vec<Face>, ExtractError> {
        let frame = self.reader.read(path).map_err(|e| ExtractError::Decode {
            path: path.to_path_buf(),
            source: e,
        })?;

        let boxes = self
            .detector
            .detect(&frame)
            .map_err(|e| ExtractError::Detection {
                path: path.to_path_buf(),
                source: e,
            })?;
        if boxes.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .embedder
            .embed(&frame, &boxes)
            .map_err(|e| ExtractError::Embedding {
                path: path.to_path_buf(),
                source: e,
            })?;
        if embeddings.len() != boxes.len() {
            return Err(ExtractError::Integrity {
                path: path.to_path_buf(),
                boxes: boxes.len(),
                embeddings: embeddings.len(),
            });
        }

        Ok(embeddings
            .into_iter()
            .zip(&boxes)
            .map(|(embedding, b)| Face::new(embedding, frame.crop(b), path.to_path_buf()))
            .collect())
    }
}
