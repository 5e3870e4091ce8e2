use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{CommandFactory, Parser};
use thiserror::Error;

use facesort_core::clustering::domain::face_clusterer::{ClusteringPolicy, FaceClusterer};
use facesort_core::detection::infrastructure::arcface_embedder::ArcFaceEmbedder;
use facesort_core::detection::infrastructure::cosine_face_comparator::{
    CosineFaceComparator, DEFAULT_THRESHOLD,
};
use facesort_core::detection::infrastructure::onnx_yolo_detector::{
    OnnxYoloDetector, DEFAULT_CONFIDENCE,
};
use facesort_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use facesort_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use facesort_core::persons::infrastructure::person_directory_writer::PersonDirectoryWriter;
use facesort_core::pipeline::extract_faces_use_case::ExtractFacesUseCase;
use facesort_core::pipeline::sort_faces_use_case::SortFacesUseCase;
use facesort_core::shared::constants::{
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use facesort_core::shared::model_resolver;

const MORE_TOKEN: &str = "more";

const EXAMPLES: &str = "\
Examples:
    facesort /photos
    facesort /photos more
    facesort /photos /result
    facesort /photos /result more
    facesort /photos --model-dir /opt/facesort/models";

/// Extract faces from photos and save the faces of each person to their own folder.
#[derive(Parser, Debug)]
#[command(name = "facesort", after_help = EXAMPLES)]
struct Cli {
    /// Directory containing photos of people.
    source: PathBuf,

    /// Optional absolute destination directory (created if missing; defaults
    /// to the source), and/or `more` to compare every face with every other
    /// face. `more` finds people that look alike at a higher cost; without it
    /// a face that has been matched once is not compared again.
    #[arg(value_name = "DESTINATION | more")]
    extra: Vec<String>,

    /// Minimum embedding similarity for two faces to be the same person (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Directory holding the ONNX models. Models found there are used
    /// offline; missing ones are taken from the cache or downloaded.
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,
}

#[derive(Error, Debug, PartialEq)]
enum UsageError {
    #[error("No such directory: {}", .0.display())]
    NoSourceDir(PathBuf),
    #[error("Unable to parse arguments: {}", .0.join(" "))]
    Unparsed(Vec<String>),
    #[error("Threshold must be between 0.0 and 1.0, got {0}")]
    Threshold(f64),
    #[error("Confidence must be between 0.0 and 1.0, got {0}")]
    Confidence(f64),
    #[error("No such model directory: {}", .0.display())]
    NoModelDir(PathBuf),
}

/// Validated settings for one run.
#[derive(Debug, PartialEq)]
struct RunConfig {
    source: PathBuf,
    destination: PathBuf,
    policy: ClusteringPolicy,
    threshold: f64,
    confidence: f64,
    model_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Interprets the positional grammar `<source> [<destination>] [more]`.
    ///
    /// Performs no side effects; the destination is created later.
    fn from_cli(cli: &Cli) -> Result<Self, UsageError> {
        if !cli.source.is_dir() {
            return Err(UsageError::NoSourceDir(cli.source.clone()));
        }

        let more = cli.extra.iter().any(|arg| arg == MORE_TOKEN);
        let destination = cli
            .extra
            .first()
            .map(Path::new)
            .filter(|p| p.is_absolute())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cli.source.clone());

        // Extra arguments must name a separate destination, request `more`, or both.
        if !cli.extra.is_empty() && !more && destination == cli.source {
            return Err(UsageError::Unparsed(cli.extra.clone()));
        }
        if !(0.0..=1.0).contains(&cli.threshold) {
            return Err(UsageError::Threshold(cli.threshold));
        }
        if !(0.0..=1.0).contains(&cli.confidence) {
            return Err(UsageError::Confidence(cli.confidence));
        }
        if let Some(dir) = cli.model_dir.as_ref().filter(|d| !d.is_dir()) {
            return Err(UsageError::NoModelDir(dir.clone()));
        }

        Ok(Self {
            source: cli.source.clone(),
            destination,
            policy: ClusteringPolicy::from_transitive(more),
            threshold: cli.threshold,
            confidence: cli.confidence,
            model_dir: cli.model_dir.clone(),
        })
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}\n");
            eprintln!("{}", Cli::command().render_help());
            process::exit(2);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !config.destination.is_dir() {
        log::info!("Creating {}", config.destination.display());
        fs::create_dir_all(&config.destination)?;
    }

    let mut use_case = build_use_case(config)?;
    let summary = use_case.execute(&config.source, &config.destination)?;
    eprintln!();

    log::info!(
        "Sorted {} faces into {} person directories under {}",
        summary.faces,
        summary.groups,
        config.destination.display()
    );
    Ok(())
}

fn build_use_case(config: &RunConfig) -> Result<SortFacesUseCase, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {YOLO_MODEL_NAME}");
    let detector_path = model_resolver::resolve(
        YOLO_MODEL_NAME,
        YOLO_MODEL_URL,
        config.model_dir.as_deref(),
        Some(Box::new(|done, total| download_progress("face detection", done, total))),
    )?;
    log::info!("Resolving model: {EMBEDDING_MODEL_NAME}");
    let embedder_path = model_resolver::resolve(
        EMBEDDING_MODEL_NAME,
        EMBEDDING_MODEL_URL,
        config.model_dir.as_deref(),
        Some(Box::new(|done, total| download_progress("face embedding", done, total))),
    )?;

    let progress: Box<dyn Fn(usize, usize) + Send> = Box::new(|current, total| {
        eprint!("\rProcessing image {current}/{total}");
    });

    let extractor = ExtractFacesUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(OnnxYoloDetector::new(&detector_path, config.confidence)?),
        Box::new(ArcFaceEmbedder::new(&embedder_path)?),
        Some(progress),
    );
    let clusterer = FaceClusterer::new(
        Box::new(CosineFaceComparator::new(config.threshold)),
        config.policy,
    );
    let writer = PersonDirectoryWriter::new(Box::new(ImageFileWriter::new()));

    Ok(SortFacesUseCase::new(extractor, clusterer, writer))
}

fn download_progress(what: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {what} model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {what} model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("facesort").chain(args.iter().copied())).unwrap()
    }

    fn config(args: &[&str]) -> Result<RunConfig, UsageError> {
        RunConfig::from_cli(&parse(args))
    }

    #[test]
    fn test_missing_source_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["facesort"]).is_err());
    }

    #[test]
    fn test_source_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let result = config(&[missing.to_str().unwrap()]);
        assert_eq!(result, Err(UsageError::NoSourceDir(missing)));
    }

    #[test]
    fn test_source_only_writes_into_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().to_str().unwrap();
        let cfg = config(&[src]).unwrap();
        assert_eq!(cfg.destination, dir.path());
        assert_eq!(cfg.policy, ClusteringPolicy::StrictExclusive);
    }

    #[rstest]
    #[case(&["more"], false, true)]
    #[case(&["/result"], true, false)]
    #[case(&["/result", "more"], true, true)]
    #[case(&["more", "/result"], false, true)]
    fn test_optional_arguments(
        #[case] extra: &[&str],
        #[case] uses_destination: bool,
        #[case] transitive: bool,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().to_str().unwrap();
        let mut args = vec![src];
        args.extend_from_slice(extra);

        let cfg = config(&args).unwrap();

        let expected_dest = if uses_destination {
            PathBuf::from("/result")
        } else {
            dir.path().to_path_buf()
        };
        assert_eq!(cfg.destination, expected_dest);
        assert_eq!(cfg.policy, ClusteringPolicy::from_transitive(transitive));
    }

    #[rstest]
    #[case(&["relative/out"])]
    #[case(&["faster"])]
    fn test_unrecognized_extra_argument_is_usage_error(#[case] extra: &[&str]) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().to_str().unwrap();
        let mut args = vec![src];
        args.extend_from_slice(extra);

        assert!(matches!(config(&args), Err(UsageError::Unparsed(_))));
    }

    #[test]
    fn test_destination_equal_to_source_needs_more() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().to_str().unwrap();
        assert!(matches!(config(&[src, src]), Err(UsageError::Unparsed(_))));
        assert!(config(&[src, src, "more"]).is_ok());
    }

    #[test]
    fn test_validation_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        let dest = dir.path().join("dest");

        config(&[src.to_str().unwrap(), dest.to_str().unwrap()]).unwrap();
        assert!(!dest.exists());
    }

    #[rstest]
    #[case("--threshold", "1.5")]
    #[case("--confidence", "-0.1")]
    fn test_out_of_range_options(#[case] flag: &str, #[case] value: &str) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().to_str().unwrap();
        let arg = format!("{flag}={value}");
        assert!(config(&[src, &arg]).is_err());
    }

    #[test]
    fn test_model_dir_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().to_str().unwrap();
        let missing = dir.path().join("models");
        let arg = format!("--model-dir={}", missing.display());

        assert_eq!(config(&[src, &arg]), Err(UsageError::NoModelDir(missing)));
    }

    #[test]
    fn test_model_dir_is_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().to_str().unwrap();
        let arg = format!("--model-dir={src}");

        let cfg = config(&[src, &arg]).unwrap();
        assert_eq!(cfg.model_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_default_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&[dir.path().to_str().unwrap()]).unwrap();
        assert_eq!(cfg.threshold, DEFAULT_THRESHOLD);
        assert_eq!(cfg.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(cfg.model_dir, None);
    }
}
