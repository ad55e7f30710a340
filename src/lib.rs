//! Labeldesk: a YOLO annotation backend.
//!
//! Labeldesk reads and writes YOLO label files for a directory of images,
//! converting between the normalized boxes stored on disk and the pixel
//! boxes an annotation editor works with. Saved boxes are validated and
//! clamped to the image first.
//!
//! # Modules
//!
//! - [`ir`]: Box types, coordinate transforms, and file formats
//! - [`validation`]: Save-time box validation and issue reporting
//! - [`dataset`]: Dataset layout discovery and image listing
//! - [`annotations`]: Load/save of a single image's annotations
//! - [`quality`]: Dataset-wide annotation quality report
//! - [`error`]: Error types for labeldesk operations

pub mod annotations;
pub mod dataset;
pub mod error;
pub mod ir;
pub mod quality;
pub mod validation;

#[cfg(test)]
mod test_support;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub use error::LabeldeskError;

use crate::dataset::DatasetLayout;
use crate::ir::{classes, io_coco_json, io_voc_xml, PixelBox};

/// The labeldesk CLI application.
#[derive(Parser)]
#[command(name = "labeldesk")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List images and whether each has labels.
    Images(RootArgs),
    /// List images that have labels.
    Annotated(AnnotatedArgs),
    /// Print an image's boxes in pixel coordinates.
    Load(ImageArgs),
    /// Validate pixel boxes and write them as the image's label file.
    Save(SaveArgs),
    /// Manage the class list.
    #[command(subcommand)]
    Classes(ClassesCommand),
    /// Export the dataset as COCO JSON or Pascal VOC XML.
    Export(ExportArgs),
    /// Check annotation quality across the dataset.
    Report(ReportArgs),
    /// Delete an image and its label file.
    Delete(ImageArgs),
}

#[derive(clap::Args)]
struct RootArgs {
    /// Dataset root directory.
    root: PathBuf,
}

#[derive(clap::Args)]
struct AnnotatedArgs {
    /// Dataset root directory.
    root: PathBuf,

    /// Only list images containing this class id.
    #[arg(long)]
    class_id: Option<u32>,
}

#[derive(clap::Args)]
struct ImageArgs {
    /// Dataset root directory.
    root: PathBuf,

    /// Image path, absolute or relative to the dataset.
    image: PathBuf,
}

#[derive(clap::Args)]
struct SaveArgs {
    /// Dataset root directory.
    root: PathBuf,

    /// Image path, absolute or relative to the dataset.
    image: PathBuf,

    /// JSON file with pixel boxes ('-' for stdin).
    #[arg(long, default_value = "-")]
    boxes: PathBuf,

    /// Minimum box side in pixels before a warning is raised.
    #[arg(long, env = "LABELDESK_MIN_BOX_SIZE", default_value_t = validation::DEFAULT_MIN_BOX_SIZE)]
    min_box_size: f64,
}

#[derive(Subcommand)]
enum ClassesCommand {
    /// Print the class list.
    List(RootArgs),
    /// Replace the class list.
    Save(ClassesSaveArgs),
    /// Read class names from a YOLO data.yaml file.
    Import(ClassesImportArgs),
}

#[derive(clap::Args)]
struct ClassesSaveArgs {
    /// Dataset root directory.
    root: PathBuf,

    /// Class names in id order.
    names: Vec<String>,
}

#[derive(clap::Args)]
struct ClassesImportArgs {
    /// YAML file with a 'names' key.
    yaml: PathBuf,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Dataset root directory.
    root: PathBuf,

    /// Export format ('coco' or 'voc').
    #[arg(long)]
    format: String,

    /// Output file (coco) or directory (voc). Defaults to a path under the root.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ReportArgs {
    /// Dataset root directory.
    root: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Minimum box side in pixels.
    #[arg(long, env = "LABELDESK_MIN_BOX_SIZE", default_value_t = validation::DEFAULT_MIN_BOX_SIZE)]
    min_box_size: f64,

    /// IoU above which two boxes of the same class are flagged.
    #[arg(long, env = "LABELDESK_OVERLAP_THRESHOLD", default_value_t = quality::DEFAULT_OVERLAP_THRESHOLD)]
    overlap_threshold: f64,
}

/// Run the labeldesk CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabeldeskError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Images(args)) => run_images(args),
        Some(Commands::Annotated(args)) => run_annotated(args),
        Some(Commands::Load(args)) => run_load(args),
        Some(Commands::Save(args)) => run_save(args),
        Some(Commands::Classes(cmd)) => run_classes(cmd),
        Some(Commands::Export(args)) => run_export(args),
        Some(Commands::Report(args)) => run_report(args),
        Some(Commands::Delete(args)) => run_delete(args),
        None => {
            println!("labeldesk {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("A YOLO annotation backend.");
            println!();
            println!("Run 'labeldesk --help' for usage information.");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), LabeldeskError> {
    let json = serde_json::to_string_pretty(value).map_err(LabeldeskError::OutputSerialize)?;
    println!("{json}");
    Ok(())
}

fn run_images(args: RootArgs) -> Result<(), LabeldeskError> {
    let layout = DatasetLayout::discover(&args.root)?;
    print_json(&layout.scan()?)
}

fn run_annotated(args: AnnotatedArgs) -> Result<(), LabeldeskError> {
    let layout = DatasetLayout::discover(&args.root)?;
    print_json(&layout.annotated_images(args.class_id)?)
}

fn run_load(args: ImageArgs) -> Result<(), LabeldeskError> {
    print_json(&annotations::load_annotations(&args.root, &args.image)?)
}

/// Accepted shapes for the boxes payload of `save`.
#[derive(Deserialize)]
#[serde(untagged)]
enum BoxesPayload {
    List(Vec<PixelBox>),
    Request { boxes: Vec<PixelBox> },
}

fn read_boxes(source: &Path) -> Result<Vec<PixelBox>, LabeldeskError> {
    let raw = if source == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(LabeldeskError::io(source))?;
        buf
    } else {
        std::fs::read_to_string(source).map_err(LabeldeskError::io(source))?
    };

    let payload: BoxesPayload =
        serde_json::from_str(&raw).map_err(|source_err| LabeldeskError::BoxesJsonParse {
            path: source.to_path_buf(),
            source: source_err,
        })?;

    Ok(match payload {
        BoxesPayload::List(boxes) | BoxesPayload::Request { boxes } => boxes,
    })
}

fn run_save(args: SaveArgs) -> Result<(), LabeldeskError> {
    let boxes = read_boxes(&args.boxes)?;
    let opts = validation::SaveOptions {
        min_box_size: args.min_box_size,
    };
    print_json(&annotations::save_annotations(
        &args.root,
        &args.image,
        &boxes,
        &opts,
    )?)
}

fn run_classes(cmd: ClassesCommand) -> Result<(), LabeldeskError> {
    match cmd {
        ClassesCommand::List(args) => {
            let layout = DatasetLayout::discover(&args.root)?;
            print_json(&classes::read_classes_txt(&layout.classes_path())?)
        }
        ClassesCommand::Save(args) => {
            let path = classes::write_classes_txt(&args.root, &args.names)?;
            print_json(&serde_json::json!({
                "status": "saved",
                "file": path,
                "count": args.names.len(),
            }))
        }
        ClassesCommand::Import(args) => print_json(&classes::read_yaml_classes(&args.yaml)?),
    }
}

fn run_export(args: ExportArgs) -> Result<(), LabeldeskError> {
    let layout = DatasetLayout::discover(&args.root)?;

    match args.format.as_str() {
        "coco" | "coco-json" => {
            let dataset = layout.load_dataset()?;
            let path = args
                .output
                .unwrap_or_else(|| layout.root.join(io_coco_json::COCO_OUTPUT_FILE));
            io_coco_json::write_coco_json(&path, &dataset)?;
            print_json(&serde_json::json!({
                "format": "coco",
                "path": path,
                "images": dataset.images.len(),
                "annotations": dataset.box_count(),
            }))
        }
        "voc" | "voc-xml" => {
            let dataset = layout.load_dataset()?;
            let dir = args
                .output
                .unwrap_or_else(|| layout.root.join(io_voc_xml::VOC_OUTPUT_DIR));
            let files = io_voc_xml::write_voc_dir(&dir, &dataset)?;
            print_json(&serde_json::json!({
                "format": "voc",
                "path": dir,
                "files": files,
            }))
        }
        other => Err(LabeldeskError::UnsupportedFormat(format!(
            "'{}' (supported: coco, voc)",
            other
        ))),
    }
}

fn run_report(args: ReportArgs) -> Result<(), LabeldeskError> {
    let layout = DatasetLayout::discover(&args.root)?;
    let dataset = layout.load_dataset()?;

    let opts = quality::ReportOptions {
        min_box_size: args.min_box_size,
        overlap_threshold: args.overlap_threshold,
    };
    let report = quality::quality_report(&dataset, &opts)?;

    match args.output.as_str() {
        "json" => print_json(&report)?,
        "text" => print!("{}", report),
        other => {
            return Err(LabeldeskError::UnsupportedFormat(format!(
                "report output '{}' (supported: text, json)",
                other
            )));
        }
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(LabeldeskError::ReportFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
        })
    } else {
        Ok(())
    }
}

fn run_delete(args: ImageArgs) -> Result<(), LabeldeskError> {
    let layout = DatasetLayout::discover(&args.root)?;
    print_json(&layout.delete_image(&args.image)?)
}
