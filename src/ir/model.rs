//! In-memory snapshot of a dataset, as consumed by exporters and reports.
//!
//! A [`Dataset`] is built fresh from disk for each export or report and is
//! never cached. Its boxes come from the label file reader only.

use std::path::PathBuf;

use serde::Serialize;

use super::classes::ClassEntry;
use super::dims::ImageDimensions;
use super::io_yolo::LabelFile;

/// All images of a dataset with their parsed label files.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Dataset {
    /// Dataset root directory.
    pub root: PathBuf,

    /// Class list from `classes.txt` (may be empty).
    pub classes: Vec<ClassEntry>,

    /// Images in listing order.
    pub images: Vec<ImageEntry>,

    /// Images left out because their dimensions or labels could not be read.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedImage>,
}

impl Dataset {
    /// Looks up a class name by id.
    pub fn class_name(&self, class_id: u32) -> Option<&str> {
        self.classes
            .iter()
            .find(|class| class.id == class_id)
            .map(|class| class.name.as_str())
    }

    /// Total number of boxes across all images.
    pub fn box_count(&self) -> usize {
        self.images.iter().map(|image| image.labels.boxes.len()).sum()
    }
}

/// One image and its annotations.
#[derive(Clone, Debug, Serialize)]
pub struct ImageEntry {
    /// File name relative to the images directory.
    pub file_name: String,

    /// Full path of the image file.
    pub image_path: PathBuf,

    /// Path of the paired label file (which may not exist).
    pub label_path: PathBuf,

    /// Pixel dimensions of the image.
    pub dims: ImageDimensions,

    /// Whether the label file exists on disk.
    pub has_label_file: bool,

    /// Parsed label file contents.
    pub labels: LabelFile,
}

/// An image that could not be included in a snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct SkippedImage {
    pub image_path: PathBuf,
    pub reason: String,
}
