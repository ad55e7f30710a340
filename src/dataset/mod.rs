//! Dataset discovery on disk.
//!
//! A dataset root either has the structured layout (`images/` and
//! `labels/` side by side) or is flat, with images and label files mixed
//! in one directory. The class list always lives at `<root>/classes.txt`.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::LabeldeskError;
use crate::ir::classes::{read_classes_txt, CLASSES_FILE};
use crate::ir::io_yolo::read_label_file;
use crate::ir::{Dataset, ImageDimensions, ImageEntry, SkippedImage};

/// Image extensions recognized in listings, in lookup order.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];
const LABEL_EXTENSION: &str = "txt";
const IMAGES_DIR: &str = "images";
const LABELS_DIR: &str = "labels";

/// Resolved directory layout of a dataset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetLayout {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

impl DatasetLayout {
    /// Resolve the layout of a dataset root.
    ///
    /// Uses `images/` + `labels/` when `images/` exists, otherwise treats the
    /// root as a flat dataset.
    pub fn discover(root: &Path) -> Result<Self, LabeldeskError> {
        if !root.is_dir() {
            return Err(LabeldeskError::NotFound {
                path: root.to_path_buf(),
            });
        }

        let images_dir = root.join(IMAGES_DIR);
        let layout = if images_dir.is_dir() {
            Self {
                root: root.to_path_buf(),
                images_dir,
                labels_dir: root.join(LABELS_DIR),
            }
        } else {
            Self {
                root: root.to_path_buf(),
                images_dir: root.to_path_buf(),
                labels_dir: root.to_path_buf(),
            }
        };

        Ok(layout)
    }

    /// Path of the class list.
    pub fn classes_path(&self) -> PathBuf {
        self.root.join(CLASSES_FILE)
    }

    /// Lists image files in the images directory, sorted and deduplicated.
    ///
    /// Extensions are matched case-insensitively; subdirectories are not
    /// searched.
    pub fn list_images(&self) -> Result<Vec<PathBuf>, LabeldeskError> {
        let mut images = BTreeSet::new();

        for entry in WalkDir::new(&self.images_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|source| LabeldeskError::DatasetLayoutInvalid {
                path: self.images_dir.clone(),
                message: format!("failed while listing directory: {source}"),
            })?;

            if entry.file_type().is_file() && has_extension(entry.path(), &IMAGE_EXTENSIONS) {
                images.insert(entry.into_path());
            }
        }

        Ok(images.into_iter().collect())
    }

    /// Resolve an image reference to an existing image path.
    ///
    /// Absolute references are used as-is. Relative references are tried
    /// under the images directory, then under the root.
    pub fn resolve_image(&self, image_ref: &Path) -> Result<PathBuf, LabeldeskError> {
        let candidates: Vec<PathBuf> = if image_ref.is_absolute() {
            vec![image_ref.to_path_buf()]
        } else {
            vec![self.images_dir.join(image_ref), self.root.join(image_ref)]
        };

        candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| LabeldeskError::NotFound {
                path: image_ref.to_path_buf(),
            })
    }

    /// Resolve an image reference and gather what annotation I/O needs.
    pub fn locate(&self, image_ref: &Path) -> Result<ImageLocation, LabeldeskError> {
        let image_path = self.resolve_image(image_ref)?;
        let dims = image_dimensions(&image_path)?;
        let label_path = label_path_for(&image_path);
        Ok(ImageLocation {
            image_path,
            label_path,
            dims,
        })
    }

    /// Lists every image with whether it has a non-empty label file.
    pub fn scan(&self) -> Result<Vec<ImageListing>, LabeldeskError> {
        Ok(self
            .list_images()?
            .into_iter()
            .map(|image_path| {
                let label_path = label_path_for(&image_path);
                let has_labels = fs::metadata(&label_path)
                    .map(|meta| meta.is_file() && meta.len() > 0)
                    .unwrap_or(false);
                ImageListing {
                    image_path,
                    label_path,
                    has_labels,
                }
            })
            .collect())
    }

    /// Lists images with a non-empty label file.
    ///
    /// With `class_id`, only images whose label file contains a box of that
    /// class are returned.
    pub fn annotated_images(&self, class_id: Option<u32>) -> Result<Vec<PathBuf>, LabeldeskError> {
        let mut out = Vec::new();
        for listing in self.scan()? {
            if !listing.has_labels {
                continue;
            }
            if let Some(wanted) = class_id {
                let labels = read_label_file(&listing.label_path)?;
                if !labels.boxes.iter().any(|bbox| bbox.class_id == wanted) {
                    continue;
                }
            }
            out.push(listing.image_path);
        }
        Ok(out)
    }

    /// Delete an image and its label file.
    ///
    /// Both deletions are attempted regardless of each other; failures are
    /// returned as warnings. Only an unresolvable image reference is an
    /// error.
    pub fn delete_image(&self, image_ref: &Path) -> Result<DeleteOutcome, LabeldeskError> {
        let image_path = self.resolve_image(image_ref)?;
        let label_path = label_path_for(&image_path);
        let mut outcome = DeleteOutcome {
            image_path: image_path.clone(),
            label_path: label_path.clone(),
            image_deleted: false,
            label_deleted: false,
            warnings: Vec::new(),
        };

        match fs::remove_file(&image_path) {
            Ok(()) => outcome.image_deleted = true,
            Err(err) => {
                warn!(path = %image_path.display(), "failed to delete image: {err}");
                outcome
                    .warnings
                    .push(format!("Failed to delete image {}: {err}", image_path.display()));
            }
        }

        match fs::remove_file(&label_path) {
            Ok(()) => outcome.label_deleted = true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %label_path.display(), "failed to delete label file: {err}");
                outcome.warnings.push(format!(
                    "Failed to delete label file {}: {err}",
                    label_path.display()
                ));
            }
        }

        info!(
            image = %image_path.display(),
            image_deleted = outcome.image_deleted,
            label_deleted = outcome.label_deleted,
            "deleted image"
        );

        Ok(outcome)
    }

    /// Build a snapshot of all images, their dimensions, and parsed labels.
    ///
    /// Images whose dimensions or label file cannot be read are skipped and
    /// listed in [`Dataset::skipped`].
    pub fn load_dataset(&self) -> Result<Dataset, LabeldeskError> {
        let classes = read_classes_txt(&self.classes_path())?;
        let mut images = Vec::new();
        let mut skipped = Vec::new();

        for image_path in self.list_images()? {
            let dims = match image_dimensions(&image_path) {
                Ok(dims) => dims,
                Err(err) => {
                    warn!(path = %image_path.display(), "skipping image: {err}");
                    skipped.push(SkippedImage {
                        image_path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let label_path = label_path_for(&image_path);
            let labels = match read_label_file(&label_path) {
                Ok(labels) => labels,
                Err(err) => {
                    warn!(path = %label_path.display(), "skipping image with unreadable labels: {err}");
                    skipped.push(SkippedImage {
                        image_path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            images.push(ImageEntry {
                file_name: rel_string(&self.images_dir, &image_path),
                has_label_file: label_path.is_file(),
                image_path,
                label_path,
                dims,
                labels,
            });
        }

        Ok(Dataset {
            root: self.root.clone(),
            classes,
            images,
            skipped,
        })
    }
}

/// An image resolved for annotation I/O.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLocation {
    pub image_path: PathBuf,
    pub label_path: PathBuf,
    pub dims: ImageDimensions,
}

/// One entry of an image listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageListing {
    pub image_path: PathBuf,
    pub label_path: PathBuf,
    /// True when the label file exists and is non-empty.
    pub has_labels: bool,
}

/// Result of a best-effort image deletion.
#[derive(Clone, Debug, Serialize)]
pub struct DeleteOutcome {
    pub image_path: PathBuf,
    pub label_path: PathBuf,
    pub image_deleted: bool,
    pub label_deleted: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Derive the label file path for an image.
///
/// Images inside a directory named `images` keep their labels in the
/// sibling `labels` directory; anywhere else the label sits next to the
/// image.
pub fn label_path_for(image_path: &Path) -> PathBuf {
    let parent = image_path.parent().unwrap_or_else(|| Path::new(""));
    let label_dir = if is_dir_named(parent, IMAGES_DIR) {
        parent
            .parent()
            .map(|grandparent| grandparent.join(LABELS_DIR))
            .unwrap_or_else(|| PathBuf::from(LABELS_DIR))
    } else {
        parent.to_path_buf()
    };

    // Append rather than `with_extension`, which would eat dotted stems.
    let mut file_name = image_path.file_stem().unwrap_or_default().to_os_string();
    file_name.push(".");
    file_name.push(LABEL_EXTENSION);
    label_dir.join(file_name)
}

/// Read an image's pixel dimensions from its header.
pub fn image_dimensions(path: &Path) -> Result<ImageDimensions, LabeldeskError> {
    let size = imagesize::size(path).map_err(|source| LabeldeskError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width = u32::try_from(size.width).unwrap_or(u32::MAX);
    let height = u32::try_from(size.height).unwrap_or(u32::MAX);

    ImageDimensions::new(width, height).check()
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

fn is_dir_named(path: &Path, dir_name: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name == dir_name)
        .unwrap_or(false)
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
