//! Load and save the annotations of a single image.
//!
//! These are the two requests the editor makes: load returns pixel boxes
//! ready to draw, save takes pixel boxes back, validates them, and
//! replaces the label file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::DatasetLayout;
use crate::error::LabeldeskError;
use crate::ir::io_yolo::{read_label_file, write_label_file};
use crate::ir::{transform, PixelBox};
use crate::validation::{validate_and_normalize, SaveOptions};

/// Pixel boxes of one image, as loaded for editing.
#[derive(Clone, Debug, Serialize)]
pub struct LoadedAnnotations {
    pub image_path: PathBuf,
    pub label_file: PathBuf,
    pub width: u32,
    pub height: u32,
    pub boxes: Vec<PixelBox>,
    /// Skipped label lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Result of a successful save.
#[derive(Clone, Debug, Serialize)]
pub struct SaveOutcome {
    /// Always `"saved"`.
    pub status: &'static str,
    pub file: PathBuf,
    /// Number of boxes written.
    pub saved: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

const STATUS_SAVED: &str = "saved";

/// Load an image's annotations as pixel boxes.
///
/// A missing label file yields no boxes.
pub fn load_annotations(root: &Path, image_ref: &Path) -> Result<LoadedAnnotations, LabeldeskError> {
    let layout = DatasetLayout::discover(root)?;
    let location = layout.locate(image_ref)?;

    let labels = read_label_file(&location.label_path)?;
    let boxes = labels
        .boxes
        .iter()
        .map(|bbox| transform::to_pixel(bbox, location.dims))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        image = %location.image_path.display(),
        boxes = boxes.len(),
        skipped_lines = labels.malformed.len(),
        "loaded annotations"
    );

    Ok(LoadedAnnotations {
        image_path: location.image_path,
        label_file: location.label_path,
        width: location.dims.width,
        height: location.dims.height,
        boxes,
        warnings: labels.warnings(),
    })
}

/// Validate pixel boxes and replace the image's label file with them.
///
/// Boxes that fail validation are dropped with a warning; the rest are
/// written even when some were dropped. An empty batch leaves an empty
/// label file.
pub fn save_annotations(
    root: &Path,
    image_ref: &Path,
    boxes: &[PixelBox],
    opts: &SaveOptions,
) -> Result<SaveOutcome, LabeldeskError> {
    let layout = DatasetLayout::discover(root)?;
    let location = layout.locate(image_ref)?;

    let validated = validate_and_normalize(boxes, location.dims, opts)?;
    write_label_file(&location.label_path, &validated.boxes)?;

    info!(
        label_file = %location.label_path.display(),
        saved = validated.boxes.len(),
        dropped = boxes.len() - validated.boxes.len(),
        "saved annotations"
    );

    Ok(SaveOutcome {
        status: STATUS_SAVED,
        file: location.label_path,
        saved: validated.boxes.len(),
        warnings: validated.warnings(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_bmp;
    use std::fs;

    #[test]
    fn save_then_load_in_structured_layout() {
        let temp = tempfile::tempdir().expect("create temp dir");
        write_bmp(&temp.path().join("images/a.bmp"), 200, 100);

        let outcome = save_annotations(
            temp.path(),
            Path::new("a.bmp"),
            &[PixelBox::new("new", 1, 50.0, 25.0, 100.0, 50.0)],
            &SaveOptions::default(),
        )
        .expect("save");

        assert_eq!(outcome.status, "saved");
        assert_eq!(outcome.saved, 1);
        assert_eq!(outcome.file, temp.path().join("labels/a.txt"));
        assert!(outcome.warnings.is_empty());
        assert_eq!(
            fs::read_to_string(&outcome.file).expect("read label"),
            "1 0.5 0.5 0.5 0.5\n"
        );

        let loaded = load_annotations(temp.path(), Path::new("a.bmp")).expect("load");
        assert_eq!((loaded.width, loaded.height), (200, 100));
        assert_eq!(
            loaded.boxes,
            vec![PixelBox::new("box_0", 1, 50.0, 25.0, 100.0, 50.0)]
        );
    }

    #[test]
    fn load_without_label_file_is_empty() {
        let temp = tempfile::tempdir().expect("create temp dir");
        write_bmp(&temp.path().join("a.bmp"), 10, 10);

        let loaded = load_annotations(temp.path(), Path::new("a.bmp")).expect("load");
        assert!(loaded.boxes.is_empty());
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.label_file, temp.path().join("a.txt"));
    }

    #[test]
    fn load_unknown_image_is_not_found() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = load_annotations(temp.path(), Path::new("missing.jpg")).unwrap_err();
        assert!(matches!(err, LabeldeskError::NotFound { .. }));
    }
}
