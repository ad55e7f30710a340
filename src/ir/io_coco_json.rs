//! COCO JSON export.
//!
//! COCO bounding boxes use `[x, y, width, height]` where `(x, y)` is the
//! top-left corner in absolute pixels. Boxes are derived from the
//! normalized label rows without clamping, so a box that hangs off the
//! image keeps its true extent.
//!
//! # Deterministic Output
//!
//! Images are numbered from 1 in dataset listing order and annotations from
//! 1 in file order, so repeated exports of an unchanged dataset are
//! byte-identical.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use super::model::Dataset;
use crate::error::LabeldeskError;

/// Default file name for COCO export, written at the dataset root.
pub const COCO_OUTPUT_FILE: &str = "output.json";

const EXPORT_DESCRIPTION: &str = "Exported from labeldesk";

// ============================================================================
// COCO Schema Types (internal to this module)
// ============================================================================

/// Top-level COCO dataset structure.
#[derive(Debug, Serialize)]
struct CocoDataset {
    images: Vec<CocoImage>,
    annotations: Vec<CocoAnnotation>,
    categories: Vec<CocoCategory>,
    info: CocoInfo,
}

#[derive(Debug, Serialize)]
struct CocoInfo {
    description: String,
}

#[derive(Debug, Serialize)]
struct CocoImage {
    id: u64,
    file_name: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize)]
struct CocoCategory {
    id: u32,
    name: String,
    supercategory: String,
}

#[derive(Debug, Serialize)]
struct CocoAnnotation {
    id: u64,
    image_id: u64,
    category_id: u32,
    bbox: [f64; 4],
    area: f64,
    iscrowd: u8,
}

// ============================================================================
// Public API
// ============================================================================

/// Writes a dataset to a COCO JSON file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_coco_json(path: &Path, dataset: &Dataset) -> Result<(), LabeldeskError> {
    let file = File::create(path).map_err(LabeldeskError::io(path))?;
    let writer = BufWriter::new(file);

    let coco = dataset_to_coco(dataset);

    serde_json::to_writer_pretty(writer, &coco).map_err(|source| LabeldeskError::CocoJsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a dataset to a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn to_coco_string(dataset: &Dataset) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&dataset_to_coco(dataset))
}

// ============================================================================
// Conversion: Dataset -> COCO
// ============================================================================

fn dataset_to_coco(dataset: &Dataset) -> CocoDataset {
    let categories = dataset
        .classes
        .iter()
        .map(|class| CocoCategory {
            id: class.id,
            name: class.name.clone(),
            supercategory: "none".to_string(),
        })
        .collect();

    let mut images = Vec::with_capacity(dataset.images.len());
    let mut annotations = Vec::with_capacity(dataset.box_count());
    let mut next_annotation_id: u64 = 1;

    for (index, image) in dataset.images.iter().enumerate() {
        let image_id = (index + 1) as u64;
        images.push(CocoImage {
            id: image_id,
            file_name: image.file_name.clone(),
            width: image.dims.width,
            height: image.dims.height,
        });

        let (img_w, img_h) = (image.dims.w(), image.dims.h());
        for bbox in &image.labels.boxes {
            let abs_w = bbox.width * img_w;
            let abs_h = bbox.height * img_h;
            let abs_x = bbox.x * img_w - abs_w / 2.0;
            let abs_y = bbox.y * img_h - abs_h / 2.0;

            annotations.push(CocoAnnotation {
                id: next_annotation_id,
                image_id,
                category_id: bbox.class_id,
                bbox: [abs_x, abs_y, abs_w, abs_h],
                area: abs_w * abs_h,
                iscrowd: 0,
            });
            next_annotation_id += 1;
        }
    }

    CocoDataset {
        images,
        annotations,
        categories,
        info: CocoInfo {
            description: EXPORT_DESCRIPTION.to_string(),
        },
    }
}
