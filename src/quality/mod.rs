//! Dataset-wide annotation quality checks.
//!
//! The report reads boxes only through the label file reader and converts
//! them to pixels with the same transform the editor uses, so what it flags
//! is what an annotator would see.

mod report;

pub use report::{ClassCount, QualityReport, QualitySummary};

use std::collections::BTreeMap;

use crate::error::LabeldeskError;
use crate::ir::{transform, Dataset, ImageEntry, PixelBox};
use crate::validation::{
    IssueCode, IssueContext, ValidationIssue, ValidationReport, DEFAULT_MIN_BOX_SIZE,
};

/// Default IoU above which two same-class boxes are flagged.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

/// Options for the quality report.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    /// Minimum box side in pixels.
    pub min_box_size: f64,
    /// IoU threshold for same-class overlap warnings.
    pub overlap_threshold: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            min_box_size: DEFAULT_MIN_BOX_SIZE,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

/// Check every image of a dataset snapshot.
///
/// Zero-size boxes and unreadable images are errors; everything else is a
/// warning.
pub fn quality_report(
    dataset: &Dataset,
    opts: &ReportOptions,
) -> Result<QualityReport, LabeldeskError> {
    let mut issues = ValidationReport::new();

    for image in &dataset.images {
        issues.extend(check_image(image, dataset, opts)?);
    }

    for skipped in &dataset.skipped {
        issues.add(ValidationIssue::error(
            IssueCode::ImageUnreadable,
            skipped.reason.clone(),
            IssueContext::Image {
                file: skipped.image_path.display().to_string(),
            },
        ));
    }

    Ok(QualityReport {
        summary: summarize(dataset),
        classes: count_classes(dataset),
        issues,
    })
}

fn check_image(
    image: &ImageEntry,
    dataset: &Dataset,
    opts: &ReportOptions,
) -> Result<ValidationReport, LabeldeskError> {
    let mut report = ValidationReport::new();
    let file = image.file_name.clone();

    for line in &image.labels.malformed {
        report.add(ValidationIssue::warning(
            IssueCode::MalformedLine,
            line.to_string(),
            IssueContext::Image { file: file.clone() },
        ));
    }

    let mut pixel_boxes: Vec<(usize, PixelBox)> = Vec::with_capacity(image.labels.boxes.len());

    for bbox in &image.labels.boxes {
        let index = bbox.id.index();
        let context = IssueContext::ImageBox {
            file: file.clone(),
            index,
        };

        if !bbox.is_valid() {
            report.add(ValidationIssue::error(
                IssueCode::InvalidBoxSize,
                format!(
                    "Zero or negative size (width={}, height={})",
                    bbox.width, bbox.height
                ),
                context,
            ));
            continue;
        }

        if !dataset.classes.is_empty() && dataset.class_name(bbox.class_id).is_none() {
            report.add(ValidationIssue::warning(
                IssueCode::UnknownClass,
                format!("Class {} is not in the class list", bbox.class_id),
                context.clone(),
            ));
        }

        if bbox.extends_past_image() {
            report.add(ValidationIssue::warning(
                IssueCode::BoxExceedsImage,
                "Box extends past the image edge",
                context.clone(),
            ));
        }

        let pixel = transform::to_pixel(bbox, image.dims)?;
        if pixel.width < opts.min_box_size || pixel.height < opts.min_box_size {
            report.add(ValidationIssue::warning(
                IssueCode::BoxTooSmall,
                format!(
                    "Too small ({:.1}x{:.1} pixels, min {}x{})",
                    pixel.width, pixel.height, opts.min_box_size, opts.min_box_size
                ),
                context,
            ));
        }

        pixel_boxes.push((index, pixel));
    }

    for (pos, (index_a, a)) in pixel_boxes.iter().enumerate() {
        for (index_b, b) in &pixel_boxes[pos + 1..] {
            if a.class_id != b.class_id {
                continue;
            }
            let iou = a.iou(b);
            if iou > opts.overlap_threshold {
                report.add(ValidationIssue::warning(
                    IssueCode::HighOverlap,
                    format!("High overlap with box {} (IoU {:.2})", index_a, iou),
                    IssueContext::ImageBox {
                        file: file.clone(),
                        index: *index_b,
                    },
                ));
            }
        }
    }

    Ok(report)
}

fn summarize(dataset: &Dataset) -> QualitySummary {
    QualitySummary {
        images: dataset.images.len(),
        annotated_images: dataset
            .images
            .iter()
            .filter(|image| !image.labels.is_empty())
            .count(),
        boxes: dataset.box_count(),
        classes: dataset.classes.len(),
        skipped_images: dataset.skipped.len(),
    }
}

fn count_classes(dataset: &Dataset) -> Vec<ClassCount> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for bbox in dataset.images.iter().flat_map(|image| &image.labels.boxes) {
        *counts.entry(bbox.class_id).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(class_id, count)| ClassCount {
            class_id,
            name: dataset.class_name(class_id).map(str::to_string),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{
        ClassEntry, ImageDimensions, LabelFile, MalformedLine, NormalizedBox, SkippedImage,
    };
    use std::path::PathBuf;

    fn image(name: &str, boxes: Vec<NormalizedBox>) -> ImageEntry {
        ImageEntry {
            file_name: name.to_string(),
            image_path: PathBuf::from(name),
            label_path: PathBuf::from(name).with_extension("txt"),
            dims: ImageDimensions::new(100, 100),
            has_label_file: true,
            labels: LabelFile {
                boxes,
                malformed: vec![],
            },
        }
    }

    fn dataset(images: Vec<ImageEntry>) -> Dataset {
        Dataset {
            classes: vec![ClassEntry::new(0, "cat"), ClassEntry::new(1, "dog")],
            images,
            ..Default::default()
        }
    }

    fn run(dataset: &Dataset) -> QualityReport {
        quality_report(dataset, &ReportOptions::default()).expect("report")
    }

    #[test]
    fn clean_dataset_has_no_issues() {
        let report = run(&dataset(vec![
            image("a.jpg", vec![NormalizedBox::new(0, 0, 0.5, 0.5, 0.5, 0.5)]),
            image("b.jpg", vec![]),
        ]));

        assert!(report.issues.is_clean());
        assert_eq!(
            report.summary,
            QualitySummary {
                images: 2,
                annotated_images: 1,
                boxes: 1,
                classes: 2,
                skipped_images: 0,
            }
        );
        assert_eq!(
            report.classes,
            vec![ClassCount {
                class_id: 0,
                name: Some("cat".to_string()),
                count: 1,
            }]
        );
    }

    #[test]
    fn zero_size_box_is_an_error() {
        let report = run(&dataset(vec![image(
            "a.jpg",
            vec![NormalizedBox::new(0, 0, 0.5, 0.5, 0.0, 0.5)],
        )]));

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.issues.count_code(IssueCode::InvalidBoxSize), 1);
    }

    #[test]
    fn small_box_is_a_warning() {
        let report = run(&dataset(vec![image(
            "a.jpg",
            vec![NormalizedBox::new(0, 0, 0.5, 0.5, 0.03, 0.5)],
        )]));

        assert_eq!(report.error_count(), 0);
        assert_eq!(report.issues.count_code(IssueCode::BoxTooSmall), 1);
    }

    #[test]
    fn overlapping_boxes_of_same_class_are_flagged() {
        let report = run(&dataset(vec![image(
            "a.jpg",
            vec![
                NormalizedBox::new(0, 0, 0.5, 0.5, 0.4, 0.4),
                NormalizedBox::new(1, 0, 0.52, 0.5, 0.4, 0.4),
                NormalizedBox::new(2, 1, 0.5, 0.5, 0.4, 0.4),
            ],
        )]));

        assert_eq!(report.issues.count_code(IssueCode::HighOverlap), 1);
        let issue = &report.issues.issues[0];
        assert!(issue.message.starts_with("High overlap with box 0"));
        assert!(matches!(
            issue.context,
            IssueContext::ImageBox { index: 1, .. }
        ));
    }

    #[test]
    fn unknown_class_only_flagged_with_non_empty_class_list() {
        let boxes = vec![NormalizedBox::new(0, 7, 0.5, 0.5, 0.5, 0.5)];

        let with_classes = run(&dataset(vec![image("a.jpg", boxes.clone())]));
        assert_eq!(with_classes.issues.count_code(IssueCode::UnknownClass), 1);
        assert_eq!(with_classes.classes[0].name, None);

        let without_classes = run(&Dataset {
            images: vec![image("a.jpg", boxes)],
            ..Default::default()
        });
        assert!(without_classes.issues.is_clean());
    }

    #[test]
    fn box_past_edge_is_flagged() {
        let report = run(&dataset(vec![image(
            "a.jpg",
            vec![NormalizedBox::new(0, 0, 0.9, 0.5, 0.4, 0.4)],
        )]));
        assert_eq!(report.issues.count_code(IssueCode::BoxExceedsImage), 1);
    }

    #[test]
    fn malformed_lines_and_skipped_images_are_reported() {
        let mut entry = image("a.jpg", vec![]);
        entry.labels.malformed.push(MalformedLine {
            line: 2,
            content: "garbage".to_string(),
            reason: "expected at least 5 tokens, found 1".to_string(),
        });

        let mut ds = dataset(vec![entry]);
        ds.skipped.push(SkippedImage {
            image_path: PathBuf::from("broken.jpg"),
            reason: "bad header".to_string(),
        });

        let report = run(&ds);
        assert_eq!(report.issues.count_code(IssueCode::MalformedLine), 1);
        assert_eq!(report.issues.count_code(IssueCode::ImageUnreadable), 1);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.summary.skipped_images, 1);
    }
}
