//! Save-time annotation validation.
//!
//! Pixel boxes coming from the annotation UI are checked, clamped to the
//! image, and converted to normalized form before they are written. Problems
//! with individual boxes never fail the batch: a box is either dropped or
//! kept, and every finding is returned as a warning.

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use tracing::debug;

use crate::error::LabeldeskError;
use crate::ir::{transform, BoxId, ImageDimensions, NormalizedBox, PixelBox};

/// Default minimum box side in pixels below which a warning is raised.
pub const DEFAULT_MIN_BOX_SIZE: f64 = 5.0;

/// Options for save-time validation.
#[derive(Clone, Debug)]
pub struct SaveOptions {
    /// Boxes with a side shorter than this (in pixels) are flagged but kept.
    pub min_box_size: f64,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            min_box_size: DEFAULT_MIN_BOX_SIZE,
        }
    }
}

/// The outcome of validating a batch of pixel boxes.
#[derive(Clone, Debug, Default)]
pub struct ValidatedBoxes {
    /// Accepted boxes in normalized form, ids numbered by position.
    pub boxes: Vec<NormalizedBox>,

    /// Warnings for every box that was dropped or flagged, in input order.
    pub report: ValidationReport,
}

impl ValidatedBoxes {
    /// The warnings as plain strings, e.g. `"Box 2: Too small (...)"`.
    pub fn warnings(&self) -> Vec<String> {
        self.report.messages()
    }
}

/// Validates, clamps, and normalizes a batch of pixel boxes.
///
/// For each box in input order:
///
/// 1. Non-positive width or height: dropped ("Invalid dimensions").
/// 2. Negative origin: flagged ("Negative position"), then clamped.
/// 3. Origin clamped into the image; size clamped so the box ends inside it.
/// 4. Nothing left after clamping: dropped ("Box outside image bounds").
/// 5. A side below `min_box_size`: flagged ("Too small"), still kept.
/// 6. Converted to normalized coordinates, clamped to [0, 1].
///
/// # Errors
/// Fails only with [`LabeldeskError::InvalidDimensions`].
pub fn validate_and_normalize(
    boxes: &[PixelBox],
    dims: ImageDimensions,
    opts: &SaveOptions,
) -> Result<ValidatedBoxes, LabeldeskError> {
    let dims = dims.check()?;
    let (img_w, img_h) = (dims.w(), dims.h());

    let mut out = ValidatedBoxes::default();

    for (index, bbox) in boxes.iter().enumerate() {
        let context = IssueContext::Box { index };

        // Written as negations so NaN sizes are rejected too.
        if !(bbox.width > 0.0) || !(bbox.height > 0.0) {
            out.report.add(ValidationIssue::warning(
                IssueCode::InvalidBoxSize,
                format!(
                    "Invalid dimensions (width={}, height={})",
                    bbox.width, bbox.height
                ),
                context,
            ));
            continue;
        }

        if bbox.x < 0.0 || bbox.y < 0.0 {
            out.report.add(ValidationIssue::warning(
                IssueCode::NegativePosition,
                format!("Negative position (x={}, y={})", bbox.x, bbox.y),
                context.clone(),
            ));
        }

        if !bbox.x.is_finite() || !bbox.y.is_finite() {
            out.report.add(ValidationIssue::warning(
                IssueCode::BoxOutOfBounds,
                "Box outside image bounds",
                context,
            ));
            continue;
        }

        let x = bbox.x.clamp(0.0, img_w);
        let y = bbox.y.clamp(0.0, img_h);
        let width = bbox.width.min(img_w - x).max(0.0);
        let height = bbox.height.min(img_h - y).max(0.0);

        if width <= 0.0 || height <= 0.0 {
            out.report.add(ValidationIssue::warning(
                IssueCode::BoxOutOfBounds,
                "Box outside image bounds",
                context,
            ));
            continue;
        }

        if width < opts.min_box_size || height < opts.min_box_size {
            out.report.add(ValidationIssue::warning(
                IssueCode::BoxTooSmall,
                format!(
                    "Too small (min {0}x{0} pixels required)",
                    opts.min_box_size
                ),
                context,
            ));
        }

        let clamped = PixelBox {
            x,
            y,
            width,
            height,
            ..bbox.clone()
        };
        let normalized = transform::to_normalized(&clamped, dims)?;
        out.boxes.push(normalized.with_id(BoxId::new(out.boxes.len())));
    }

    debug!(
        accepted = out.boxes.len(),
        submitted = boxes.len(),
        warnings = out.report.issues.len(),
        "validated annotation batch"
    );

    Ok(out)
}
