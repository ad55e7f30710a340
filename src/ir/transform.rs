//! Conversion between normalized and pixel coordinate spaces.
//!
//! Both directions clamp: [`to_pixel`] keeps the box inside the image by
//! moving the origin to zero and shrinking the far edge, and
//! [`to_normalized`] clamps every output into [0, 1].

use super::bbox::{NormalizedBox, PixelBox, DEFAULT_CONFIDENCE};
use super::dims::ImageDimensions;
use super::ids::BoxId;
use crate::error::LabeldeskError;

/// Converts a normalized YOLO box to a pixel box for display.
///
/// The origin is clamped at zero without re-centering, then width and
/// height are shrunk so the box ends at the right/bottom image edge at the
/// latest. A box clipped on the left is not re-grown.
pub fn to_pixel(bbox: &NormalizedBox, dims: ImageDimensions) -> Result<PixelBox, LabeldeskError> {
    let dims = dims.check()?;
    let (img_w, img_h) = (dims.w(), dims.h());

    let width = bbox.width * img_w;
    let height = bbox.height * img_h;

    let x = (bbox.x * img_w - width / 2.0).max(0.0);
    let y = (bbox.y * img_h - height / 2.0).max(0.0);

    Ok(PixelBox {
        id: bbox.id.to_string(),
        class_id: bbox.class_id,
        x,
        y,
        width: width.min(img_w - x),
        height: height.min(img_h - y),
        confidence: bbox.confidence,
    })
}

/// Converts a pixel box to normalized YOLO coordinates.
///
/// All four outputs are clamped into [0, 1]. The returned box carries
/// `BoxId(0)`; callers converting a batch assign positional ids.
pub fn to_normalized(
    bbox: &PixelBox,
    dims: ImageDimensions,
) -> Result<NormalizedBox, LabeldeskError> {
    let dims = dims.check()?;
    let (img_w, img_h) = (dims.w(), dims.h());

    let center_x = bbox.x + bbox.width / 2.0;
    let center_y = bbox.y + bbox.height / 2.0;

    Ok(NormalizedBox {
        id: BoxId::default(),
        class_id: bbox.class_id,
        x: clamp_unit(center_x / img_w),
        y: clamp_unit(center_y / img_h),
        width: clamp_unit(bbox.width / img_w),
        height: clamp_unit(bbox.height / img_h),
        confidence: clamp_confidence(bbox.confidence),
    })
}

/// Clamps a confidence into [0, 1]; NaN becomes the default.
#[inline]
fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_CONFIDENCE
    } else {
        clamp_unit(value)
    }
}

/// Clamps a value into [0, 1].
#[inline]
pub(crate) fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
