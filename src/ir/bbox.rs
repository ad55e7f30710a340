//! Bounding box types for the two coordinate spaces.
//!
//! [`NormalizedBox`] is the on-disk YOLO form (center + size as fractions of
//! the image). [`PixelBox`] is the form the annotation UI edits (top-left
//! corner + size in pixels).
//!
//! Neither type enforces its range invariants on construction. Readers and
//! the save-time validator report problems instead of refusing to represent
//! them.

use serde::{Deserialize, Serialize};

use super::ids::BoxId;

/// Default confidence for boxes drawn by hand.
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

/// A bounding box in normalized YOLO coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NormalizedBox {
    /// Position among the successfully parsed boxes of the label file.
    pub id: BoxId,

    /// Zero-based class index.
    pub class_id: u32,

    /// Center x as a fraction of image width.
    pub x: f64,

    /// Center y as a fraction of image height.
    pub y: f64,

    /// Width as a fraction of image width.
    pub width: f64,

    /// Height as a fraction of image height.
    pub height: f64,

    /// Detection confidence in [0, 1]; 1.0 for manual annotations.
    pub confidence: f64,
}

impl NormalizedBox {
    /// Creates a box with the default confidence.
    pub fn new(id: impl Into<BoxId>, class_id: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            class_id,
            x,
            y,
            width,
            height,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Sets the confidence for this box.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Sets the positional id for this box.
    pub fn with_id(mut self, id: impl Into<BoxId>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns true if the box is finite and has positive area.
    ///
    /// Zero-area rows are parse artifacts, not annotations.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Returns true if any edge lies outside the unit square.
    pub fn extends_past_image(&self) -> bool {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        self.x - half_w < 0.0
            || self.y - half_h < 0.0
            || self.x + half_w > 1.0
            || self.y + half_h > 1.0
    }
}

/// A bounding box in pixel coordinates, as edited by the annotation UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    /// Caller-visible identifier; `box_<n>` for boxes loaded from disk.
    #[serde(default)]
    pub id: String,

    /// Zero-based class index.
    pub class_id: u32,

    /// Left edge in pixels.
    pub x: f64,

    /// Top edge in pixels.
    pub y: f64,

    /// Width in pixels.
    pub width: f64,

    /// Height in pixels.
    pub height: f64,

    /// Detection confidence in [0, 1].
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl PixelBox {
    /// Creates a pixel box with the default confidence.
    pub fn new(id: impl Into<String>, class_id: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            class_id,
            x,
            y,
            width,
            height,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Returns the area of the box in square pixels.
    ///
    /// May be negative if the box is malformed.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Intersection-over-union with another box.
    ///
    /// Returns 0.0 when the boxes do not overlap or the union is empty.
    pub fn iou(&self, other: &PixelBox) -> f64 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);

        if right <= left || bottom <= top {
            return 0.0;
        }

        let intersection = (right - left) * (bottom - top);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }
}
