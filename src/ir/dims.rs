//! Image pixel dimensions.

use serde::Serialize;

use crate::error::LabeldeskError;

/// Width and height of an image in pixels.
///
/// Construction is permissive; conversions call [`ImageDimensions::check`]
/// and fail with [`LabeldeskError::InvalidDimensions`] on a zero side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    /// Creates new dimensions.
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the dimensions unchanged if both sides are positive.
    pub fn check(self) -> Result<Self, LabeldeskError> {
        if self.width == 0 || self.height == 0 {
            return Err(LabeldeskError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }

    /// Width as a float, for coordinate math.
    #[inline]
    pub fn w(&self) -> f64 {
        self.width as f64
    }

    /// Height as a float, for coordinate math.
    #[inline]
    pub fn h(&self) -> f64 {
        self.height as f64
    }
}
