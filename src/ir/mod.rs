//! Annotation data types, coordinate conversion, and file formats.
//!
//! Boxes exist in two coordinate spaces:
//!
//! - [`NormalizedBox`]: center and size as fractions of the image, the form
//!   stored in YOLO label files.
//! - [`PixelBox`]: top-left corner and size in pixels, the form the
//!   annotation UI edits.
//!
//! [`transform`] converts between them for a given [`ImageDimensions`].
//!
//! # Example
//!
//! ```
//! use labeldesk::ir::{transform, ImageDimensions, NormalizedBox};
//!
//! let bbox = NormalizedBox::new(0, 1, 0.5, 0.5, 0.25, 0.5);
//! let pixel = transform::to_pixel(&bbox, ImageDimensions::new(640, 480)).unwrap();
//! assert_eq!(pixel.id, "box_0");
//! assert_eq!(pixel.x, 240.0);
//! assert_eq!(pixel.y, 120.0);
//! ```

mod bbox;
pub mod classes;
mod dims;
mod ids;
pub mod io_coco_json;
pub mod io_voc_xml;
pub mod io_yolo;
mod model;
pub mod transform;

// Re-export core types for convenient access
pub use bbox::{NormalizedBox, PixelBox, DEFAULT_CONFIDENCE};
pub use classes::ClassEntry;
pub use dims::ImageDimensions;
pub use ids::BoxId;
pub use io_yolo::{LabelFile, MalformedLine};
pub use model::{Dataset, ImageEntry, SkippedImage};
