//! Pascal VOC XML export.
//!
//! Writes one XML file per image that has a label file. Corner coordinates
//! are derived from the normalized rows, truncated to whole pixels and
//! clamped to the image.

use std::fs;
use std::path::Path;

use super::bbox::NormalizedBox;
use super::model::{Dataset, ImageEntry};
use crate::error::LabeldeskError;

/// Default directory name for VOC export, created at the dataset root.
pub const VOC_OUTPUT_DIR: &str = "voc_xmls";

const VOC_XML_EXTENSION: &str = "xml";

/// Channel count written to `<size>`; headers are read for size only.
const VOC_DEPTH: u32 = 3;

/// Write a dataset as VOC XML files into `output_dir`.
///
/// Images without a label file are skipped. Returns the number of XML files
/// written.
pub fn write_voc_dir(output_dir: &Path, dataset: &Dataset) -> Result<usize, LabeldeskError> {
    fs::create_dir_all(output_dir).map_err(LabeldeskError::io(output_dir))?;

    let mut count = 0;
    for image in dataset.images.iter().filter(|image| image.has_label_file) {
        let xml_name = Path::new(&image.file_name).with_extension(VOC_XML_EXTENSION);
        let xml_path = output_dir.join(xml_name);

        fs::write(&xml_path, to_voc_xml_string(image, dataset))
            .map_err(LabeldeskError::io(&xml_path))?;
        count += 1;
    }

    Ok(count)
}

/// Render the VOC XML document for one image.
pub fn to_voc_xml_string(image: &ImageEntry, dataset: &Dataset) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<annotation>\n");
    xml.push_str("  <folder>images</folder>\n");
    xml.push_str(&format!(
        "  <filename>{}</filename>\n",
        xml_escape(&image.file_name)
    ));
    xml.push_str("  <size>\n");
    xml.push_str(&format!("    <width>{}</width>\n", image.dims.width));
    xml.push_str(&format!("    <height>{}</height>\n", image.dims.height));
    xml.push_str(&format!("    <depth>{VOC_DEPTH}</depth>\n"));
    xml.push_str("  </size>\n");

    for bbox in &image.labels.boxes {
        let name = dataset
            .class_name(bbox.class_id)
            .map(str::to_string)
            .unwrap_or_else(|| bbox.class_id.to_string());
        let (xmin, ymin, xmax, ymax) = voc_corners(bbox, image);

        xml.push_str("  <object>\n");
        xml.push_str(&format!("    <name>{}</name>\n", xml_escape(&name)));
        xml.push_str("    <pose>Unspecified</pose>\n");
        xml.push_str("    <truncated>0</truncated>\n");
        xml.push_str("    <difficult>0</difficult>\n");
        xml.push_str("    <bndbox>\n");
        xml.push_str(&format!("      <xmin>{xmin}</xmin>\n"));
        xml.push_str(&format!("      <ymin>{ymin}</ymin>\n"));
        xml.push_str(&format!("      <xmax>{xmax}</xmax>\n"));
        xml.push_str(&format!("      <ymax>{ymax}</ymax>\n"));
        xml.push_str("    </bndbox>\n");
        xml.push_str("  </object>\n");
    }

    xml.push_str("</annotation>\n");
    xml
}

fn voc_corners(bbox: &NormalizedBox, image: &ImageEntry) -> (i64, i64, i64, i64) {
    let (img_w, img_h) = (image.dims.w(), image.dims.h());
    let half_w = bbox.width / 2.0;
    let half_h = bbox.height / 2.0;

    // `as` truncates toward zero.
    let xmin = ((bbox.x - half_w) * img_w) as i64;
    let ymin = ((bbox.y - half_h) * img_h) as i64;
    let xmax = ((bbox.x + half_w) * img_w) as i64;
    let ymax = ((bbox.y + half_h) * img_h) as i64;

    (
        xmin.max(0),
        ymin.max(0),
        xmax.min(image.dims.width as i64),
        ymax.min(image.dims.height as i64),
    )
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
