//! YOLO label file reader and writer.
//!
//! One label file holds the boxes of one image, one box per line:
//!
//! ```text
//! <class_id> <x_center> <y_center> <width> <height> [confidence]
//! ```
//!
//! Reading is lenient: a missing file is an unannotated image, and a line
//! that cannot be parsed is skipped and reported without aborting the rest
//! of the file. Writing replaces the whole file atomically.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::warn;

use super::bbox::{NormalizedBox, DEFAULT_CONFIDENCE};
use super::ids::BoxId;
use crate::error::LabeldeskError;

/// Minimum number of tokens in a box line.
const MIN_TOKENS: usize = 5;

/// The parsed contents of one label file.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LabelFile {
    /// Boxes in file order; `id` is the index among parsed lines.
    pub boxes: Vec<NormalizedBox>,

    /// Lines that were skipped because they could not be parsed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub malformed: Vec<MalformedLine>,
}

impl LabelFile {
    /// Returns true if the file holds no boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Human-readable warnings for the skipped lines.
    pub fn warnings(&self) -> Vec<String> {
        self.malformed.iter().map(ToString::to_string).collect()
    }
}

/// A label line that was skipped during parsing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MalformedLine {
    /// One-based line number in the file.
    pub line: usize,

    /// The offending line, trimmed.
    pub content: String,

    /// Why the line was rejected.
    pub reason: String,
}

impl fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skipping invalid line {}: {} ({})",
            self.line, self.content, self.reason
        )
    }
}

/// Read a label file.
///
/// A nonexistent file yields an empty [`LabelFile`]. Content that is not
/// valid UTF-8 is decoded as Latin-1 so no line is lost.
pub fn read_label_file(path: &Path) -> Result<LabelFile, LabeldeskError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(LabelFile::default()),
        Err(err) => return Err(LabeldeskError::io(path)(err)),
    };

    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), "label file is not valid UTF-8; decoding as Latin-1");
            decode_latin1(err.as_bytes())
        }
    };

    let content = content.strip_prefix(UTF8_BOM).unwrap_or(&content);
    Ok(parse_label_str(content, path))
}

const UTF8_BOM: char = '\u{feff}';

/// Parse label file content.
///
/// `path` is only used for log messages.
pub fn parse_label_str(content: &str, path: &Path) -> LabelFile {
    let mut label_file = LabelFile::default();

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        match parse_label_line(line) {
            Ok(None) => {}
            Ok(Some(row)) => {
                let id = BoxId::new(label_file.boxes.len());
                label_file.boxes.push(row.into_box(id));
            }
            Err(reason) => {
                warn!(
                    path = %path.display(),
                    line = line_num,
                    "skipping invalid label line: {reason}"
                );
                label_file.malformed.push(MalformedLine {
                    line: line_num,
                    content: line.trim().to_string(),
                    reason,
                });
            }
        }
    }

    label_file
}

/// Write boxes to a label file, replacing any previous content.
///
/// The content is written to a temporary file next to `path` and renamed
/// over it, so a crash leaves either the old or the new file. Parent
/// directories are created as needed.
pub fn write_label_file(path: &Path, boxes: &[NormalizedBox]) -> Result<(), LabeldeskError> {
    write_atomic(path, to_label_string(boxes).as_bytes())
}

/// Render boxes in label file format.
///
/// Confidence is written as a sixth token only when below 1.0.
pub fn to_label_string(boxes: &[NormalizedBox]) -> String {
    let mut out = String::new();
    for bbox in boxes {
        out.push_str(&format!(
            "{} {} {} {} {}",
            bbox.class_id, bbox.x, bbox.y, bbox.width, bbox.height
        ));
        if bbox.confidence < DEFAULT_CONFIDENCE {
            out.push_str(&format!(" {}", bbox.confidence));
        }
        out.push('\n');
    }
    out
}

/// Replace `path` with `contents` via a temp file in the same directory.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), LabeldeskError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(LabeldeskError::io(parent))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(LabeldeskError::io(parent))?;
    temp.write_all(contents).map_err(LabeldeskError::io(path))?;

    // The temp file is owner-only; keep the target's mode instead.
    let permissions = target_permissions(path)?;
    temp.as_file()
        .set_permissions(permissions)
        .map_err(LabeldeskError::io(path))?;
    temp.as_file().sync_all().map_err(LabeldeskError::io(path))?;
    temp.persist(path)
        .map_err(|err| LabeldeskError::io(path)(err.error))?;

    Ok(())
}

/// Permissions the replaced file should end up with.
///
/// An existing target keeps its own; a new one gets what a plain create
/// would give it under the process umask.
fn target_permissions(path: &Path) -> Result<fs::Permissions, LabeldeskError> {
    match fs::metadata(path) {
        Ok(meta) => return Ok(meta.permissions()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(LabeldeskError::io(path)(err)),
    }

    // Left behind empty if the rename never happens, which reads as no boxes.
    let created = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(LabeldeskError::io(path))?;
    let meta = created.metadata().map_err(LabeldeskError::io(path))?;
    Ok(meta.permissions())
}

#[derive(Debug, PartialEq)]
struct LabelRow {
    class_id: u32,
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
    confidence: f64,
}

impl LabelRow {
    fn into_box(self, id: BoxId) -> NormalizedBox {
        NormalizedBox::new(id, self.class_id, self.cx, self.cy, self.w, self.h)
            .with_confidence(self.confidence)
    }
}

fn parse_label_line(line: &str) -> Result<Option<LabelRow>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 6 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();

    if tokens.len() < MIN_TOKENS {
        return Err(format!(
            "expected at least {MIN_TOKENS} tokens, found {}",
            tokens.len()
        ));
    }

    let class_id = tokens[0].parse::<u32>().map_err(|_| {
        format!(
            "invalid class_id '{}'; expected non-negative integer",
            tokens[0]
        )
    })?;

    let cx = parse_f64_token(tokens[1], "x_center")?;
    let cy = parse_f64_token(tokens[2], "y_center")?;
    let w = parse_f64_token(tokens[3], "width")?;
    let h = parse_f64_token(tokens[4], "height")?;

    let confidence = tokens
        .get(5)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|value| !value.is_nan())
        .map(|value| value.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE);

    Ok(Some(LabelRow {
        class_id,
        cx,
        cy,
        w,
        h,
        confidence,
    }))
}

/// Fuzz-only entrypoint for single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), String> {
    let _ = parse_label_line(input)?;
    Ok(())
}

fn parse_f64_token(raw: &str, field_name: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format!("{field_name} '{raw}' is not finite")),
        Err(_) => Err(format!(
            "invalid {field_name} '{raw}'; expected floating-point number"
        )),
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}
