//! Class list management: `classes.txt`, YAML import, and display colors.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::io_yolo::write_atomic;
use crate::error::LabeldeskError;

/// File name of the class list at the dataset root.
pub const CLASSES_FILE: &str = "classes.txt";

/// Display colors assigned to classes by index.
pub const PALETTE: [&str; 8] = [
    "#00e0ff", "#56b0ff", "#ff6b6b", "#4ecdc4", "#ffe66d", "#a8e6cf", "#ff8b94", "#c7ceea",
];

/// Returns the display color for a class index.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// A class (label) definition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassEntry {
    /// Zero-based class index as used in label files.
    pub id: u32,

    /// Class name.
    pub name: String,

    /// Display color.
    pub color: String,
}

impl ClassEntry {
    /// Creates a class with its palette color.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: palette_color(id as usize).to_string(),
        }
    }
}

/// Read `classes.txt`.
///
/// A missing file is an empty class list. Each non-blank line is a class
/// whose id is its zero-based line number, so blank lines leave gaps.
pub fn read_classes_txt(path: &Path) -> Result<Vec<ClassEntry>, LabeldeskError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(LabeldeskError::io(path)(err)),
    };

    Ok(data
        .lines()
        .enumerate()
        .filter_map(|(line_idx, line)| {
            let name = line.trim();
            (!name.is_empty()).then(|| ClassEntry::new(line_idx as u32, name))
        })
        .collect())
}

/// Write the class list to `<root>/classes.txt`, one trimmed name per line.
///
/// Returns the path written.
pub fn write_classes_txt<S: AsRef<str>>(
    root: &Path,
    names: &[S],
) -> Result<std::path::PathBuf, LabeldeskError> {
    if !root.is_dir() {
        return Err(LabeldeskError::NotFound {
            path: root.to_path_buf(),
        });
    }

    let mut contents = String::new();
    for name in names {
        contents.push_str(name.as_ref().trim());
        contents.push('\n');
    }

    let path = root.join(CLASSES_FILE);
    write_atomic(&path, contents.as_bytes())?;
    Ok(path)
}

#[derive(Debug, Deserialize)]
struct ClassesYaml {
    names: Option<YamlNames>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YamlNames {
    Sequence(Vec<serde_yaml::Value>),
    Mapping(serde_yaml::Mapping),
}

/// Import class names from a YOLO `data.yaml` document.
///
/// `names` may be a sequence (ids follow sequence position, empty entries
/// are skipped) or a mapping from integer ids to names (non-integer keys are
/// skipped). `source` only labels errors.
pub fn import_yaml_classes(
    content: &str,
    source: &Path,
) -> Result<Vec<ClassEntry>, LabeldeskError> {
    let parsed: ClassesYaml =
        serde_yaml::from_str(content).map_err(|err| LabeldeskError::ClassesYamlParse {
            path: source.to_path_buf(),
            source: err,
        })?;

    let names = parsed
        .names
        .ok_or_else(|| LabeldeskError::ClassesYamlInvalid {
            path: source.to_path_buf(),
            message: "YAML file does not contain 'names' key".to_string(),
        })?;

    let classes: Vec<ClassEntry> = match names {
        YamlNames::Sequence(values) => values
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| {
                scalar_to_name(value).map(|name| ClassEntry::new(idx as u32, name))
            })
            .collect(),
        YamlNames::Mapping(mapping) => mapping
            .iter()
            .filter_map(|(key, value)| {
                let id = key_to_id(key)?;
                let name = scalar_to_name(value).unwrap_or_default();
                Some(ClassEntry::new(id, name))
            })
            .collect(),
    };

    if classes.is_empty() {
        return Err(LabeldeskError::ClassesYamlInvalid {
            path: source.to_path_buf(),
            message: "No classes found in YAML file".to_string(),
        });
    }

    Ok(classes)
}

/// Read and import a YAML class file from disk.
pub fn read_yaml_classes(path: &Path) -> Result<Vec<ClassEntry>, LabeldeskError> {
    let data = fs::read_to_string(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            LabeldeskError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LabeldeskError::io(path)(err)
        }
    })?;
    import_yaml_classes(&data, path)
}

fn scalar_to_name(value: &serde_yaml::Value) -> Option<String> {
    let name = match value {
        serde_yaml::Value::String(s) => s.trim().to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!name.is_empty()).then_some(name)
}

fn key_to_id(key: &serde_yaml::Value) -> Option<u32> {
    match key {
        serde_yaml::Value::Number(n) => n.as_u64().and_then(|id| u32::try_from(id).ok()),
        serde_yaml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
