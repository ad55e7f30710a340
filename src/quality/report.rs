//! Quality report types and terminal formatting.

use serde::Serialize;
use std::fmt;

use crate::validation::ValidationReport;

/// The result of checking a dataset's annotations.
#[derive(Clone, Debug, Serialize)]
pub struct QualityReport {
    /// Dataset-wide counts.
    pub summary: QualitySummary,
    /// Per-class box counts, ordered by class id.
    pub classes: Vec<ClassCount>,
    /// Findings, in image listing order.
    pub issues: ValidationReport,
}

impl QualityReport {
    pub fn error_count(&self) -> usize {
        self.issues.error_count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.warning_count()
    }
}

/// Summary counts for the dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QualitySummary {
    /// Images whose dimensions could be read.
    pub images: usize,
    /// Images with at least one parsed box.
    pub annotated_images: usize,
    /// Total number of parsed boxes.
    pub boxes: usize,
    /// Entries in `classes.txt`.
    pub classes: usize,
    /// Images left out because their header could not be read.
    pub skipped_images: usize,
}

/// Number of boxes using one class id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassCount {
    pub class_id: u32,
    /// Name from the class list, if the id is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub count: usize,
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(f, "Dataset summary")?;
        writeln!(f, "  Images:           {}", s.images)?;
        writeln!(f, "  Annotated images: {}", s.annotated_images)?;
        writeln!(f, "  Boxes:            {}", s.boxes)?;
        writeln!(f, "  Classes:          {}", s.classes)?;
        if s.skipped_images > 0 {
            writeln!(f, "  Skipped images:   {}", s.skipped_images)?;
        }

        if !self.classes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Boxes per class")?;
            for class in &self.classes {
                let label = match &class.name {
                    Some(name) => format!("{} ({})", class.class_id, name),
                    None => format!("{} (unknown)", class.class_id),
                };
                writeln!(f, "  {:<24} {}", label, class.count)?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.issues)
    }
}
