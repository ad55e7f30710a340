//! Validation report types for structured issue reporting.
//!
//! Save-time validation and the dataset quality report both collect
//! [`ValidationIssue`]s into a [`ValidationReport`], which can be rendered
//! for a terminal, serialized as JSON, or flattened into plain messages.

use serde::Serialize;
use std::fmt;

/// An ordered collection of issues.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// All issues, in the order they were found.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Adds an issue to the report.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Appends all issues from another report.
    pub fn extend(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    /// Returns the number of errors in the report.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Returns the number of warnings in the report.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns the number of issues with the given code.
    pub fn count_code(&self, code: IssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }

    /// Flattens the issues into `"<context>: <message>"` strings.
    pub fn messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .map(|issue| format!("{}: {}", issue.context, issue.message))
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "No issues found");
        }

        writeln!(
            f,
            "Found {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single issue (error or warning).
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    /// The severity of the issue.
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    /// A human-readable description of the issue.
    pub message: String,

    /// Context about where the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    /// Creates a new issue.
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    /// Creates a new error.
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    /// Creates a new warning.
    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// The severity of an issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth a look, but the annotation is still usable.
    Warning,
    /// The annotation or image is unusable as-is.
    Error,
}

/// A stable code identifying the type of issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    // Box geometry
    /// A box has zero, negative, or non-finite width or height.
    InvalidBoxSize,
    /// A box starts left of or above the image.
    NegativePosition,
    /// A box lies entirely outside the image.
    BoxOutOfBounds,
    /// A box extends past an image edge.
    BoxExceedsImage,
    /// A box is smaller than the minimum size.
    BoxTooSmall,
    /// Two boxes of the same class overlap heavily.
    HighOverlap,

    // Labels
    /// A box uses a class id missing from the class list.
    UnknownClass,
    /// A label line could not be parsed.
    MalformedLine,

    // Images
    /// An image's dimensions could not be read.
    ImageUnreadable,
}

/// Context about where an issue occurred.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueContext {
    /// Issue with the dataset as a whole.
    Dataset,
    /// Issue with a specific image.
    Image { file: String },
    /// Issue with a box in a save batch, by input position.
    Box { index: usize },
    /// Issue with a box of a specific image, by position in its label file.
    ImageBox { file: String, index: usize },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Dataset => write!(f, "dataset"),
            IssueContext::Image { file } => write!(f, "image {}", file),
            IssueContext::Box { index } => write!(f, "Box {}", index),
            IssueContext::ImageBox { file, index } => write!(f, "image {} box {}", file, index),
        }
    }
}
