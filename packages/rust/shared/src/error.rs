//! Error types for the curriculum toolkit.
//!
//! Content problems are modelled as [`Violation`]s: each one names the file
//! (or directory) at fault and the invariant it breaks. Library crates
//! return [`CurriculumError`] via `thiserror`; the CLI wraps it with
//! `color-eyre` for rich diagnostics.

use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// A single broken content invariant, tied to a file or directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// A front-matter block was opened but not closed, or is not valid YAML.
    #[error("{}: malformed front-matter: {message}", .path.display())]
    MalformedFrontMatter { path: PathBuf, message: String },

    /// The file is not valid UTF-8 text.
    #[error("{}: lesson is not valid UTF-8: {message}", .path.display())]
    InvalidEncoding { path: PathBuf, message: String },

    /// Nothing but whitespace follows the front-matter block.
    #[error("{}: lesson body is empty", location(.path, .order))]
    EmptyBody { path: PathBuf, order: Option<i64> },

    /// No title in front-matter and no usable heading.
    #[error("{}: lesson has no title", location(.path, .order))]
    MissingTitle { path: PathBuf, order: Option<i64> },

    /// The lesson does not declare an `order`.
    #[error("{}: lesson has no order", .path.display())]
    MissingOrder { path: PathBuf },

    /// The declared `order` is zero or negative.
    #[error("{}: order must be a positive integer, got {value}", .path.display())]
    InvalidOrder { path: PathBuf, value: i64 },

    /// Two lessons in the same module declare the same `order`.
    #[error(
        "order {order} is declared by both {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateOrder {
        order: i64,
        first: PathBuf,
        second: PathBuf,
    },

    /// `estimatedMinutes` is present but not positive.
    #[error(
        "{}: estimatedMinutes must be a positive integer, got {value}",
        location(.path, .order)
    )]
    InvalidDuration {
        path: PathBuf,
        order: Option<i64>,
        value: i64,
    },

    /// Unrecognized front-matter key (strict mode only).
    #[error("{}: unknown front-matter key `{field}`", location(.path, .order))]
    UnknownField {
        path: PathBuf,
        order: Option<i64>,
        field: String,
    },

    /// A module directory without any lesson files.
    #[error("{}: module `{module}` of course `{course}` has no lessons", .path.display())]
    EmptyModule {
        course: String,
        module: String,
        path: PathBuf,
    },

    /// A course directory without any modules.
    #[error("{}: course `{course}` has no modules", .path.display())]
    EmptyCourse { course: String, path: PathBuf },
}

impl Violation {
    /// Stable name of the violated invariant, e.g. `DuplicateOrder`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedFrontMatter { .. } => "MalformedFrontMatter",
            Self::InvalidEncoding { .. } => "InvalidEncoding",
            Self::EmptyBody { .. } => "EmptyBody",
            Self::MissingTitle { .. } => "MissingTitle",
            Self::MissingOrder { .. } => "MissingOrder",
            Self::InvalidOrder { .. } => "InvalidOrder",
            Self::DuplicateOrder { .. } => "DuplicateOrder",
            Self::InvalidDuration { .. } => "InvalidDuration",
            Self::UnknownField { .. } => "UnknownField",
            Self::EmptyModule { .. } => "EmptyModule",
            Self::EmptyCourse { .. } => "EmptyCourse",
        }
    }

    /// The file or directory the violation points at. For duplicates this
    /// is the second (conflicting) lesson.
    pub fn path(&self) -> &Path {
        match self {
            Self::MalformedFrontMatter { path, .. }
            | Self::InvalidEncoding { path, .. }
            | Self::EmptyBody { path, .. }
            | Self::MissingTitle { path, .. }
            | Self::MissingOrder { path }
            | Self::InvalidOrder { path, .. }
            | Self::InvalidDuration { path, .. }
            | Self::UnknownField { path, .. }
            | Self::EmptyModule { path, .. }
            | Self::EmptyCourse { path, .. } => path,
            Self::DuplicateOrder { second, .. } => second,
        }
    }
}

fn location(path: &Path, order: &Option<i64>) -> String {
    match order {
        Some(order) => format!("{} (order {order})", path.display()),
        None => path.display().to_string(),
    }
}

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

/// An ordered collection of violations gathered during one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Append every violation from another report.
    pub fn merge(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// `Ok(value)` when nothing was reported, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, ValidationReport> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<Violation> for ValidationReport {
    fn from(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  [{}] {violation}", violation.kind())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CurriculumError
// ---------------------------------------------------------------------------

/// Top-level error type for all curriculum operations.
#[derive(Debug, thiserror::Error)]
pub enum CurriculumError {
    /// A single content violation (parser and fail-fast paths).
    #[error(transparent)]
    Violation(#[from] Violation),

    /// One or more violations collected across a module, course, or library.
    #[error("content validation failed with {} violation(s):\n{}", .0.len(), .0)]
    Invalid(ValidationReport),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON output could not be produced.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CurriculumError>;

impl CurriculumError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ValidationReport> for CurriculumError {
    fn from(report: ValidationReport) -> Self {
        Self::Invalid(report)
    }
}
