//! Core domain types for course content.
//!
//! Three layers:
//! - [`LessonDocument`]: what the parser produced from one file, unvalidated
//! - [`Lesson`] / [`Module`]: validated content, one module at a time
//! - [`Library`] / [`CourseTree`]: the assembled, navigable output tree

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version for the serialized course tree.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// LessonDocument
// ---------------------------------------------------------------------------

/// A single lesson file as parsed, before any invariant is checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonDocument {
    /// File the document was read from (synthetic for in-memory text).
    pub source: PathBuf,
    /// Title from front-matter, or the first `#` heading when there is none.
    pub title: Option<String>,
    /// Position within the module as declared by the author.
    pub order: Option<i64>,
    /// Advisory reading time.
    pub estimated_minutes: Option<i64>,
    /// Markdown body following the front-matter block.
    pub body: String,
    /// Front-matter keys outside the recognized schema.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
    /// Whether the file opened with a front-matter block.
    pub has_front_matter: bool,
}

// ---------------------------------------------------------------------------
// Validated content
// ---------------------------------------------------------------------------

/// A lesson that passed module validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub source: PathBuf,
    pub title: String,
    pub order: u32,
    pub estimated_minutes: Option<u32>,
    pub body: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
    /// Prose words outside fenced code blocks.
    pub word_count: usize,
    /// SHA-256 of the body, hex encoded.
    pub content_hash: String,
}

/// A module directory whose lessons are sorted by strictly increasing `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Directory name, e.g. `02-ownership`.
    pub name: String,
    /// Display title derived from the directory name, e.g. `Ownership`.
    pub title: String,
    pub path: PathBuf,
    pub lessons: Vec<Lesson>,
}

// ---------------------------------------------------------------------------
// Assembled tree
// ---------------------------------------------------------------------------

/// Derived navigation pointer to another lesson in the same course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRef {
    /// Name of the module holding the target lesson.
    pub module: String,
    pub order: u32,
    pub title: String,
    /// Zero-based index in course-wide reading order.
    pub position: usize,
}

/// A lesson inside an assembled course, with its navigation links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonNode {
    pub title: String,
    pub order: u32,
    pub estimated_minutes: Option<u32>,
    /// Source path relative to the content root where possible.
    pub path: String,
    pub word_count: usize,
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
    pub body: String,
    pub next_lesson_ref: Option<LessonRef>,
    pub previous_lesson_ref: Option<LessonRef>,
}

/// A module inside an assembled course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleNode {
    pub name: String,
    pub title: String,
    pub lessons: Vec<LessonNode>,
}

/// A fully assembled course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTree {
    pub name: String,
    pub title: String,
    pub lesson_count: usize,
    /// Sum of the declared `estimatedMinutes` values.
    pub total_estimated_minutes: u64,
    pub modules: Vec<ModuleNode>,
}

impl CourseTree {
    /// Lessons in course-wide reading order.
    pub fn lessons(&self) -> impl Iterator<Item = &LessonNode> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }
}

/// Every course found under one content root. Serialized as `course-tree.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub schema_version: u32,
    /// Tool version that produced this tree.
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    pub courses: Vec<CourseTree>,
}

// ---------------------------------------------------------------------------
// Toc
// ---------------------------------------------------------------------------

/// A single entry in the outline (`toc.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Display title.
    pub title: String,
    /// Path relative to the content root (directory or lesson file).
    pub path: String,
    /// Short annotation, e.g. `3 lessons · 45 min`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Nested child entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

/// Root structure for `toc.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toc {
    /// One section per course.
    pub sections: Vec<TocEntry>,
}
