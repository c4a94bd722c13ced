//! Outline builder and directory-name helpers.
//!
//! Course and module directories are named like `01-getting-started`. The
//! numeric prefix decides reading order; the rest becomes the display title.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use curriculum_shared::{CourseTree, Library, Toc, TocEntry};

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[-_. ]*").expect("valid regex"));

/// Build an outline of every course, module, and lesson in the library.
#[instrument(skip_all, fields(courses = library.courses.len()))]
pub fn build_toc(library: &Library) -> Toc {
    let sections: Vec<TocEntry> = library.courses.iter().map(course_entry).collect();
    debug!(sections = sections.len(), "outline built");
    Toc { sections }
}

fn course_entry(course: &CourseTree) -> TocEntry {
    let children = course
        .modules
        .iter()
        .map(|module| {
            let minutes: u64 = module
                .lessons
                .iter()
                .filter_map(|l| l.estimated_minutes)
                .map(u64::from)
                .sum();
            TocEntry {
                title: module.title.clone(),
                path: format!("{}/{}", course.name, module.name),
                summary: Some(summarize(module.lessons.len(), minutes)),
                children: module
                    .lessons
                    .iter()
                    .map(|lesson| TocEntry {
                        title: lesson.title.clone(),
                        path: lesson.path.clone(),
                        summary: lesson.estimated_minutes.map(|m| format!("{m} min")),
                        children: vec![],
                    })
                    .collect(),
            }
        })
        .collect();

    TocEntry {
        title: course.title.clone(),
        path: course.name.clone(),
        summary: Some(summarize(course.lesson_count, course.total_estimated_minutes)),
        children,
    }
}

fn summarize(lessons: usize, minutes: u64) -> String {
    let noun = if lessons == 1 { "lesson" } else { "lessons" };
    if minutes == 0 {
        format!("{lessons} {noun}")
    } else {
        format!("{lessons} {noun}, {minutes} min")
    }
}

/// Render the outline as an indented plain-text tree.
pub fn render_outline(toc: &Toc) -> String {
    fn walk(out: &mut String, entries: &[TocEntry], depth: usize) {
        for entry in entries {
            out.push_str(&"  ".repeat(depth));
            out.push_str("- ");
            out.push_str(&entry.title);
            if let Some(summary) = &entry.summary {
                out.push_str(&format!(" ({summary})"));
            }
            out.push('\n');
            walk(out, &entry.children, depth + 1);
        }
    }

    let mut out = String::new();
    walk(&mut out, &toc.sections, 0);
    out
}

// ---------------------------------------------------------------------------
// Directory-name helpers
// ---------------------------------------------------------------------------

/// Compare two directory or file names in reading order.
///
/// Names with a numeric prefix come first, by numeric value; the rest follow
/// lexically. Ties fall back to the full name so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    match (numeric_prefix(a), numeric_prefix(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
    }
}

fn numeric_prefix(name: &str) -> Option<u64> {
    PREFIX_RE
        .captures(name)
        .and_then(|c| c[1].parse::<u64>().ok())
}

/// Extract a human-readable title from a directory name.
pub fn title_from_name(name: &str) -> String {
    let stem = name
        .strip_suffix(".md")
        .or_else(|| name.strip_suffix(".markdown"))
        .unwrap_or(name);
    let stripped = PREFIX_RE.replace(stem, "");
    let base = if stripped.trim().is_empty() {
        stem
    } else {
        stripped.as_ref()
    };

    base.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    format!("{upper}{}", chars.collect::<String>())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
