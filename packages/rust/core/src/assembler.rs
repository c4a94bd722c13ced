//! Course tree assembler.
//!
//! Takes the validated modules of one course and links every lesson to its
//! neighbours in course-wide reading order: module by module, and by `order`
//! within a module.

use std::path::Path;

use tracing::{debug, info, instrument};

use curriculum_shared::{
    CourseTree, Lesson, LessonNode, LessonRef, Module, ModuleNode, ValidationReport, Violation,
};

/// A module as handed to the assembler: validated, or the violations that
/// kept it from validating.
pub type ModuleOutcome = std::result::Result<Module, ValidationReport>;

/// Identity of the course being assembled.
#[derive(Debug, Clone)]
pub struct CourseInfo<'a> {
    /// Directory name, e.g. `rust`.
    pub name: &'a str,
    pub title: &'a str,
    /// Course directory, used in `EmptyCourse` reports.
    pub path: &'a Path,
    /// Content root; lesson paths in the tree are made relative to it.
    pub root: &'a Path,
}

/// Assemble one course from its module outcomes.
///
/// Every failure is reported together: the violations of modules that did
/// not validate, an `EmptyModule` for each module without lessons, and an
/// `EmptyCourse` when there are no modules at all.
#[instrument(skip_all, fields(course = %course.name, modules = modules.len()))]
pub fn assemble_course(
    course: &CourseInfo<'_>,
    modules: Vec<ModuleOutcome>,
) -> std::result::Result<CourseTree, ValidationReport> {
    let mut report = ValidationReport::new();

    if modules.is_empty() {
        report.push(Violation::EmptyCourse {
            course: course.name.to_string(),
            path: course.path.to_path_buf(),
        });
    }

    let mut valid = Vec::with_capacity(modules.len());
    for outcome in modules {
        match outcome {
            Err(module_report) => report.merge(module_report),
            Ok(module) if module.lessons.is_empty() => report.push(Violation::EmptyModule {
                course: course.name.to_string(),
                module: module.name,
                path: module.path,
            }),
            Ok(module) => valid.push(module),
        }
    }

    if !report.is_empty() {
        debug!(violations = report.len(), "course failed assembly");
        return Err(report);
    }

    let tree = link(course, valid);
    info!(
        lessons = tree.lesson_count,
        minutes = tree.total_estimated_minutes,
        "course assembled"
    );
    Ok(tree)
}

/// Build the tree and derive `nextLessonRef` / `previousLessonRef` with a
/// single linear pass over course-wide reading order.
fn link(course: &CourseInfo<'_>, modules: Vec<Module>) -> CourseTree {
    let refs: Vec<LessonRef> = modules
        .iter()
        .flat_map(|module| module.lessons.iter().map(move |lesson| (module, lesson)))
        .enumerate()
        .map(|(position, (module, lesson))| LessonRef {
            module: module.name.clone(),
            order: lesson.order,
            title: lesson.title.clone(),
            position,
        })
        .collect();

    let mut position: usize = 0;
    let mut total_minutes: u64 = 0;
    let mut nodes = Vec::with_capacity(modules.len());

    for module in modules {
        let mut lessons = Vec::with_capacity(module.lessons.len());
        for lesson in module.lessons {
            total_minutes += lesson.estimated_minutes.map_or(0, u64::from);
            let previous = position.checked_sub(1).and_then(|p| refs.get(p)).cloned();
            let next = refs.get(position + 1).cloned();
            lessons.push(lesson_node(lesson, course.root, next, previous));
            position += 1;
        }
        nodes.push(ModuleNode {
            name: module.name,
            title: module.title,
            lessons,
        });
    }

    CourseTree {
        name: course.name.to_string(),
        title: course.title.to_string(),
        lesson_count: refs.len(),
        total_estimated_minutes: total_minutes,
        modules: nodes,
    }
}

fn lesson_node(
    lesson: Lesson,
    root: &Path,
    next: Option<LessonRef>,
    previous: Option<LessonRef>,
) -> LessonNode {
    LessonNode {
        path: relative_path(root, &lesson.source),
        title: lesson.title,
        order: lesson.order,
        estimated_minutes: lesson.estimated_minutes,
        word_count: lesson.word_count,
        content_hash: lesson.content_hash,
        extra: lesson.extra,
        body: lesson.body,
        next_lesson_ref: next,
        previous_lesson_ref: previous,
    }
}

/// `path` relative to `root` with `/` separators, or the full path when it
/// lies outside `root`.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
