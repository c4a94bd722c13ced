//! End-to-end build: content root → load → parse → validate → assemble → Library.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, instrument};

use curriculum_markdown::parse_lesson;
use curriculum_shared::{
    AppConfig, CURRENT_SCHEMA_VERSION, ContentConfig, CurriculumError, Library, Module, Result,
    ValidationOptions, ValidationReport,
};

use crate::assembler::{CourseInfo, ModuleOutcome, assemble_course};
use crate::loader::{CourseSource, ModuleSource, load_course, load_library};
use crate::toc::title_from_name;
use crate::validator::validate_module;

/// Options for a build, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub content: ContentConfig,
    pub validation: ValidationOptions,
    /// Recorded in the output tree.
    pub tool_version: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for BuildOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            content: config.content.clone(),
            validation: ValidationOptions::from(config),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Progress callback for reporting build status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each lesson file is parsed, successfully or not.
    fn lesson_parsed(&self, path: &Path, current: usize, total: usize);
    /// Called when a course has been assembled.
    fn course_assembled(&self, name: &str, lessons: usize);
    /// Called when the build succeeds.
    fn done(&self, library: &Library);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn lesson_parsed(&self, _path: &Path, _current: usize, _total: usize) {}
    fn course_assembled(&self, _name: &str, _lessons: usize) {}
    fn done(&self, _library: &Library) {}
}

/// Build every course under `root`.
///
/// Fails with [`CurriculumError::Invalid`] carrying every violation found
/// across all modules and courses.
#[instrument(skip_all, fields(root = %root.display(), strategy = %opts.validation.strategy))]
pub fn build_library(
    root: &Path,
    opts: &BuildOptions,
    progress: &dyn ProgressReporter,
) -> Result<Library> {
    progress.phase("Loading content");
    let sources = load_library(root, &opts.content)?;
    build(root, sources, opts, progress)
}

/// Build a single course directory into a one-course library.
#[instrument(skip_all, fields(course = %dir.display(), strategy = %opts.validation.strategy))]
pub fn build_course(
    dir: &Path,
    opts: &BuildOptions,
    progress: &dyn ProgressReporter,
) -> Result<Library> {
    progress.phase("Loading content");
    // Resolve `.` and `..` so the course is named after its real directory.
    let dir = dir.canonicalize().map_err(|e| CurriculumError::io(dir, e))?;
    let source = load_course(&dir, &opts.content)?;
    let root = dir.parent().unwrap_or(&dir);
    build(root, vec![source], opts, progress)
}

fn build(
    root: &Path,
    sources: Vec<CourseSource>,
    opts: &BuildOptions,
    progress: &dyn ProgressReporter,
) -> Result<Library> {
    let start = Instant::now();
    let total: usize = sources.iter().map(CourseSource::lesson_file_count).sum();
    info!(courses = sources.len(), lessons = total, "building course library");

    let mut report = ValidationReport::new();
    let mut courses = Vec::with_capacity(sources.len());
    let mut parsed = 0;

    progress.phase("Validating lessons");
    for source in sources {
        let title = title_from_name(&source.name);
        let modules: Vec<ModuleOutcome> = source
            .modules
            .into_iter()
            .map(|module| process_module(module, &opts.validation, progress, &mut parsed, total))
            .collect();

        let info = CourseInfo {
            name: &source.name,
            title: &title,
            path: &source.path,
            root,
        };
        match assemble_course(&info, modules) {
            Ok(tree) => {
                progress.course_assembled(&tree.name, tree.lesson_count);
                courses.push(tree);
            }
            Err(course_report) => report.merge(course_report),
        }
    }

    if !report.is_empty() {
        info!(
            violations = report.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "build failed"
        );
        return Err(CurriculumError::Invalid(report));
    }

    let library = Library {
        schema_version: CURRENT_SCHEMA_VERSION,
        tool_version: opts.tool_version.clone(),
        generated_at: Utc::now(),
        courses,
    };

    info!(
        courses = library.courses.len(),
        lessons = total,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "build complete"
    );
    progress.done(&library);
    Ok(library)
}

/// Parse and validate one module directory.
///
/// Undecodable files and parse failures are violations like any other: in
/// collect-all mode the lessons that did parse are still validated so the
/// author sees everything.
fn process_module(
    source: ModuleSource,
    opts: &ValidationOptions,
    progress: &dyn ProgressReporter,
    parsed: &mut usize,
    total: usize,
) -> ModuleOutcome {
    let mut report = ValidationReport::new();
    let mut docs = Vec::with_capacity(source.files.len());

    for (index, file) in source.files.iter().enumerate() {
        *parsed += 1;
        progress.lesson_parsed(&file.path, *parsed, total);

        match file.text().and_then(|text| parse_lesson(&file.path, text)) {
            Ok(doc) => docs.push(doc),
            Err(violation) => {
                report.push(violation);
                if opts.fail_fast() {
                    let skipped = source.files.len() - index - 1;
                    if skipped > 0 {
                        *parsed += skipped;
                        progress.lesson_parsed(&file.path, *parsed, total);
                    }
                    return Err(report);
                }
            }
        }
    }

    match validate_module(docs, opts) {
        Ok(lessons) => {
            let lessons = report.into_result(lessons)?;
            debug!(module = %source.name, lessons = lessons.len(), "module ready");
            Ok(Module {
                title: title_from_name(&source.name),
                name: source.name,
                path: source.path,
                lessons,
            })
        }
        Err(module_report) => {
            report.merge(module_report);
            Err(report)
        }
    }
}
