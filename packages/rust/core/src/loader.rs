//! Content directory walker.
//!
//! Layout convention: `<root>/<course>/<module>/<lesson-file>`. Directory
//! entries are ordered with [`compare_names`], so `02-x` precedes `10-y`.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use curriculum_markdown::parse_lesson;
use curriculum_shared::{ContentConfig, CurriculumError, LessonDocument, Result, Violation};

use crate::toc::compare_names;

/// One lesson file's raw contents.
#[derive(Debug, Clone)]
pub struct LessonFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl LessonFile {
    /// The file contents as text, or [`Violation::InvalidEncoding`].
    pub fn text(&self) -> std::result::Result<&str, Violation> {
        decode(&self.path, &self.bytes)
    }
}

/// A module directory and its lesson files, in reading order.
#[derive(Debug, Clone)]
pub struct ModuleSource {
    pub name: String,
    pub path: PathBuf,
    pub files: Vec<LessonFile>,
}

/// A course directory and its modules, in reading order.
#[derive(Debug, Clone)]
pub struct CourseSource {
    pub name: String,
    pub path: PathBuf,
    pub modules: Vec<ModuleSource>,
}

impl CourseSource {
    pub fn lesson_file_count(&self) -> usize {
        self.modules.iter().map(|m| m.files.len()).sum()
    }
}

/// Load every course under `root`. Each subdirectory is a course.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn load_library(root: &Path, config: &ContentConfig) -> Result<Vec<CourseSource>> {
    let (dirs, files) = list_dir(root, config)?;
    if !files.is_empty() {
        debug!(count = files.len(), "ignoring files at content root");
    }

    let courses = dirs
        .iter()
        .map(|dir| load_course(dir, config))
        .collect::<Result<Vec<_>>>()?;

    debug!(courses = courses.len(), "content library loaded");
    Ok(courses)
}

/// Load a single course directory. Each subdirectory is a module.
#[instrument(skip_all, fields(course = %dir.display()))]
pub fn load_course(dir: &Path, config: &ContentConfig) -> Result<CourseSource> {
    let (module_dirs, stray) = list_dir(dir, config)?;
    for path in &stray {
        if is_lesson_file(path, config) {
            warn!(path = %path.display(), "lesson file outside a module directory, ignoring");
        }
    }

    let mut modules = Vec::with_capacity(module_dirs.len());
    for module_dir in module_dirs {
        let (nested, files) = list_dir(&module_dir, config)?;
        if !nested.is_empty() {
            debug!(
                module = %module_dir.display(),
                count = nested.len(),
                "ignoring nested directories inside module"
            );
        }

        let files = files
            .into_iter()
            .filter(|p| is_lesson_file(p, config))
            .map(|path| {
                let bytes = std::fs::read(&path).map_err(|e| CurriculumError::io(&path, e))?;
                Ok(LessonFile { path, bytes })
            })
            .collect::<Result<Vec<_>>>()?;

        modules.push(ModuleSource {
            name: file_name(&module_dir),
            path: module_dir,
            files,
        });
    }

    let course = CourseSource {
        name: file_name(dir),
        path: dir.to_path_buf(),
        modules,
    };
    debug!(
        modules = course.modules.len(),
        lessons = course.lesson_file_count(),
        "course loaded"
    );
    Ok(course)
}

/// Read and parse a single lesson file.
pub fn read_lesson(path: &Path) -> Result<LessonDocument> {
    let bytes = std::fs::read(path).map_err(|e| CurriculumError::io(path, e))?;
    Ok(parse_lesson(path, decode(path, &bytes)?)?)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// List a directory's subdirectories and files, each sorted in reading order.
fn list_dir(dir: &Path, config: &ContentConfig) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let entries = std::fs::read_dir(dir).map_err(|e| CurriculumError::io(dir, e))?;

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CurriculumError::io(dir, e))?;
        let path = entry.path();

        if config.skip_hidden && file_name(&path).starts_with('.') {
            continue;
        }

        let file_type = entry.file_type().map_err(|e| CurriculumError::io(&path, e))?;
        // Follow symlinks so linked module directories still count.
        if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
            dirs.push(path);
        } else {
            files.push(path);
        }
    }

    dirs.sort_by(|a, b| compare_names(&file_name(a), &file_name(b)));
    files.sort_by(|a, b| compare_names(&file_name(a), &file_name(b)));
    Ok((dirs, files))
}

fn decode<'a>(path: &Path, bytes: &'a [u8]) -> std::result::Result<&'a str, Violation> {
    std::str::from_utf8(bytes).map_err(|e| Violation::InvalidEncoding {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn is_lesson_file(path: &Path, config: &ContentConfig) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            config
                .lesson_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
    }

    #[test]
    fn loads_fixture_library_in_reading_order() {
        let courses = load_library(&fixtures().join("content"), &ContentConfig::default()).unwrap();

        let names: Vec<&str> = courses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["rust", "typescript"]);

        let rust = &courses[0];
        let modules: Vec<&str> = rust.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(modules, vec!["01-getting-started", "02-ownership"]);
        // README.md at course level is not a module lesson.
        assert_eq!(rust.lesson_file_count(), 4);
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let courses = load_library(&fixtures().join("content"), &ContentConfig::default()).unwrap();
        let ts = courses.iter().find(|c| c.name == "typescript").unwrap();
        assert!(ts.modules.iter().all(|m| !m.name.starts_with('.')));
        assert_eq!(ts.modules.len(), 2);
    }

    #[test]
    fn hidden_directories_load_when_configured() {
        let config = ContentConfig {
            skip_hidden: false,
            ..ContentConfig::default()
        };
        let course = load_course(&fixtures().join("content/typescript"), &config).unwrap();
        assert_eq!(course.modules.len(), 3);
    }

    #[test]
    fn only_configured_extensions_are_lessons() {
        let tmp = tempfile::tempdir().unwrap();
        let module = tmp.path().join("course/01-module");
        std::fs::create_dir_all(&module).unwrap();
        std::fs::write(module.join("a.md"), "# A\n").unwrap();
        std::fs::write(module.join("b.MARKDOWN"), "# B\n").unwrap();
        std::fs::write(module.join("notes.txt"), "scratch").unwrap();

        let course = load_course(&tmp.path().join("course"), &ContentConfig::default()).unwrap();
        let files: Vec<String> = course.modules[0]
            .files
            .iter()
            .map(|f| file_name(&f.path))
            .collect();
        assert_eq!(files, vec!["a.md", "b.MARKDOWN"]);
    }

    #[test]
    fn empty_module_directory_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("course/01-empty")).unwrap();

        let course = load_course(&tmp.path().join("course"), &ContentConfig::default()).unwrap();
        assert_eq!(course.modules.len(), 1);
        assert!(course.modules[0].files.is_empty());
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let err = load_library(Path::new("/definitely/not/here"), &ContentConfig::default())
            .unwrap_err();
        assert!(matches!(err, CurriculumError::Io { .. }));
    }

    #[test]
    fn undecodable_lesson_is_loaded_and_flagged() {
        let tmp = tempfile::tempdir().unwrap();
        let module = tmp.path().join("course/01-module");
        std::fs::create_dir_all(&module).unwrap();
        std::fs::write(module.join("a.md"), b"\xff\xfe# A\n").unwrap();

        let course = load_course(&tmp.path().join("course"), &ContentConfig::default()).unwrap();
        let err = course.modules[0].files[0].text().unwrap_err();
        assert_eq!(err.kind(), "InvalidEncoding");

        let err = read_lesson(&module.join("a.md")).unwrap_err();
        assert!(matches!(
            err,
            CurriculumError::Violation(Violation::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn read_lesson_parses_file() {
        let doc = read_lesson(&fixtures().join("content/rust/02-ownership/moves.md")).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Moves"));
        assert_eq!(doc.order, Some(1));
    }
}
