//! Writes an assembled library to disk.
//!
//! ```text
//! <out_dir>/
//! ├── course-tree.json
//! └── toc.json
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use curriculum_shared::{CURRENT_SCHEMA_VERSION, CurriculumError, Library, Result};

use crate::toc::build_toc;

/// File name of the serialized course tree.
pub const TREE_FILE: &str = "course-tree.json";

/// File name of the serialized outline.
pub const TOC_FILE: &str = "toc.json";

/// Paths written by [`write_library`].
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub tree_path: PathBuf,
    pub toc_path: PathBuf,
}

/// Write `course-tree.json` and `toc.json` into `out_dir`.
#[instrument(skip_all, fields(out_dir = %out_dir.display(), courses = library.courses.len()))]
pub fn write_library(out_dir: &Path, library: &Library, pretty: bool) -> Result<ExportResult> {
    std::fs::create_dir_all(out_dir).map_err(|e| CurriculumError::io(out_dir, e))?;

    let tree_path = out_dir.join(TREE_FILE);
    write_json(&tree_path, library, pretty)?;

    let toc_path = out_dir.join(TOC_FILE);
    write_json(&toc_path, &build_toc(library), pretty)?;

    info!(path = %out_dir.display(), "course tree exported");
    Ok(ExportResult {
        tree_path,
        toc_path,
    })
}

/// Read a previously exported course tree, checking its schema version.
pub fn read_library(path: &Path) -> Result<Library> {
    let content = std::fs::read_to_string(path).map_err(|e| CurriculumError::io(path, e))?;
    let library: Library = serde_json::from_str(&content).map_err(|e| {
        CurriculumError::Serialization(format!("invalid {}: {e}", path.display()))
    })?;

    if library.schema_version != CURRENT_SCHEMA_VERSION {
        return Err(CurriculumError::Serialization(format!(
            "unsupported schema_version: {} (expected {})",
            library.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }

    Ok(library)
}

/// Serialize `data` to JSON.
pub fn to_json<T: serde::Serialize>(data: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(data)
    } else {
        serde_json::to_string(data)
    };
    json.map_err(|e| CurriculumError::Serialization(format!("JSON serialization failed: {e}")))
}

/// Write a JSON file atomically (write to temp, then rename).
fn write_json<T: serde::Serialize>(path: &Path, data: &T, pretty: bool) -> Result<()> {
    let json = to_json(data, pretty)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, json).map_err(|e| CurriculumError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| CurriculumError::io(path, e))?;

    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}
