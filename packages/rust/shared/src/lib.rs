//! Shared types, error model, and configuration for the curriculum toolkit.
//!
//! This crate is the foundation depended on by all other curriculum crates.
//! It provides:
//! - [`CurriculumError`] and [`Violation`], the unified error model
//! - Domain types ([`LessonDocument`], [`Lesson`], [`Module`], [`CourseTree`], [`Library`])
//! - Configuration ([`AppConfig`], [`ValidationOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, ContentConfig, OutputConfig, ValidationConfig,
    ValidationOptions, ValidationStrategy, config_dir, config_file_path, init_config,
    init_config_in, load_config, load_config_for, load_config_from,
};
pub use error::{CurriculumError, Result, ValidationReport, Violation};
pub use types::{
    CURRENT_SCHEMA_VERSION, CourseTree, Lesson, LessonDocument, LessonNode, LessonRef, Library,
    Module, ModuleNode, Toc, TocEntry,
};
