//! Validation and assembly for course content libraries.
//!
//! This crate ties together loading, lesson parsing, module validation, and
//! course assembly into end-to-end builds (e.g., [`pipeline::build_library`]).

pub mod assembler;
pub mod export;
pub mod loader;
pub mod pipeline;
pub mod toc;
pub mod validator;
