//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use curriculum_core::export::{to_json, write_library};
use curriculum_core::loader::read_lesson;
use curriculum_core::pipeline::{BuildOptions, ProgressReporter, build_course, build_library};
use curriculum_core::toc::{build_toc, render_outline};
use curriculum_markdown::render_front_matter;
use curriculum_shared::{
    AppConfig, CurriculumError, Library, ValidationStrategy, init_config, init_config_in,
    load_config_for,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// curriculum: validate and assemble course content.
#[derive(Parser)]
#[command(
    name = "curriculum",
    version,
    about = "Validate course/module/lesson Markdown trees and assemble them into a navigable course tree.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Flags shared by every command that builds a library.
#[derive(clap::Args, Debug)]
pub(crate) struct SourceArgs {
    /// Content root (one directory per course), or a course directory with --course.
    pub root: PathBuf,

    /// Treat ROOT as a single course directory.
    #[arg(long)]
    pub course: bool,

    /// Stop at the first violation in each module.
    #[arg(long)]
    pub fail_fast: bool,

    /// Reject front-matter keys outside the lesson schema.
    #[arg(long)]
    pub strict: bool,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Check every lesson, module, and course under ROOT.
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Validate, then write course-tree.json and toc.json.
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory (defaults to `[output] dir` from config).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Parse a single lesson file and print what was extracted.
    Lesson {
        /// Lesson file to parse.
        file: PathBuf,

        /// Print the normalized front-matter block instead of JSON.
        #[arg(long)]
        front_matter: bool,
    },

    /// Print the course outline.
    Outline {
        #[command(flatten)]
        source: SourceArgs,

        /// Print toc.json instead of an indented tree.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
    Init {
        /// Directory to write curriculum.toml into (defaults to ~/.curriculum).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Show the configuration resolved for a content root.
    Show {
        /// Content root whose curriculum.toml should be considered.
        #[arg(default_value = ".")]
        root: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = ["curriculum", "curriculum_core", "curriculum_markdown", "curriculum_shared"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Validate { source } => cmd_validate(&source),
        Command::Build {
            source,
            out,
            compact,
        } => cmd_build(&source, out.as_deref(), compact),
        Command::Lesson { file, front_matter } => cmd_lesson(&file, front_matter),
        Command::Outline { source, json } => cmd_outline(&source, json),
        Command::Config { action } => match action {
            ConfigAction::Init { dir } => cmd_config_init(dir.as_deref()),
            ConfigAction::Show { root } => cmd_config_show(&root),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_validate(source: &SourceArgs) -> Result<()> {
    let (_, library) = build(source)?;

    let lessons: usize = library.courses.iter().map(|c| c.lesson_count).sum();
    println!();
    println!("  Content is valid.");
    println!("  Courses: {}", library.courses.len());
    println!("  Lessons: {lessons}");
    println!();

    Ok(())
}

fn cmd_build(source: &SourceArgs, out: Option<&Path>, compact: bool) -> Result<()> {
    let (config, library) = build(source)?;

    let out_dir = match out {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(&config.output.dir),
    };
    let pretty = config.output.pretty && !compact;

    let result = write_library(&out_dir, &library, pretty)?;

    println!();
    println!("  Course tree written.");
    println!("  Courses: {}", library.courses.len());
    println!("  Tree:    {}", result.tree_path.display());
    println!("  Outline: {}", result.toc_path.display());
    println!();

    Ok(())
}

fn cmd_lesson(file: &Path, front_matter: bool) -> Result<()> {
    let doc = read_lesson(file)?;
    info!(path = %file.display(), "lesson parsed");

    if front_matter {
        print!("{}", render_front_matter(&doc));
    } else {
        println!("{}", to_json(&doc, true)?);
    }
    Ok(())
}

fn cmd_outline(source: &SourceArgs, json: bool) -> Result<()> {
    let (_, library) = build(source)?;
    let toc = build_toc(&library);

    if json {
        println!("{}", to_json(&toc, true)?);
    } else {
        print!("{}", render_outline(&toc));
    }
    Ok(())
}

fn cmd_config_init(dir: Option<&Path>) -> Result<()> {
    let path = match dir {
        Some(dir) => init_config_in(dir)?,
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(root: &Path) -> Result<()> {
    let config: AppConfig = load_config_for(root)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared build step
// ---------------------------------------------------------------------------

/// Resolve config for the content root, apply CLI overrides, and build.
fn build(source: &SourceArgs) -> Result<(AppConfig, Library)> {
    if !source.root.is_dir() {
        return Err(eyre!("'{}' is not a directory", source.root.display()));
    }

    let config = load_config_for(&source.root)?;
    let mut opts = BuildOptions::from(&config);
    opts.tool_version = env!("CARGO_PKG_VERSION").to_string();
    if source.fail_fast {
        opts.validation.strategy = ValidationStrategy::FailFast;
    }
    if source.strict {
        opts.validation.strict_front_matter = true;
    }

    info!(
        root = %source.root.display(),
        course = source.course,
        strategy = %opts.validation.strategy,
        strict = opts.validation.strict_front_matter,
        "building course content"
    );

    let reporter = CliProgress::new()?;
    let result = if source.course {
        build_course(&source.root, &opts, &reporter)
    } else {
        build_library(&source.root, &opts, &reporter)
    };
    drop(reporter);

    match result {
        Ok(library) => Ok((config, library)),
        Err(CurriculumError::Invalid(report)) => {
            eprintln!();
            eprintln!("{report}");
            eprintln!();
            Err(eyre!(
                "content validation failed with {} violation(s)",
                report.len()
            ))
        }
        Err(other) => Err(other.into()),
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn lesson_parsed(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Checking [{current}/{total}] {}", path.display()));
    }

    fn course_assembled(&self, name: &str, lessons: usize) {
        self.spinner
            .set_message(format!("Assembled {name} ({lessons} lessons)"));
    }

    fn done(&self, _library: &Library) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_validate_flags() {
        let cli = Cli::parse_from([
            "curriculum",
            "-v",
            "validate",
            "./content",
            "--fail-fast",
            "--strict",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Validate { source } => {
                assert_eq!(source.root, PathBuf::from("./content"));
                assert!(source.fail_fast);
                assert!(source.strict);
                assert!(!source.course);
            }
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn parses_build_output_flags() {
        let cli = Cli::parse_from([
            "curriculum",
            "build",
            "content/rust",
            "--course",
            "-o",
            "public",
            "--compact",
        ]);
        match cli.command {
            Command::Build {
                source,
                out,
                compact,
            } => {
                assert!(source.course);
                assert_eq!(out, Some(PathBuf::from("public")));
                assert!(compact);
            }
            _ => panic!("expected build"),
        }
    }
}
