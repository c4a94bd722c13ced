//! Lesson document parsing: front-matter extraction, title fallback, and
//! front-matter rendering.
//!
//! A lesson file optionally opens with a `---` delimited YAML header holding
//! `title`, `order`, and `estimatedMinutes`. Everything after the closing
//! delimiter is the Markdown body.

mod normalize;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument};

use curriculum_shared::{LessonDocument, Violation};

/// Opening and closing line of a front-matter block.
const DELIMITER: &str = "---";

// ---------------------------------------------------------------------------
// Front-matter schema
// ---------------------------------------------------------------------------

/// Recognized front-matter keys. Anything else lands in `extra`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    order: Option<i64>,
    #[serde(default)]
    estimated_minutes: Option<i64>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

/// Where the header ends and the body begins.
enum Split<'a> {
    /// The document does not open with a delimiter line.
    Absent,
    /// Opened but never closed.
    Unclosed,
    Block { header: &'a str, body: &'a str },
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse one lesson file into a [`LessonDocument`].
///
/// `source` is only used for error context and is stored on the document.
/// Fails with [`Violation::MalformedFrontMatter`] when the header is never
/// closed or is not a valid YAML mapping for the schema, and with
/// [`Violation::EmptyBody`] when nothing but whitespace follows it.
#[instrument(skip_all, fields(source = %source.as_ref().display()))]
pub fn parse_lesson(
    source: impl AsRef<Path>,
    raw: &str,
) -> std::result::Result<LessonDocument, Violation> {
    let source = source.as_ref().to_path_buf();
    let text = normalize::run_pipeline(raw);

    let (front_matter, body) = match split_front_matter(&text) {
        Split::Absent => (None, text.as_str()),
        Split::Unclosed => {
            return Err(Violation::MalformedFrontMatter {
                path: source,
                message: "front-matter block opened on line 1 is never closed".into(),
            });
        }
        Split::Block { header, body } => (Some(parse_header(&source, header)?), body),
    };

    let has_front_matter = front_matter.is_some();
    let FrontMatter {
        title,
        order,
        estimated_minutes,
        extra,
    } = front_matter.unwrap_or_default();

    if body.trim().is_empty() {
        return Err(Violation::EmptyBody {
            path: source,
            order,
        });
    }

    let title = if has_front_matter {
        title.map(|t| t.trim().to_string())
    } else {
        extract_title(body)
    };

    let extra = extra
        .into_iter()
        .map(|(key, value)| {
            serde_json::to_value(&value)
                .map(|json| (key.clone(), json))
                .map_err(|e| Violation::MalformedFrontMatter {
                    path: source.clone(),
                    message: format!("value of `{key}` cannot be represented: {e}"),
                })
        })
        .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

    debug!(
        has_front_matter,
        title = title.as_deref().unwrap_or(""),
        ?order,
        body_len = body.len(),
        "lesson parsed"
    );

    Ok(LessonDocument {
        source,
        title,
        order,
        estimated_minutes,
        body: body.to_string(),
        extra,
        has_front_matter,
    })
}

/// Parse lesson text that did not come from a file.
pub fn parse_lesson_str(raw: &str) -> std::result::Result<LessonDocument, Violation> {
    parse_lesson(PathBuf::from("<inline>"), raw)
}

fn split_front_matter(text: &str) -> Split<'_> {
    let Some((first, rest)) = text.split_once('\n') else {
        return if text.trim_end() == DELIMITER {
            Split::Unclosed
        } else {
            Split::Absent
        };
    };

    if first.trim_end() != DELIMITER {
        return Split::Absent;
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Split::Block {
                header: &rest[..offset],
                body: &rest[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    Split::Unclosed
}

fn parse_header(source: &Path, header: &str) -> std::result::Result<FrontMatter, Violation> {
    if header.trim().is_empty() {
        return Ok(FrontMatter::default());
    }

    serde_yaml::from_str(header).map_err(|e| Violation::MalformedFrontMatter {
        path: source.to_path_buf(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Body helpers
// ---------------------------------------------------------------------------

/// Extract the text of the first level-1 ATX heading outside fenced code.
pub fn extract_title(md: &str) -> Option<String> {
    static H1_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^ {0,3}#[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").expect("valid regex")
    });

    prose_lines(md)
        .find_map(|line| H1_RE.captures(line).map(|c| c[1].trim().to_string()))
        .filter(|title| !title.is_empty())
}

/// Count words in a Markdown body, excluding fenced code blocks and bare
/// heading markers.
pub fn word_count(md: &str) -> usize {
    prose_lines(md)
        .flat_map(str::split_whitespace)
        .filter(|w| !w.chars().all(|c| c == '#' || c == '>' || c == '-' || c == '*'))
        .count()
}

/// Lines of `md` that are not inside (or delimiting) a fenced code block.
fn prose_lines(md: &str) -> impl Iterator<Item = &str> {
    let mut fence: Option<(char, usize)> = None;

    md.lines().filter(move |line| {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~');

        if let Some(ch) = marker {
            let run = trimmed.chars().take_while(|c| *c == ch).count();
            if run >= 3 {
                match fence {
                    None => {
                        fence = Some((ch, run));
                        return false;
                    }
                    Some((open, len)) if open == ch && run >= len => {
                        fence = None;
                        return false;
                    }
                    Some(_) => {}
                }
            }
        }

        fence.is_none()
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Build the front-matter block for a document's recognized fields.
///
/// Parsing the returned block reproduces `title`, `order`, and
/// `estimatedMinutes` exactly. Unset fields are omitted.
pub fn render_front_matter(doc: &LessonDocument) -> String {
    let mut fm = String::from("---\n");
    if let Some(title) = &doc.title {
        fm.push_str(&format!("title: \"{}\"\n", escape_yaml_string(title)));
    }
    if let Some(order) = doc.order {
        fm.push_str(&format!("order: {order}\n"));
    }
    if let Some(minutes) = doc.estimated_minutes {
        fm.push_str(&format!("estimatedMinutes: {minutes}\n"));
    }
    fm.push_str("---\n");
    fm
}

/// Render a whole lesson file: front-matter followed by the body.
pub fn render_lesson(doc: &LessonDocument) -> String {
    format!(
        "{}{}",
        render_front_matter(doc),
        normalize::ensure_trailing_newline(&doc.body)
    )
}

/// Escape special characters in a YAML double-quoted string.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn load_fixture(name: &str) -> String {
        fs::read_to_string(fixture_path(name))
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    // --- Front-matter ---

    #[test]
    fn parses_front_matter_and_body() {
        let raw = "---\norder: 1\ntitle: \"Intro\"\n---\n# Intro\n\nText";
        let doc = parse_lesson("intro.md", raw).unwrap();

        assert_eq!(doc.title.as_deref(), Some("Intro"));
        assert_eq!(doc.order, Some(1));
        assert_eq!(doc.estimated_minutes, None);
        assert_eq!(doc.body, "# Intro\n\nText");
        assert!(doc.has_front_matter);
        assert_eq!(doc.source, PathBuf::from("intro.md"));
    }

    #[test]
    fn parses_estimated_minutes_and_extra_keys() {
        let raw = "---\ntitle: Closures\norder: 4\nestimatedMinutes: 25\ndifficulty: hard\n---\nBody\n";
        let doc = parse_lesson_str(raw).unwrap();

        assert_eq!(doc.estimated_minutes, Some(25));
        assert_eq!(doc.extra.len(), 1);
        assert_eq!(doc.extra["difficulty"], serde_json::json!("hard"));
    }

    #[test]
    fn snake_case_duration_is_not_recognized() {
        let raw = "---\ntitle: A\norder: 1\nestimated_minutes: 5\n---\nBody\n";
        let doc = parse_lesson_str(raw).unwrap();
        assert_eq!(doc.estimated_minutes, None);
        assert!(doc.extra.contains_key("estimated_minutes"));
    }

    #[test]
    fn keeps_non_positive_numbers_for_the_validator() {
        let raw = "---\ntitle: A\norder: 0\nestimatedMinutes: -10\n---\nBody\n";
        let doc = parse_lesson_str(raw).unwrap();
        assert_eq!(doc.order, Some(0));
        assert_eq!(doc.estimated_minutes, Some(-10));
    }

    #[test]
    fn unclosed_front_matter_is_malformed() {
        let raw = "---\ntitle: Broken\norder: 1\n\n# Broken\n";
        let err = parse_lesson("broken.md", raw).unwrap_err();
        assert_eq!(err.kind(), "MalformedFrontMatter");
        assert_eq!(err.path(), Path::new("broken.md"));
    }

    #[test]
    fn lone_delimiter_is_malformed() {
        let err = parse_lesson_str("---").unwrap_err();
        assert_eq!(err.kind(), "MalformedFrontMatter");
    }

    #[test]
    fn non_integer_order_is_malformed() {
        let raw = "---\ntitle: A\norder: first\n---\nBody\n";
        let err = parse_lesson_str(raw).unwrap_err();
        assert!(matches!(err, Violation::MalformedFrontMatter { .. }));
    }

    #[test]
    fn empty_header_block_is_allowed() {
        let doc = parse_lesson_str("---\n---\n# Heading\n").unwrap();
        assert!(doc.has_front_matter);
        // Front-matter present, so no heading fallback.
        assert_eq!(doc.title, None);
    }

    #[test]
    fn empty_body_after_header() {
        let err = parse_lesson("a.md", "---\ntitle: A\norder: 2\n---\n\n   \n").unwrap_err();
        assert_eq!(
            err,
            Violation::EmptyBody {
                path: "a.md".into(),
                order: Some(2)
            }
        );
    }

    #[test]
    fn empty_file_has_empty_body() {
        let err = parse_lesson_str("").unwrap_err();
        assert_eq!(err.kind(), "EmptyBody");
    }

    #[test]
    fn crlf_and_bom_are_tolerated() {
        let raw = "\u{feff}---\r\ntitle: Windows\r\norder: 3\r\n---\r\nLine one\r\nLine two\r\n";
        let doc = parse_lesson_str(raw).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Windows"));
        assert_eq!(doc.body, "Line one\nLine two\n");
    }

    #[test]
    fn horizontal_rule_later_in_body_is_not_front_matter() {
        let raw = "# Title\n\n---\n\nMore\n";
        let doc = parse_lesson_str(raw).unwrap();
        assert!(!doc.has_front_matter);
        assert_eq!(doc.body, raw);
    }

    // --- Title fallback ---

    #[test]
    fn title_falls_back_to_first_heading() {
        let doc = parse_lesson_str("# My Lesson\n\nSome text.\n").unwrap();
        assert_eq!(doc.title.as_deref(), Some("My Lesson"));
        assert_eq!(doc.order, None);
        assert_eq!(doc.estimated_minutes, None);
        assert!(!doc.has_front_matter);
    }

    #[test]
    fn title_fallback_skips_fenced_code() {
        let md = "Intro text\n\n```bash\n# install deps\nnpm i\n```\n\n## Setup\n\n# Real Title\n";
        assert_eq!(extract_title(md).as_deref(), Some("Real Title"));
    }

    #[test]
    fn title_fallback_ignores_deeper_headings() {
        assert_eq!(extract_title("## Only H2\n### H3\n"), None);
        assert_eq!(extract_title("#NoSpace\n"), None);
    }

    #[test]
    fn title_strips_closing_hashes() {
        assert_eq!(extract_title("# Arrays ##\n").as_deref(), Some("Arrays"));
        assert_eq!(extract_title("# Learning C#\n").as_deref(), Some("Learning C#"));
    }

    // --- Word count ---

    #[test]
    fn word_count_excludes_code_blocks() {
        let md = "# Title\n\nOne two three.\n\n~~~\nlots of code words here\n~~~\n";
        assert_eq!(word_count(md), 4);
    }

    #[test]
    fn nested_fence_markers_stay_inside_block() {
        let md = "````md\n```\ninner\n```\n````\nafter\n";
        assert_eq!(word_count(md), 1);
    }

    // --- Rendering ---

    #[test]
    fn front_matter_round_trip() {
        let doc = LessonDocument {
            source: "x.md".into(),
            title: Some("Tricky: \"quotes\" and \\ slashes".into()),
            order: Some(7),
            estimated_minutes: Some(15),
            body: "Body text".into(),
            ..LessonDocument::default()
        };

        let parsed = parse_lesson("x.md", &render_lesson(&doc)).unwrap();
        assert_eq!(parsed.title, doc.title);
        assert_eq!(parsed.order, doc.order);
        assert_eq!(parsed.estimated_minutes, doc.estimated_minutes);
        assert_eq!(parsed.body, "Body text\n");
    }

    #[test]
    fn render_omits_unset_fields() {
        let doc = LessonDocument {
            title: Some("Only Title".into()),
            ..LessonDocument::default()
        };
        assert_eq!(render_front_matter(&doc), "---\ntitle: \"Only Title\"\n---\n");
    }

    // --- Fixture-based tests ---

    #[test]
    fn parses_fixture_lesson() {
        let name = "content/typescript/01-basics/01-types.md";
        let doc = parse_lesson(fixture_path(name), &load_fixture(name)).unwrap();

        assert_eq!(doc.title.as_deref(), Some("Basic Types"));
        assert_eq!(doc.order, Some(1));
        assert_eq!(doc.estimated_minutes, Some(15));
        assert!(doc.body.contains("```ts"));
    }

    #[test]
    fn parses_fixture_without_front_matter() {
        let raw = load_fixture("broken/algorithms/02-search/binary.md");
        let doc = parse_lesson_str(&raw).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Binary Search"));
        assert_eq!(doc.order, None);
    }
}
