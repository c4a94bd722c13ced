//! Pre-parse normalization passes for raw lesson text.
//!
//! Each pass is a function `&str -> String` applied in sequence, so the
//! front-matter splitter only ever sees `\n` line endings.

/// Run the full normalization pipeline on raw file contents.
pub(crate) fn run_pipeline(raw: &str) -> String {
    let mut result = strip_bom(raw).to_string();

    result = normalize_line_endings(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Byte-order mark
// ---------------------------------------------------------------------------

/// Drop a leading UTF-8 BOM left behind by some editors.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

// ---------------------------------------------------------------------------
// Pass 2: Line endings
// ---------------------------------------------------------------------------

/// Convert `\r\n` and lone `\r` to `\n`.
fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Helpers shared with the parser
// ---------------------------------------------------------------------------

/// Append a newline unless the text already ends with one.
pub(crate) fn ensure_trailing_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}
