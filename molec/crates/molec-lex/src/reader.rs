//! Source reader: loads source text and normalizes newlines.
//!
//! `\r\n` is folded into a single `\n`; a lone `\r` is left untouched and
//! has no line-break effect, matching how the rest of the pipeline tracks
//! position (only `\n` advances the line counter).

use std::fs;
use std::path::Path;

use thiserror::Error;

/// Fatal errors encountered while loading source text.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),
    #[error("source file is not valid UTF-8")]
    InvalidUtf8,
}

pub type ReaderResult<T> = Result<T, ReaderError>;

/// Loads a source file from disk and normalizes its newlines.
pub fn read_file(path: &Path) -> ReaderResult<String> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| ReaderError::InvalidUtf8)?;
    Ok(normalize_newlines(&text))
}

/// Normalizes the newlines of an in-memory source string.
///
/// Use this for sources that did not come from [`read_file`] (e.g. test
/// fixtures or embedded snippets), so every entry point into the lexer
/// sees the same newline convention.
pub fn normalize_newlines(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
                out.push('\n');
            } else {
                out.push('\r');
            }
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crlf_folds_to_lf() {
        assert_eq!(normalize_newlines("a\r\nb"), "a\nb");
    }

    #[test]
    fn test_lone_cr_preserved() {
        assert_eq!(normalize_newlines("a\rb"), "a\rb");
    }

    #[test]
    fn test_lf_unchanged() {
        assert_eq!(normalize_newlines("a\nb"), "a\nb");
    }

    #[test]
    fn test_mixed_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\rc\nd");
    }

    #[test]
    fn test_trailing_lone_cr() {
        assert_eq!(normalize_newlines("a\r"), "a\r");
    }
}
