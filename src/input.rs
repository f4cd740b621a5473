//! Input loading for tally files
//!
//! The whole file is read into memory before any tallying happens. Line
//! endings follow universal-newline rules, so CRLF traces tally the same as
//! LF ones.

use crate::error::{Result, TallyError};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a file and split it into newline-stripped lines
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| TallyError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let lines: Vec<String> = split_lines(&content).map(str::to_string).collect();
    debug!(
        path = %path.display(),
        bytes = content.len(),
        lines = lines.len(),
        "read input"
    );
    Ok(lines)
}

/// Split text into lines without their terminators
///
/// `\n`, `\r\n` and a lone `\r` all end a line. A trailing terminator does
/// not produce an extra empty line, but blank lines in the middle of the
/// input are kept as empty tokens.
pub fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\r', '\n']) {
            Some(pos) => {
                let line = &rest[..pos];
                let tail = &rest[pos..];
                let terminator = if tail.starts_with("\r\n") { 2 } else { 1 };
                rest = &tail[terminator..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}
