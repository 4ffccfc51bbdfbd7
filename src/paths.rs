//! Request path normalization and lexical path helpers.
//!
//! Every request path is normalized before it touches the route registry,
//! the template cache, or the filesystem. Normalization is purely lexical,
//! so `..` segments can never climb above the document root.

use std::fs;
use std::path::Path;

use percent_encoding::percent_decode_str;

/// File name that stands in for a directory when the directory itself
/// is requested.
pub const DIRECTORY_INDEX: &str = "index.html";

/// Normalizes a request path to a canonical absolute form.
///
/// The result always starts with `/`, contains no `.` or `..` segments,
/// no empty segments, and no trailing slash except for the root itself.
/// `..` segments that would climb above the root are discarded.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return "/".to_owned();
    }
    let mut normalized = String::with_capacity(path.len());
    for segment in segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    normalized
}

/// Maps a raw request path to the template path that serves it.
///
/// The path is percent-decoded first (clients request `/a b.html` as
/// `/a%20b.html`), then normalized, so encoded traversal sequences like
/// `%2e%2e%2f` collapse the same way literal ones do. Invalid escapes
/// pass through verbatim. A request for the root resolves to the
/// directory index.
pub fn request_template_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let normalized = normalize(&decoded);
    if normalized == "/" {
        format!("/{DIRECTORY_INDEX}")
    } else {
        normalized
    }
}

/// Returns the enclosing directory of a normalized path, including its
/// trailing slash.
///
/// The parent of the root is the root itself, so repeated application
/// terminates at `/`.
pub fn parent_dir(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}

/// Appends the directory index file name to a directory path.
pub fn index_path(dir: &str) -> String {
    format!("{dir}{DIRECTORY_INDEX}")
}

/// Reports whether `path` names an existing directory.
///
/// Any filesystem error counts as "not a directory".
pub fn is_directory(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).map(|meta| meta.is_dir()).unwrap_or(false)
}
