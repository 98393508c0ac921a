//! Filesystem helpers behind file serving and uploads.

use std::io;
use std::path::{Path, PathBuf};

use crate::ATTACHMENT;

/// Guesses a `Content-Type` from a path's extension.
///
/// Unknown or missing extensions fall back to `application/octet-stream`.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use skiff_http::fs::content_type_for;
///
/// assert_eq!(content_type_for(Path::new("index.html")), "text/html");
/// assert_eq!(content_type_for(Path::new("archive.bin")), "application/octet-stream");
/// ```
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "txt" | "md" => "text/plain",
        "xml" => "application/xml",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// Builds a `Content-Disposition` value for a download.
///
/// An empty filename yields a bare `attachment`, letting the client pick
/// its own name.
#[must_use]
pub fn attachment_header(filename: &str) -> String {
    if filename.is_empty() {
        ATTACHMENT.to_string()
    } else {
        format!("{ATTACHMENT}; filename={filename}")
    }
}

/// Recursively collects every regular file under `dir`.
///
/// Used at registration time by static-directory serving; the walk is
/// synchronous because it runs before the server starts accepting.
pub fn collect_paths(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    collect_into(dir, &mut paths)?;
    Ok(paths)
}

fn collect_into(dir: &Path, paths: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_into(&path, paths)?;
        } else {
            paths.push(path);
        }
    }
    Ok(())
}
