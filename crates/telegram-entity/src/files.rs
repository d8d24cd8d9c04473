//! Local file access for uploads.
//!
//! The only place in the crate that touches the filesystem. A file is opened,
//! copied into memory and closed within a single call.

use crate::error::{EntityError, EntityResult};
use log::debug;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// A local file read for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Base name of the file, declared as the upload's filename.
    pub file_name: String,
    /// MIME type guessed from the extension.
    pub mime_type: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

/// Open `path`, copy its contents and close it before returning.
///
/// The handle is dropped on every exit path, including a failed read part
/// way through the copy.
pub fn read_local_file(path: &Path) -> EntityResult<LocalFile> {
    let file = File::open(path).map_err(|e| EntityError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    io::copy(&mut reader, &mut data).map_err(|e| EntityError::io(path, e))?;

    let file_name = base_name(path);
    let mime_type = guess_mime_type(&file_name).to_string();
    debug!(
        "Read {} ({}, {})",
        path.display(),
        mime_type,
        format_file_size(data.len() as i64)
    );

    Ok(LocalFile {
        file_name,
        mime_type,
        data,
    })
}

/// Final path component, or `"upload"` when the path has none.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}

/// Guess MIME type from file extension.
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => return "application/octet-stream",
    };
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "txt" => "text/plain",
        "json" => "application/json",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

/// Human-readable file size string.
pub fn format_file_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else {
        format!("{:.2} GB", b / GB)
    }
}
