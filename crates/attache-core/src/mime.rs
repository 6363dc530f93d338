//! MIME type detection for stored attachments.
//!
//! Detection order: magic bytes (authoritative for binary formats),
//! then extension lookup, then `application/octet-stream`. Extension
//! lookup alone is used when only a path is available (remote disks do
//! not expose content for sniffing without a full read).

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Fallback MIME type when nothing can be determined.
pub const OCTET_STREAM: &str = "application/octet-stream";

static EXTENSION_MIME: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        // Images
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
        ("gif", "image/gif"),
        ("webp", "image/webp"),
        ("bmp", "image/bmp"),
        ("ico", "image/x-icon"),
        ("svg", "image/svg+xml"),
        ("tif", "image/tiff"),
        ("tiff", "image/tiff"),
        // Audio/video
        ("mp3", "audio/mpeg"),
        ("wav", "audio/wav"),
        ("ogg", "audio/ogg"),
        ("flac", "audio/flac"),
        ("mp4", "video/mp4"),
        ("webm", "video/webm"),
        ("mov", "video/quicktime"),
        ("avi", "video/x-msvideo"),
        // Documents
        ("pdf", "application/pdf"),
        ("doc", "application/msword"),
        (
            "docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        ("xls", "application/vnd.ms-excel"),
        (
            "xlsx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ),
        ("ppt", "application/vnd.ms-powerpoint"),
        (
            "pptx",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ),
        // Archives
        ("zip", "application/zip"),
        ("gz", "application/gzip"),
        ("tar", "application/x-tar"),
        ("7z", "application/x-7z-compressed"),
        // Text
        ("txt", "text/plain"),
        ("log", "text/plain"),
        ("csv", "text/csv"),
        ("md", "text/markdown"),
        ("html", "text/html"),
        ("htm", "text/html"),
        ("xml", "application/xml"),
        ("json", "application/json"),
        ("yaml", "application/yaml"),
        ("yml", "application/yaml"),
        ("toml", "application/toml"),
    ]
    .into_iter()
    .collect()
});

/// Look up a MIME type by file extension (case-insensitive).
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    EXTENSION_MIME.get(ext.to_lowercase().as_str()).copied()
}

/// Guess a MIME type from a path's extension, falling back to
/// `application/octet-stream`.
pub fn mime_from_path(path: &str) -> String {
    path.rsplit('.')
        .next()
        .filter(|ext| ext.len() < path.len())
        .and_then(mime_from_extension)
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

/// Detect a MIME type from file content, preferring magic bytes over
/// the filename extension.
pub fn detect_mime(filename: &str, data: &[u8]) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    if let Some(ext) = filename.rsplit('.').next() {
        if ext.len() < filename.len() {
            if let Some(mime) = mime_from_extension(ext) {
                return mime.to_string();
            }
        }
    }

    OCTET_STREAM.to_string()
}
