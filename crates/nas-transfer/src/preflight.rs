//! Local checks performed before an upload request is issued.
//!
//! The block list and category table mirror the server's configuration so a
//! file the server would refuse never costs a round-trip.

use crate::error::{TransferError, TransferResult};
use crate::model::FileHandle;

/// Extensions the server refuses to store.
pub const BLOCKED_EXTENSIONS: &[&str] = &[
    "bat", "exe", "cmd", "sh", "ps1", "vbs", "js", "reg", "msi", "com", "scr", "gadget",
    "application", "msc", "jar", "vb", "vbe", "jse", "ws", "wsf", "wsc", "wsh", "ps1xml", "ps2",
    "ps2xml", "psc1", "psc2", "msh", "msh1", "msh2", "mshxml", "msh1xml", "msh2xml", "scf", "lnk",
    "inf", "sys",
];

const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    (
        "document",
        &[
            "pdf", "doc", "docx", "txt", "rtf", "odt", "pages", "epub", "odf", "ods", "xls",
            "xlsx", "csv", "ppt", "pptx", "odp",
        ],
    ),
    (
        "image",
        &[
            "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "ico", "tiff", "psd", "ai", "raw",
            "heic", "jfif", "tif",
        ],
    ),
    (
        "video",
        &[
            "mp4", "avi", "mkv", "mov", "webm", "flv", "wmv", "m4v", "mpg", "mpeg", "3gp", "h264",
            "h265", "rm", "swf", "vob",
        ],
    ),
    (
        "audio",
        &[
            "mp3", "wav", "ogg", "flac", "m4a", "wma", "aac", "mid", "midi", "aif", "aifc",
            "aiff", "au", "pcm",
        ],
    ),
    (
        "archive",
        &[
            "zip", "rar", "7z", "tar", "gz", "bz2", "iso", "dmg", "pkg", "deb", "rpm", "xz",
            "tgz", "z",
        ],
    ),
    (
        "code",
        &[
            "py", "java", "c", "cpp", "h", "hpp", "html", "css", "scss", "json", "xml", "yaml",
            "yml", "sql", "php", "rb", "go", "rs", "ts", "jsx", "tsx",
        ],
    ),
    ("font", &["ttf", "otf", "woff", "woff2", "eot"]),
    ("model", &["obj", "fbx", "3ds", "blend", "stl", "dae", "max"]),
];

/// Category used when no table entry matches.
pub const FALLBACK_CATEGORY: &str = "other";

/// Reject files the server would refuse.
///
/// # Errors
///
/// Returns [`TransferError::InvalidInput`] for blocked extensions and empty
/// file names.
pub fn validate_upload(file: &FileHandle) -> TransferResult<()> {
    if file.name.trim().is_empty() {
        return Err(TransferError::InvalidInput {
            field: "file",
            reason: "No selected file",
            value: None,
        });
    }
    if let Some(ext) = file.extension() {
        if BLOCKED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(TransferError::InvalidInput {
                field: "file",
                reason: "File type not allowed",
                value: Some(ext),
            });
        }
    }
    Ok(())
}

/// Category the server would file `name` under.
#[must_use]
pub fn infer_category(name: &str) -> &'static str {
    let handle = FileHandle::new(name, name, 0);
    let Some(ext) = handle.extension() else {
        return FALLBACK_CATEGORY;
    };
    CATEGORY_TABLE
        .iter()
        .find(|(_, extensions)| extensions.contains(&ext.as_str()))
        .map_or(FALLBACK_CATEGORY, |(category, _)| category)
}
