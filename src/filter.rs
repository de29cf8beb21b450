//! Extension-based check deciding whether a tree entry is fetched as text.

/// Suffixes treated as binary or otherwise not worth sending to a model.
///
/// Matching is a case-insensitive `ends_with`, so whole file names such as lock files can be
/// listed next to extensions.
pub const BINARY_SUFFIXES: &[&str] = &[
    // images
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico", ".svg", ".webp",
    // fonts
    ".eot", ".ttf", ".woff", ".woff2", ".otf",
    // audio/video
    ".mp3", ".wav", ".mp4", ".webm", ".mov",
    // archives and office documents
    ".zip", ".gz", ".rar", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    // generated files
    ".ds_store", "package-lock.json", "yarn.lock",
];

/// Returns `true` when `path` ends with one of [`BINARY_SUFFIXES`], ignoring case
pub fn is_binary(path: &str) -> bool {
    let lower = path.to_lowercase();
    BINARY_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}
