//! Accepted CAD input formats.

use std::path::Path;

/// File extensions Forge is asked to translate, lowercase with leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".dwg", ".dxf", ".step", ".stp", ".ipt", ".igs", ".iges", ".stl",
];

/// Lowercased extension of `file_name` with its leading dot, or `""`.
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

pub fn is_supported(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension)
}
