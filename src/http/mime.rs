//! MIME type detection module
//!
//! Returns the Content-Type for a served file based on its extension.

use std::path::Path;

/// Get MIME Content-Type for a path
///
/// # Examples
/// ```
/// use devserve::http::mime::content_type_for;
/// use std::path::Path;
/// assert_eq!(content_type_for(Path::new("index.html")), "text/html; charset=utf-8");
/// assert_eq!(content_type_for(Path::new("game.WASM")), "application/wasm");
/// assert_eq!(content_type_for(Path::new("assets.data")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    get_content_type(ext.as_deref())
}

/// Get MIME Content-Type based on a lowercase file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("txt" | "md" | "log") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv; charset=utf-8",
        Some("xml") => "application/xml",

        // Scripts, modules and shader sources
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json" | "map") => "application/json",
        Some("wasm") => "application/wasm",
        Some("glsl" | "vert" | "frag") => "text/plain; charset=utf-8",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",

        // Audio / video
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // 3D assets
        Some("gltf") => "model/gltf+json",
        Some("glb") => "model/gltf-binary",

        // Archives
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        Some("tar") => "application/x-tar",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("js")), "text/javascript; charset=utf-8");
        assert_eq!(get_content_type(Some("wasm")), "application/wasm");
        assert_eq!(get_content_type(Some("glb")), "model/gltf-binary");
    }

    #[test]
    fn test_extension_case_and_unknown() {
        assert_eq!(content_type_for(Path::new("a/B.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("Makefile")), "application/octet-stream");
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
    }
}
