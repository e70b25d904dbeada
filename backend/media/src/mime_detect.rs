//! MIME and format detection for decoded frames.
//!
//! Used to label persisted artifacts and to sanity-check decoder output.

use framegrab_core::ImageFormat;
use std::path::Path;

/// Detect an image MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "bmp"          => "image/bmp",
        "txt"          => "text/plain",
        _              => "application/octet-stream",
    }
}

/// Identify an image format from its leading magic bytes.
pub fn sniff_image_format(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageFormat::Png)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_jpeg() {
        assert_eq!(detect_mime_type(&PathBuf::from("first_frame.JPG")), "image/jpeg");
    }

    #[test]
    fn unknown_extension_fallback() {
        assert_eq!(detect_mime_type(&PathBuf::from("frame.xyz")), "application/octet-stream");
    }

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(sniff_image_format(&[0xFF, 0xD8, 0xFF, 0xDB]), Some(ImageFormat::Jpeg));
        assert_eq!(sniff_image_format(b"\x89PNG\r\n\x1a\n...."), Some(ImageFormat::Png));
        assert_eq!(sniff_image_format(b"GIF89a"), None);
    }
}
