//! Extension-based media classification.

use std::path::Path;

use broll_models::MediaType;

/// Extensions treated as still images.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif", "heic",
];

/// Extensions treated as videos.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "webm", "m4v", "wmv", "flv", "mpg", "mpeg",
];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Classify a file by its extension (case-insensitive).
///
/// Never returns [`MediaType::Unknown`]; anything unrecognized is `Other`.
pub fn classify(path: impl AsRef<Path>) -> MediaType {
    match extension(path.as_ref()) {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => MediaType::Image,
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaType::Video,
        _ => MediaType::Other,
    }
}

/// MIME type to send alongside an inline image payload.
pub fn image_mime_type(path: impl AsRef<Path>) -> Option<&'static str> {
    let mime = match extension(path.as_ref())?.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_images_and_videos() {
        assert_eq!(classify("shots/b.png"), MediaType::Image);
        assert_eq!(classify("b.JPEG"), MediaType::Image);
        assert_eq!(classify("/abs/path/a.mp4"), MediaType::Video);
        assert_eq!(classify("clip.MoV"), MediaType::Video);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify("notes.txt"), MediaType::Other);
        assert_eq!(classify("README"), MediaType::Other);
        assert_eq!(classify(".mp4"), MediaType::Other);
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type("a.jpg"), Some("image/jpeg"));
        assert_eq!(image_mime_type("a.PNG"), Some("image/png"));
        assert_eq!(image_mime_type("a.mp4"), None);
    }
}
