//! Media validation, naming and compression.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use sha2::{Digest, Sha256};
use storyfeed_core::media::MediaFile;
use uuid::Uuid;

use crate::config::ComposerConfig;
use crate::error::ComposerError;

/// Accepted image MIME types.
pub const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Accepted video MIME types.
pub const VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm", "video/quicktime"];

/// Whether a media file plays as an image or a video slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

/// Checks type and size limits.
///
/// # Errors
///
/// Returns `ComposerError::Validation` for an unsupported type, an empty
/// file, or a file over the limit for its kind.
pub fn validate_media(file: &MediaFile, config: &ComposerConfig) -> Result<MediaKind, ComposerError> {
    let content_type = file.content_type.as_str();
    let (kind, limit) = if IMAGE_TYPES.contains(&content_type) {
        (MediaKind::Image, config.max_image_bytes)
    } else if VIDEO_TYPES.contains(&content_type) {
        (MediaKind::Video, config.max_video_bytes)
    } else {
        return Err(ComposerError::Validation(format!(
            "unsupported media type {content_type}"
        )));
    };
    if file.bytes.is_empty() {
        return Err(ComposerError::Validation(format!(
            "{} is empty",
            file.file_name
        )));
    }
    if file.size() > limit {
        return Err(ComposerError::Validation(format!(
            "{} is {} bytes, limit is {limit}",
            file.file_name,
            file.size()
        )));
    }
    Ok(kind)
}

/// File extension for an accepted MIME type.
#[must_use]
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        _ => "bin",
    }
}

/// Storage key `<user_id>/<sha256-hex>.<ext>`. Identical bytes always map
/// to the same key, so a retried upload overwrites instead of duplicating.
#[must_use]
pub fn object_key(user_id: Uuid, file: &MediaFile) -> String {
    let digest = hex::encode(Sha256::digest(&file.bytes));
    format!("{user_id}/{digest}.{}", extension_for(&file.content_type))
}

/// Re-encodes an image as JPEG, downscaled to fit the configured box.
///
/// GIFs pass through untouched to keep animation. Smaller images are never
/// upscaled but are still re-encoded.
///
/// # Errors
///
/// Returns `ComposerError::Media` if the bytes cannot be decoded or encoded.
pub fn compress_image(file: &MediaFile, config: &ComposerConfig) -> Result<MediaFile, ComposerError> {
    if file.content_type == "image/gif" {
        return Ok(file.clone());
    }
    let decoded = image::load_from_memory(&file.bytes)
        .map_err(|e| ComposerError::Media(format!("cannot decode {}: {e}", file.file_name)))?;
    let (width, height) = decoded.dimensions();
    let fitted = if width > config.max_image_width || height > config.max_image_height {
        decoded.resize(
            config.max_image_width,
            config.max_image_height,
            FilterType::Lanczos3,
        )
    } else {
        decoded
    };

    let rgb = fitted.to_rgb8();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, config.jpeg_quality)
        .encode_image(&rgb)
        .map_err(|e| ComposerError::Media(format!("cannot encode {}: {e}", file.file_name)))?;

    let bytes = out.into_inner();
    tracing::debug!(
        file = %file.file_name,
        before = file.bytes.len(),
        after = bytes.len(),
        "image compressed"
    );
    Ok(MediaFile {
        file_name: jpeg_name(&file.file_name),
        content_type: "image/jpeg".to_owned(),
        bytes,
    })
}

fn jpeg_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{stem}.jpg")
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageFormat, RgbImage};

    use super::*;

    fn png(width: u32, height: u32) -> MediaFile {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        MediaFile {
            file_name: "shelf.png".to_owned(),
            content_type: "image/png".to_owned(),
            bytes: bytes.into_inner(),
        }
    }

    fn file(content_type: &str, size: usize) -> MediaFile {
        MediaFile {
            file_name: "clip".to_owned(),
            content_type: content_type.to_owned(),
            bytes: vec![1; size],
        }
    }

    #[test]
    fn test_validate_media_accepts_known_types() {
        let config = ComposerConfig::default();

        assert_eq!(
            validate_media(&file("image/webp", 10), &config).unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            validate_media(&file("video/quicktime", 10), &config).unwrap(),
            MediaKind::Video
        );
    }

    #[test]
    fn test_validate_media_rejects_type_size_and_empty() {
        let config = ComposerConfig {
            max_video_bytes: 100,
            ..ComposerConfig::default()
        };

        assert!(matches!(
            validate_media(&file("application/pdf", 10), &config),
            Err(ComposerError::Validation(_))
        ));
        assert!(matches!(
            validate_media(&file("video/mp4", 101), &config),
            Err(ComposerError::Validation(_))
        ));
        assert!(matches!(
            validate_media(&file("video/mp4", 0), &config),
            Err(ComposerError::Validation(_))
        ));
    }

    #[test]
    fn test_object_key_is_content_addressed() {
        let user_id = Uuid::new_v4();
        let a = file("video/mp4", 32);
        let mut b = a.clone();
        b.file_name = "renamed.mp4".to_owned();

        let key = object_key(user_id, &a);

        assert_eq!(key, object_key(user_id, &b));
        assert!(key.starts_with(&format!("{user_id}/")));
        assert!(key.ends_with(".mp4"));
        assert_eq!(key.len(), user_id.to_string().len() + 1 + 64 + 4);
    }

    #[test]
    fn test_object_key_uses_lowercase_sha256_hex() {
        let user_id = Uuid::new_v4();
        let file = MediaFile {
            file_name: "abc.png".to_owned(),
            content_type: "image/png".to_owned(),
            bytes: b"abc".to_vec(),
        };

        let key = object_key(user_id, &file);

        assert_eq!(
            key,
            format!(
                "{user_id}/ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.png"
            )
        );
    }

    #[test]
    fn test_compress_downscales_to_fit_box() {
        // Arrange
        let config = ComposerConfig::default();
        let original = png(3_000, 1_000);

        // Act
        let compressed = compress_image(&original, &config).unwrap();

        // Assert
        assert_eq!(compressed.content_type, "image/jpeg");
        assert_eq!(compressed.file_name, "shelf.jpg");
        let (width, height) = image::load_from_memory(&compressed.bytes)
            .unwrap()
            .dimensions();
        assert_eq!(width, 1_080);
        assert!((359..=361).contains(&height));
    }

    #[test]
    fn test_compress_keeps_small_image_size() {
        let compressed = compress_image(&png(100, 50), &ComposerConfig::default()).unwrap();

        let decoded = image::load_from_memory(&compressed.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
    }

    #[test]
    fn test_compress_rejects_garbage_and_passes_gif_through() {
        let config = ComposerConfig::default();
        let gif = file("image/gif", 8);

        assert!(matches!(
            compress_image(&file("image/png", 8), &config),
            Err(ComposerError::Media(_))
        ));
        assert_eq!(compress_image(&gif, &config).unwrap(), gif);
    }
}
