//! File identity: size, digests, container format and pixel layout.

use super::AnalysisContext;
use crate::error::Result;
use crate::hashing::{md5_digest, sha256_digest};
use image::{ColorType, ImageFormat};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub size_bytes: Option<u64>,
    pub sha256: Option<String>,
    pub md5: Option<String>,
    /// MIME type sniffed from magic bytes.
    pub mime: Option<String>,
    pub format: Option<String>,
    pub mode: Option<String>,
    pub size: Option<Dimensions>,
}

pub fn analyze(ctx: &AnalysisContext) -> Result<FileInfo> {
    let bytes = ctx.artifact.bytes();
    let size_bytes = std::fs::metadata(ctx.artifact.path())
        .map(|m| m.len())
        .ok()
        .or(Some(bytes.len() as u64));

    let mime = infer::get(bytes).map(|t| t.mime_type().to_string());

    // Format, mode and size are only reported when the image decodes.
    let (format, mode, size) = match ctx.image() {
        Ok(img) => (
            image::guess_format(bytes).ok().map(format_name),
            Some(mode_name(img.color()).to_string()),
            Some(Dimensions {
                width: img.width(),
                height: img.height(),
            }),
        ),
        Err(_) => (None, None, None),
    };

    Ok(FileInfo {
        size_bytes,
        sha256: Some(sha256_digest(bytes)),
        md5: Some(md5_digest(bytes)),
        mime,
        format,
        mode,
        size,
    })
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        other => format!("{:?}", other).to_ascii_uppercase(),
    }
}

fn mode_name(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        _ => "unknown",
    }
}
