//! Analyzer units.
//!
//! Each analyzer is a function of the shared [`AnalysisContext`] that
//! returns its own typed report or an error. Analyzers never read another
//! analyzer's output and only write files whose names they own inside the
//! session directory, so any subset of them may run concurrently.

pub mod binwalk;
pub mod bitplanes;
pub mod color_channels;
pub mod compression;
pub mod enhancements;
pub mod exif;
pub mod file_info;
pub mod header_footer;
pub mod lsb;
pub mod outguess_openstego;
pub mod steghide;
pub mod strings;
pub mod zsteg;

use crate::core::artifact::Artifact;
use crate::core::report::ImageRef;
use crate::core::session::Session;
use crate::error::{Result, StegError};
use crate::triage::config::PipelineConfig;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

/// Read-only state shared by every analyzer of one session.
#[derive(Debug)]
pub struct AnalysisContext {
    pub artifact: Artifact,
    pub session: Session,
    pub config: PipelineConfig,
    image: OnceLock<std::result::Result<DynamicImage, String>>,
}

impl AnalysisContext {
    pub fn new(artifact: Artifact, session: Session, config: PipelineConfig) -> Self {
        Self {
            artifact,
            session,
            config,
            image: OnceLock::new(),
        }
    }

    /// The artifact decoded once and shared by all image analyzers.
    pub fn image(&self) -> Result<&DynamicImage> {
        self.image
            .get_or_init(|| {
                debug!(size = self.artifact.bytes().len(), "decoding artifact image");
                image::load_from_memory(self.artifact.bytes()).map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(|e| StegError::ImageDecode(e.clone()))
    }

    /// Pixel grid converted to 4-channel RGBA.
    pub fn rgba(&self) -> Result<RgbaImage> {
        Ok(self.image()?.to_rgba8())
    }

    pub fn rgb(&self) -> Result<RgbImage> {
        Ok(self.image()?.to_rgb8())
    }

    /// Absolute path of a file owned by an analyzer.
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.session.dir().join(filename)
    }

    /// Write a grayscale image into the session and reference it.
    pub fn save_gray(&self, filename: &str, img: &GrayImage) -> Result<ImageRef> {
        img.save(self.output_path(filename))?;
        Ok(self.session.image_ref(filename))
    }

    pub fn save_rgb(&self, filename: &str, img: &RgbImage) -> Result<ImageRef> {
        img.save(self.output_path(filename))?;
        Ok(self.session.image_ref(filename))
    }
}

/// RGBA channel names in pixel order.
pub const CHANNELS: [&str; 4] = ["r", "g", "b", "a"];

/// Build a grayscale plane from one RGBA channel, mapped through `f`.
pub(crate) fn channel_plane<F>(rgba: &RgbaImage, channel: usize, f: F) -> Result<GrayImage>
where
    F: Fn(u8) -> u8,
{
    let (w, h) = rgba.dimensions();
    let data: Vec<u8> = rgba
        .as_raw()
        .chunks_exact(4)
        .map(|px| f(px[channel]))
        .collect();
    GrayImage::from_raw(w, h, data)
        .ok_or_else(|| StegError::Internal(format!("plane buffer mismatch for {}x{}", w, h)))
}

/// ITU-R 601-2 luma with the integer rounding of common imaging libraries.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

pub(crate) fn to_luma(rgb: &RgbImage) -> GrayImage {
    let (w, h) = rgb.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let p = rgb.get_pixel(x, y);
        image::Luma([luma(p[0], p[1], p[2])])
    })
}
