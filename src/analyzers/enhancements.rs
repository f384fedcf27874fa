//! Visual enhancements: inversion, contrast stretch, Otsu threshold.

use super::{to_luma, AnalysisContext};
use crate::core::report::ImageRef;
use crate::error::Result;
use image::{imageops, GrayImage, Luma, RgbImage};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enhancements {
    /// invert, contrast and (when it succeeded) threshold.
    pub images: BTreeMap<String, ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_error: Option<String>,
}

pub fn analyze(ctx: &AnalysisContext) -> Result<Enhancements> {
    let rgb = ctx.rgb()?;
    let mut images = BTreeMap::new();

    let mut inverted = rgb.clone();
    imageops::invert(&mut inverted);
    images.insert("invert".to_string(), ctx.save_rgb("enh_invert.png", &inverted)?);

    let contrasted = contrast(&rgb, ctx.config.enhancements.contrast_factor);
    images.insert(
        "contrast".to_string(),
        ctx.save_rgb("enh_contrast.png", &contrasted)?,
    );

    let mut threshold_error = None;
    let gray = to_luma(&rgb);
    match ctx.save_gray("enh_threshold.png", &otsu_binarize(&gray)) {
        Ok(r) => {
            images.insert("threshold".to_string(), r);
        }
        Err(e) => {
            warn!(error = %e, "threshold image failed");
            threshold_error = Some(e.to_string());
        }
    }

    Ok(Enhancements {
        images,
        threshold_error,
    })
}

/// Blend each sample away from the image's mean luminance by `factor`.
pub fn contrast(rgb: &RgbImage, factor: f32) -> RgbImage {
    let gray = to_luma(rgb);
    let n = gray.as_raw().len().max(1) as f64;
    let sum: f64 = gray.as_raw().iter().map(|&v| v as f64).sum();
    let mean = (sum / n + 0.5).floor() as f32;

    let mut out = rgb.clone();
    for v in out.iter_mut() {
        let blended = mean + factor * (*v as f32 - mean);
        *v = blended.clamp(0.0, 255.0) as u8;
    }
    out
}

/// Threshold maximizing between-class variance of the histogram.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut hist = [0u64; 256];
    for &v in gray.as_raw() {
        hist[v as usize] += 1;
    }
    let total: u64 = hist.iter().sum();
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let (mut weight_bg, mut sum_bg) = (0u64, 0f64);
    let (mut best, mut threshold) = (0f64, 0u8);
    for (t, &count) in hist.iter().enumerate() {
        weight_bg += count;
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }
        sum_bg += t as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;
        let between = weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg).powi(2);
        if between > best {
            best = between;
            threshold = t as u8;
        }
    }
    threshold
}

/// Pixels above the Otsu threshold become 255, the rest 0.
pub fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    let t = otsu_threshold(gray);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Luma([if v > t { 255 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn otsu_splits_bimodal() {
        let gray = GrayImage::from_fn(10, 1, |x, _| Luma([if x < 5 { 20 } else { 200 }]));
        let t = otsu_threshold(&gray);
        assert!((20..200).contains(&t));
        let bin = otsu_binarize(&gray);
        assert_eq!(bin.get_pixel(0, 0)[0], 0);
        assert_eq!(bin.get_pixel(9, 0)[0], 255);
    }

    #[test]
    fn contrast_stretches_from_mean() {
        let img = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([100, 100, 100])
            } else {
                Rgb([140, 140, 140])
            }
        });
        let out = contrast(&img, 2.0);
        assert_eq!(out.get_pixel(0, 0), &Rgb([80, 80, 80]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([160, 160, 160]));
    }

    #[test]
    fn contrast_clamps() {
        let img = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let out = contrast(&img, 3.0);
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }
}
