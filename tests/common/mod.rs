//! Shared fixtures for integration tests.
//!
//! Images are generated on the fly with the `image` crate and ingested
//! into a fresh session under a temporary root.

#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use stegtriage::{Artifact, Pipeline, PipelineConfig, Session, UnifiedReport};
use tempfile::TempDir;

/// Small RGBA gradient, cheap to compress.
pub fn rgba_fixture(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 16) as u8, (y * 16) as u8, 0x40, 0xFF]))
}

fn encode(img: image::DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode fixture");
    buf.into_inner()
}

pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    encode(rgba_fixture(w, h).into(), ImageFormat::Png)
}

pub fn bmp_bytes(w: u32, h: u32) -> Vec<u8> {
    encode(rgba_fixture(w, h).into(), ImageFormat::Bmp)
}

pub fn jpeg_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(w, h, |x, _| Rgb([(x * 8) as u8, 0x80, 0x20]));
    encode(img.into(), ImageFormat::Jpeg)
}

/// A PNG with text appended after its trailer.
pub fn png_with_trailer(w: u32, h: u32, trailer: &str) -> Vec<u8> {
    let mut bytes = png_bytes(w, h);
    bytes.push(0);
    bytes.extend_from_slice(trailer.as_bytes());
    bytes.push(0);
    bytes
}

/// A session root with one ingested artifact.
pub struct Fixture {
    pub root: TempDir,
    pub session: Session,
    pub path: PathBuf,
}

impl Fixture {
    pub fn new(name: &str, bytes: &[u8]) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let session = Session::create(root.path()).expect("session");
        let path = session
            .ingest(name, bytes, &Default::default())
            .expect("ingest");
        Self {
            root,
            session,
            path,
        }
    }

    pub fn artifact(&self) -> Artifact {
        Artifact::load(&self.path, &Default::default()).expect("artifact")
    }

    pub async fn analyze(&self) -> UnifiedReport {
        self.analyze_with(test_config()).await
    }

    pub async fn analyze_with(&self, config: PipelineConfig) -> UnifiedReport {
        let pipeline = Pipeline::new(config).expect("pipeline");
        pipeline.analyze(self.artifact(), self.session.clone()).await
    }
}

/// Defaults with tighter tool budgets so a slow host tool cannot stall a test.
pub fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    let t = &mut config.tools;
    t.exiftool_secs = 20;
    t.strings_secs = 20;
    t.binwalk_secs = 30;
    t.steghide_info_secs = 20;
    t.steghide_extract_secs = 20;
    t.zsteg_secs = 30;
    t.outguess_secs = 20;
    t.openstego_secs = 20;
    t.availability_secs = 10;
    config
}

pub fn to_value(report: &UnifiedReport) -> serde_json::Value {
    serde_json::to_value(report).expect("report serializes")
}
