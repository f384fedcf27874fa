//! Per-channel grayscale images.

use super::{channel_plane, AnalysisContext, CHANNELS};
use crate::core::report::ImageRef;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorChannels {
    /// Keyed by channel name: r, g, b, a.
    pub channels: BTreeMap<String, ImageRef>,
}

pub fn analyze(ctx: &AnalysisContext) -> Result<ColorChannels> {
    let rgba = ctx.rgba()?;
    let mut channels = BTreeMap::new();
    for (idx, name) in CHANNELS.iter().enumerate() {
        let plane = channel_plane(&rgba, idx, |v| v)?;
        let filename = format!("channel_{}.png", name.to_ascii_uppercase());
        channels.insert(name.to_string(), ctx.save_gray(&filename, &plane)?);
    }
    Ok(ColorChannels { channels })
}
