//! Bit-plane decomposition: 4 channels by 8 bits, each a 0/255 image.

use super::{channel_plane, AnalysisContext, CHANNELS};
use crate::core::report::ImageRef;
use crate::error::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bitplanes {
    /// channel name -> bit index ("0".."7") -> image.
    pub planes: BTreeMap<String, BTreeMap<String, ImageRef>>,
}

impl Bitplanes {
    pub fn len(&self) -> usize {
        self.planes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn plane_filename(channel: &str, bit: u8) -> String {
    format!("bitplane_{}_{}.png", channel, bit)
}

pub fn analyze(ctx: &AnalysisContext) -> Result<Bitplanes> {
    let rgba = ctx.rgba()?;
    let jobs: Vec<(usize, u8)> = (0..CHANNELS.len())
        .flat_map(|c| (0..8u8).map(move |bit| (c, bit)))
        .collect();

    let written: Vec<(usize, u8, ImageRef)> = jobs
        .into_par_iter()
        .map(|(c, bit)| -> Result<(usize, u8, ImageRef)> {
            let mask = 1u8 << bit;
            let plane = channel_plane(&rgba, c, |v| if v & mask != 0 { 255 } else { 0 })?;
            let r = ctx.save_gray(&plane_filename(CHANNELS[c], bit), &plane)?;
            Ok((c, bit, r))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut planes: BTreeMap<String, BTreeMap<String, ImageRef>> = BTreeMap::new();
    for (c, bit, r) in written {
        planes
            .entry(CHANNELS[c].to_string())
            .or_default()
            .insert(bit.to_string(), r);
    }
    debug!(count = planes.values().map(BTreeMap::len).sum::<usize>(), "bitplanes written");
    Ok(Bitplanes { planes })
}
