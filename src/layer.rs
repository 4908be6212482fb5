use crate::error::{DepthstackError, DepthstackResult};
use crate::raster::{AlphaMask, BandMask, RgbaBuffer, SourceImage};

/// One assembled output layer. Immutable once built; `order` 1 is the band
/// nearest the viewer, `layer_count` the farthest, and only the farthest
/// layer carries `is_opaque`.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub pixels: RgbaBuffer,
    pub order: u32,
    pub depth_range: (u8, u8),
    pub coverage_percent: f64,
    pub is_opaque: bool,
}

impl Layer {
    pub fn to_rgba_image(&self) -> DepthstackResult<image::RgbaImage> {
        self.pixels.to_rgba_image()
    }
}

/// Combine source RGB with a feathered alpha channel into a straight RGBA
/// buffer. Used for every layer except the rearmost one.
pub fn apply_alpha(source: &SourceImage, alpha: &AlphaMask) -> DepthstackResult<RgbaBuffer> {
    if alpha.width != source.width || alpha.height != source.height {
        return Err(DepthstackError::compositing(
            "alpha mask dimensions must match the source image",
        ));
    }
    let pixels = source.pixel_count();
    let mut out = vec![0u8; pixels * 4];
    for i in 0..pixels {
        let s = i * 3;
        let d = i * 4;
        out[d..d + 3].copy_from_slice(&source.data[s..s + 3]);
        out[d + 3] = alpha.data[i];
    }
    RgbaBuffer::new(source.width, source.height, out)
}

/// The undifferentiated full-opacity composite of the source image,
/// returned in both modes and exclusively when layer export is disabled.
pub fn full_composite(source: &SourceImage) -> RgbaBuffer {
    let pixels = source.pixel_count();
    let mut out = vec![0u8; pixels * 4];
    for i in 0..pixels {
        let s = i * 3;
        let d = i * 4;
        out[d..d + 3].copy_from_slice(&source.data[s..s + 3]);
        out[d + 3] = 255;
    }
    RgbaBuffer {
        width: source.width,
        height: source.height,
        data: out,
    }
}

/// Percentage of pixels a band contributes, computed on the resolved binary
/// mask before feathering so the per-layer coverages sum to ~100.
pub fn coverage_percent(mask: &BandMask) -> f64 {
    mask.nonzero_count() as f64 / mask.pixel_count() as f64 * 100.0
}
