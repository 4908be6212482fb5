use crate::blur::blur_plane_u8;
use crate::error::DepthstackResult;
use crate::raster::{AlphaMask, BandMask};

/// Soften a hard band mask into an 8-bit alpha ramp.
///
/// Both the kernel support and the sigma grow with `radius`, so radius 5
/// spreads intermediate alpha over a wider transition band than radius 1.
/// Interior pixels far from the boundary stay at 255, exterior pixels at 0,
/// because the kernel sums to exactly one.
pub fn feather_mask(mask: &BandMask, radius: u32) -> DepthstackResult<AlphaMask> {
    let sigma = (radius as f32 / 2.0).max(0.5);
    let data = blur_plane_u8(&mask.data, mask.width, mask.height, radius, sigma)?;
    AlphaMask::new(mask.width, mask.height, data)
}
