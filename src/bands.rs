use crate::error::DepthstackResult;
use crate::raster::{BandMask, DepthMap};
use crate::threshold::ThresholdSet;

/// One binary membership mask per depth band. A single pass over the depth
/// map assigns each pixel to exactly one band, so the masks partition the
/// pixel set with no overlap and no gap.
pub fn build_band_masks(
    depth: &DepthMap,
    thresholds: &ThresholdSet,
) -> DepthstackResult<Vec<BandMask>> {
    let mut masks = Vec::with_capacity(thresholds.layer_count());
    for _ in 0..thresholds.layer_count() {
        masks.push(BandMask::new_empty(depth.width, depth.height)?);
    }

    for (i, &d) in depth.data.iter().enumerate() {
        masks[thresholds.band_of(d)].data[i] = 255;
    }

    Ok(masks)
}
