use crate::raster::DepthMap;

/// Depth-band boundaries derived from the depth histogram so each band
/// covers a near-equal share of pixels.
///
/// Holds `layer_count + 1` non-decreasing bounds. The first bound is 0, the
/// last is the observed depth maximum (not a fixed 255), matching how the
/// band ranges are reported downstream. Highly concentrated depth
/// distributions legally produce repeated bounds and near-empty bands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdSet {
    bounds: Vec<u8>,
}

impl ThresholdSet {
    /// Interior cut `i` is the smallest depth whose cumulative pixel count
    /// reaches `i/k` of the total. Exact integer comparison, so the result is
    /// bit-identical across runs.
    pub fn compute(depth: &DepthMap, layer_count: u32) -> Self {
        let mut histogram = [0u64; 256];
        for &d in &depth.data {
            histogram[d as usize] += 1;
        }
        let total = depth.pixel_count() as u64;
        let k = u64::from(layer_count);

        let mut cumulative = [0u64; 256];
        let mut acc = 0u64;
        for (bucket, &count) in histogram.iter().enumerate() {
            acc += count;
            cumulative[bucket] = acc;
        }

        let observed_max = histogram.iter().rposition(|&c| c > 0).unwrap_or(0) as u8;

        let mut bounds = Vec::with_capacity(layer_count as usize + 1);
        bounds.push(0u8);
        for cut in 1..k {
            let hit = cumulative
                .iter()
                .position(|&c| c * k >= cut * total)
                .unwrap_or(255);
            bounds.push(hit as u8);
        }
        bounds.push(observed_max);

        Self { bounds }
    }

    pub fn bounds(&self) -> &[u8] {
        &self.bounds
    }

    pub fn layer_count(&self) -> usize {
        self.bounds.len() - 1
    }

    /// `(low, high)` depth range of one band. Bands are half-open except the
    /// last, which includes its upper bound.
    pub fn band_range(&self, band: usize) -> (u8, u8) {
        (self.bounds[band], self.bounds[band + 1])
    }

    /// Band index for a depth value. Every depth maps to exactly one band;
    /// repeated bounds make the bands between them empty.
    pub fn band_of(&self, depth: u8) -> usize {
        let last = self.layer_count() - 1;
        for band in 0..last {
            if depth >= self.bounds[band] && depth < self.bounds[band + 1] {
                return band;
            }
        }
        last
    }
}
