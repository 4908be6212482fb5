use std::collections::BTreeMap;

use crate::error::{DepthstackError, DepthstackResult};
use crate::raster::{BandMask, SubjectLabelMap};

/// Move every detected subject wholly into the band holding the plurality of
/// its pixels. Depth estimates are noisy at silhouettes; splitting a subject
/// across two printed layers reads as a broken physical assembly, so the
/// whole subject is relocated even when that misplaces part of it by one
/// band.
///
/// Two passes over the image: the first tallies per-subject, per-band pixel
/// counts; the second rewrites band membership per subject into fresh masks.
/// Ties prefer the band nearer the viewer (higher band index). Label ids
/// with zero pixels never enter the tally and are skipped silently.
pub fn resolve_subject_cohesion(
    masks: &[BandMask],
    subjects: &SubjectLabelMap,
) -> DepthstackResult<Vec<BandMask>> {
    let Some(first) = masks.first() else {
        return Ok(Vec::new());
    };
    if subjects.width != first.width || subjects.height != first.height {
        return Err(DepthstackError::compositing(
            "subject label map dimensions must match band masks",
        ));
    }

    let band_count = masks.len();
    let pixels = first.pixel_count();

    let mut tallies: BTreeMap<u32, Vec<u64>> = BTreeMap::new();
    for i in 0..pixels {
        let label = subjects.data[i];
        if label == 0 {
            continue;
        }
        let Some(band) = band_at(masks, i) else {
            continue;
        };
        tallies
            .entry(label)
            .or_insert_with(|| vec![0u64; band_count])[band] += 1;
    }
    if tallies.is_empty() {
        return Ok(masks.to_vec());
    }

    let mut targets: BTreeMap<u32, usize> = BTreeMap::new();
    for (&label, counts) in &tallies {
        let mut best = 0usize;
        for (band, &count) in counts.iter().enumerate() {
            // >= lets the higher band win ties: nearer to the viewer
            if count >= counts[best] {
                best = band;
            }
        }
        tracing::debug!(label, band = best, "subject assigned to plurality band");
        targets.insert(label, best);
    }

    let mut resolved = masks.to_vec();
    for i in 0..pixels {
        let label = subjects.data[i];
        if label == 0 {
            continue;
        }
        let Some(&target) = targets.get(&label) else {
            continue;
        };
        for (band, mask) in resolved.iter_mut().enumerate() {
            mask.data[i] = if band == target { 255 } else { 0 };
        }
    }
    Ok(resolved)
}

fn band_at(masks: &[BandMask], pixel: usize) -> Option<usize> {
    masks.iter().position(|m| m.data[pixel] != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> BandMask {
        let mut mask = BandMask::new_empty(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    mask.data[(y * width + x) as usize] = 255;
                }
            }
        }
        mask
    }

    fn split_masks(width: u32, height: u32, boundary_x: u32) -> Vec<BandMask> {
        vec![
            mask_from_fn(width, height, |x, _| x < boundary_x),
            mask_from_fn(width, height, |x, _| x >= boundary_x),
        ]
    }

    fn square_labels(
        width: u32,
        height: u32,
        x0: u32,
        y0: u32,
        side: u32,
        label: u32,
    ) -> SubjectLabelMap {
        let mut data = vec![0u32; (width * height) as usize];
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                data[(y * width + x) as usize] = label;
            }
        }
        SubjectLabelMap::new(width, height, data).unwrap()
    }

    #[test]
    fn majority_band_absorbs_whole_subject() {
        // 20x20 subject straddles the boundary 60/40 in favor of band 0
        let masks = split_masks(100, 100, 40);
        let labels = square_labels(100, 100, 28, 40, 20, 1);
        let resolved = resolve_subject_cohesion(&masks, &labels).unwrap();

        for y in 40..60u32 {
            for x in 28..48u32 {
                let i = (y * 100 + x) as usize;
                assert_eq!(resolved[0].data[i], 255);
                assert_eq!(resolved[1].data[i], 0);
            }
        }
        // pixels outside the subject keep their depth-band assignment
        assert_eq!(resolved[0].data[0], 255);
        assert_eq!(resolved[1].data[99], 255);
    }

    #[test]
    fn tie_prefers_band_nearer_viewer() {
        // 10 columns on each side of the boundary
        let masks = split_masks(100, 100, 40);
        let labels = square_labels(100, 100, 30, 40, 20, 1);
        let resolved = resolve_subject_cohesion(&masks, &labels).unwrap();

        for y in 40..60u32 {
            for x in 30..50u32 {
                let i = (y * 100 + x) as usize;
                assert_eq!(resolved[1].data[i], 255);
                assert_eq!(resolved[0].data[i], 0);
            }
        }
    }

    #[test]
    fn subjects_resolve_independently() {
        let masks = split_masks(100, 100, 40);
        let mut data = vec![0u32; 100 * 100];
        // subject 1 mostly left of the boundary, subject 2 entirely right
        for y in 0..10u32 {
            for x in 30..45u32 {
                data[(y * 100 + x) as usize] = 1;
            }
        }
        for y in 50..60u32 {
            for x in 60..70u32 {
                data[(y * 100 + x) as usize] = 2;
            }
        }
        let labels = SubjectLabelMap::new(100, 100, data).unwrap();
        let resolved = resolve_subject_cohesion(&masks, &labels).unwrap();

        assert_eq!(resolved[0].data[30], 255); // subject 1 pixel
        assert_eq!(resolved[0].data[44], 255); // formerly band 1
        assert_eq!(resolved[1].data[(55 * 100 + 65) as usize], 255);
    }

    #[test]
    fn sparse_label_ids_resolve_without_placeholders() {
        // ids 1 and 7 only; 2..=6 have zero pixels and must be skipped
        let masks = split_masks(100, 100, 40);
        let mut data = vec![0u32; 100 * 100];
        for y in 0..10u32 {
            for x in 30..45u32 {
                data[(y * 100 + x) as usize] = 1;
            }
        }
        for y in 50..60u32 {
            for x in 10..20u32 {
                data[(y * 100 + x) as usize] = 7;
            }
        }
        let labels = SubjectLabelMap::new(100, 100, data).unwrap();
        let resolved = resolve_subject_cohesion(&masks, &labels).unwrap();

        // subject 1: 10 columns left of the boundary vs 5 right, stays in band 0
        assert_eq!(resolved[0].data[(5 * 100 + 44) as usize], 255);
        assert_eq!(resolved[1].data[(5 * 100 + 44) as usize], 0);
        // subject 7 is entirely in band 0 and stays there
        assert_eq!(resolved[0].data[(55 * 100 + 15) as usize], 255);
        // unlabeled pixels are untouched by the absent ids
        assert_eq!(resolved[0].data[0], 255);
        assert_eq!(resolved[1].data[99], 255);
    }

    #[test]
    fn all_zero_labels_change_nothing() {
        let masks = split_masks(16, 16, 8);
        let labels = SubjectLabelMap::new(16, 16, vec![0u32; 256]).unwrap();
        let resolved = resolve_subject_cohesion(&masks, &labels).unwrap();
        assert_eq!(resolved, masks);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let masks = split_masks(16, 16, 8);
        let labels = SubjectLabelMap::new(8, 8, vec![0u32; 64]).unwrap();
        assert!(resolve_subject_cohesion(&masks, &labels).is_err());
    }
}
