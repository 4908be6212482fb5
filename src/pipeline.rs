use rayon::prelude::*;

use crate::backdrop::compose_opaque_backdrop;
use crate::bands::build_band_masks;
use crate::cohesion::resolve_subject_cohesion;
use crate::error::{DepthstackError, DepthstackResult};
use crate::feather::feather_mask;
use crate::layer::{Layer, apply_alpha, coverage_percent, full_composite};
use crate::manifest::Manifest;
use crate::raster::{DepthMap, RgbaBuffer, SourceImage, SubjectLabelMap};
use crate::threshold::ThresholdSet;

/// Read-only inputs to one separation run. The depth map and the optional
/// subject/backdrop images come from external model collaborators and must
/// match the source dimensions exactly.
#[derive(Clone, Debug)]
pub struct SeparationInputs {
    pub source: SourceImage,
    pub depth: DepthMap,
    pub subjects: Option<SubjectLabelMap>,
    pub backdrop: Option<SourceImage>,
}

impl SeparationInputs {
    pub fn validate(&self) -> DepthstackResult<()> {
        let (w, h) = (self.source.width, self.source.height);
        if self.depth.width != w || self.depth.height != h {
            return Err(DepthstackError::dimensions(format!(
                "depth map is {}x{}, source image is {w}x{h}",
                self.depth.width, self.depth.height
            )));
        }
        if let Some(subjects) = &self.subjects
            && (subjects.width != w || subjects.height != h)
        {
            return Err(DepthstackError::dimensions(format!(
                "subject label map is {}x{}, source image is {w}x{h}",
                subjects.width, subjects.height
            )));
        }
        if let Some(backdrop) = &self.backdrop
            && (backdrop.width != w || backdrop.height != h)
        {
            return Err(DepthstackError::dimensions(format!(
                "backdrop is {}x{}, source image is {w}x{h}",
                backdrop.width, backdrop.height
            )));
        }
        Ok(())
    }
}

/// Caller-supplied knobs for a run.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SeparationParams {
    pub layer_count: u32,
    pub feather_radius: u32,
    pub export_layers: bool,
}

impl Default for SeparationParams {
    fn default() -> Self {
        Self {
            layer_count: 3,
            feather_radius: 2,
            export_layers: true,
        }
    }
}

impl SeparationParams {
    pub fn validate(&self) -> DepthstackResult<()> {
        if !(2..=5).contains(&self.layer_count) {
            return Err(DepthstackError::validation(format!(
                "layer_count must be in 2..=5, got {}",
                self.layer_count
            )));
        }
        if !(1..=5).contains(&self.feather_radius) {
            return Err(DepthstackError::validation(format!(
                "feather_radius must be in 1..=5, got {}",
                self.feather_radius
            )));
        }
        Ok(())
    }
}

/// Result of one run. The full-opacity composite is always produced;
/// `layers` and `manifest` are empty/absent when layer export is disabled.
#[derive(Clone, Debug)]
pub struct SeparationOutput {
    pub composite: RgbaBuffer,
    pub layers: Vec<Layer>,
    pub manifest: Option<Manifest>,
}

/// Split the source image into an ordered stack of semi-transparent layers
/// along the supplied depth estimate.
///
/// A pure function of its inputs: no retries, no partial results, no state
/// kept across invocations. Parameter and dimension errors surface here
/// before any buffer is allocated. Bands are feathered and composed in
/// parallel; every band only reads the shared inputs and writes its own
/// buffers, and all pixel arithmetic is integer fixed-point, so parallel
/// and serial runs are bit-identical.
#[tracing::instrument(skip(inputs))]
pub fn separate(
    job_id: &str,
    inputs: &SeparationInputs,
    params: SeparationParams,
) -> DepthstackResult<SeparationOutput> {
    params.validate()?;
    inputs.validate()?;

    let composite = full_composite(&inputs.source);
    if !params.export_layers {
        return Ok(SeparationOutput {
            composite,
            layers: Vec::new(),
            manifest: None,
        });
    }

    let thresholds = ThresholdSet::compute(&inputs.depth, params.layer_count);
    tracing::debug!(bounds = ?thresholds.bounds(), "computed depth thresholds");

    let mut masks = build_band_masks(&inputs.depth, &thresholds)?;
    if let Some(subjects) = &inputs.subjects {
        masks = resolve_subject_cohesion(&masks, subjects)?;
    }

    let layer_count = params.layer_count;
    let layers = (0..layer_count as usize)
        .into_par_iter()
        .map(|band| -> DepthstackResult<Layer> {
            let mask = &masks[band];
            let alpha = feather_mask(mask, params.feather_radius)?;
            // band 0 holds the lowest depths: the rearmost layer, which must
            // never show a hole
            let pixels = if band == 0 {
                compose_opaque_backdrop(&inputs.source, &alpha, inputs.backdrop.as_ref())?
            } else {
                apply_alpha(&inputs.source, &alpha)?
            };
            Ok(Layer {
                pixels,
                order: layer_count - band as u32,
                depth_range: thresholds.band_range(band),
                coverage_percent: coverage_percent(mask),
                is_opaque: band == 0,
            })
        })
        .collect::<DepthstackResult<Vec<Layer>>>()?;

    for layer in &layers {
        tracing::debug!(
            order = layer.order,
            depth_range = ?layer.depth_range,
            coverage = layer.coverage_percent,
            opaque = layer.is_opaque,
            "assembled layer"
        );
    }

    let manifest = Manifest::build(job_id, layer_count, &layers);
    Ok(SeparationOutput {
        composite,
        layers,
        manifest: Some(manifest),
    })
}
