use crate::error::{DepthstackError, DepthstackResult};
use crate::layer::Layer;

/// Per-layer metadata handed to the persistence collaborator. Pixel data is
/// emitted separately; records carry only what the manifest JSON needs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerRecord {
    pub name: String,
    pub order: u32,
    pub depth_range: (u8, u8),
    pub description: String,
    pub coverage_percent: f64,
    pub is_opaque: bool,
}

/// Structured output record for one separation run. Built once after all
/// layers are assembled, never mutated. Records are listed back-to-front
/// (farthest band first), matching the assembly order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    pub job_id: String,
    pub layer_count: u32,
    pub layers: Vec<LayerRecord>,
}

impl Manifest {
    pub fn build(job_id: impl Into<String>, layer_count: u32, layers: &[Layer]) -> Self {
        let records = layers
            .iter()
            .map(|layer| {
                let band = (layer_count - layer.order) as usize;
                let description = describe_band(band);
                LayerRecord {
                    name: format!("Layer_{}_{}.png", band + 1, description.to_lowercase()),
                    order: layer.order,
                    depth_range: layer.depth_range,
                    description: description.to_string(),
                    coverage_percent: round_tenths(layer.coverage_percent),
                    is_opaque: layer.is_opaque,
                }
            })
            .collect();
        Self {
            job_id: job_id.into(),
            layer_count,
            layers: records,
        }
    }

    pub fn to_json_string(&self) -> DepthstackResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DepthstackError::serde(e.to_string()))
    }
}

/// Position description from back-to-front band index; bands beyond the
/// third all read "Foreground".
pub fn describe_band(band: usize) -> &'static str {
    ["Background", "Midground", "Foreground"][band.min(2)]
}

fn round_tenths(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
