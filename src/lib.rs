#![forbid(unsafe_code)]

pub mod backdrop;
pub mod bands;
pub mod blur;
pub mod cohesion;
pub mod error;
pub mod feather;
pub mod fingerprint;
pub mod layer;
pub mod manifest;
pub mod pipeline;
pub mod raster;
pub mod threshold;

pub use error::{DepthstackError, DepthstackResult};
pub use fingerprint::{SeparationFingerprint, fingerprint_output};
pub use layer::Layer;
pub use manifest::{LayerRecord, Manifest};
pub use pipeline::{SeparationInputs, SeparationOutput, SeparationParams, separate};
pub use raster::{AlphaMask, BandMask, DepthMap, RgbaBuffer, SourceImage, SubjectLabelMap};
pub use threshold::ThresholdSet;
