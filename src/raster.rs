use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::error::{DepthstackError, DepthstackResult};

fn checked_len(width: u32, height: u32, channels: usize) -> DepthstackResult<usize> {
    if width == 0 || height == 0 {
        return Err(DepthstackError::validation(
            "raster width/height must be > 0",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| DepthstackError::validation("raster size overflows usize"))
}

/// Per-pixel depth estimate, 255 = nearest to the viewer. Read-only input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl DepthMap {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> DepthstackResult<Self> {
        if data.len() != checked_len(width, height, 1)? {
            return Err(DepthstackError::validation(
                "depth map data must be width*height bytes",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_gray_image(img: &GrayImage) -> DepthstackResult<Self> {
        Self::new(img.width(), img.height(), img.as_raw().clone())
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }
}

/// RGB input image, no alpha. Read-only input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl SourceImage {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> DepthstackResult<Self> {
        if data.len() != checked_len(width, height, 3)? {
            return Err(DepthstackError::validation(
                "source image data must be width*height*3 bytes",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_rgb_image(img: &RgbImage) -> DepthstackResult<Self> {
        Self::new(img.width(), img.height(), img.as_raw().clone())
    }

    pub fn from_dynamic_image(img: &DynamicImage) -> DepthstackResult<Self> {
        Self::from_rgb_image(&img.to_rgb8())
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / 3
    }
}

/// Instance labels from the external segmentation collaborator. 0 means
/// "no subject"; positive values identify distinct subjects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectLabelMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
}

impl SubjectLabelMap {
    pub fn new(width: u32, height: u32, data: Vec<u32>) -> DepthstackResult<Self> {
        if data.len() != checked_len(width, height, 1)? {
            return Err(DepthstackError::validation(
                "subject label map data must be width*height entries",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

/// Binary band membership, every byte either 0 or 255. An immutable
/// snapshot per depth band; reassignment produces fresh masks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl BandMask {
    pub fn new_empty(width: u32, height: u32) -> DepthstackResult<Self> {
        let len = checked_len(width, height, 1)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    pub fn nonzero_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// Feathered 8-bit alpha, full 0..=255 range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl AlphaMask {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> DepthstackResult<Self> {
        if data.len() != checked_len(width, height, 1)? {
            return Err(DepthstackError::validation(
                "alpha mask data must be width*height bytes",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

/// Straight (non-premultiplied) RGBA output buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbaBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> DepthstackResult<Self> {
        if data.len() != checked_len(width, height, 4)? {
            return Err(DepthstackError::validation(
                "rgba buffer data must be width*height*4 bytes",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Boundary conversion for the external persistence collaborator, which
    /// encodes the layer files itself.
    pub fn to_rgba_image(&self) -> DepthstackResult<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| DepthstackError::compositing("rgba buffer does not fit its dimensions"))
    }
}
