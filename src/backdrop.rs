use crate::blur::blur_rgb8;
use crate::error::{DepthstackError, DepthstackResult};
use crate::raster::{AlphaMask, RgbaBuffer, SourceImage};

// Matches a 21x21 Gaussian at sigma 10 for the fallback fill.
const FALLBACK_BLUR_RADIUS: u32 = 10;
const FALLBACK_BLUR_SIGMA: f32 = 10.0;

/// Assemble the rearmost layer as a fully opaque image.
///
/// Wherever the feathered mask is high the sharp source shows through;
/// everywhere else a fallback base fills in, either a caller-supplied
/// backdrop (e.g. an externally inpainted background) or a heavy blur of the
/// source. The alpha channel is forced to 255 at every pixel: the rearmost
/// layer has nothing behind it, so a see-through gap there would expose the
/// mounting surface when the stacked print is viewed at an angle. Nearer
/// layers keep partial transparency by design.
pub fn compose_opaque_backdrop(
    source: &SourceImage,
    alpha: &AlphaMask,
    backdrop: Option<&SourceImage>,
) -> DepthstackResult<RgbaBuffer> {
    if alpha.width != source.width || alpha.height != source.height {
        return Err(DepthstackError::compositing(
            "alpha mask dimensions must match the source image",
        ));
    }
    let fallback = match backdrop {
        Some(img) => {
            if img.width != source.width || img.height != source.height {
                return Err(DepthstackError::compositing(
                    "backdrop dimensions must match the source image",
                ));
            }
            img.data.clone()
        }
        None => blur_rgb8(
            &source.data,
            source.width,
            source.height,
            FALLBACK_BLUR_RADIUS,
            FALLBACK_BLUR_SIGMA,
        )?,
    };

    let pixels = source.pixel_count();
    let mut out = vec![0u8; pixels * 4];
    for i in 0..pixels {
        let a = u32::from(alpha.data[i]);
        let s = i * 3;
        let d = i * 4;
        for c in 0..3 {
            out[d + c] = blend_div255(source.data[s + c], fallback[s + c], a);
        }
        out[d + 3] = 255;
    }
    RgbaBuffer::new(source.width, source.height, out)
}

/// `sharp*a + fallback*(255-a)` with round-half-up division by 255.
fn blend_div255(sharp: u8, fallback: u8, a: u32) -> u8 {
    ((u32::from(sharp) * a + u32::from(fallback) * (255 - a) + 127) / 255) as u8
}
