//! Fixed-point separable Gaussian blur. Kernel weights are quantized to
//! Q16 and normalized to sum to exactly 65536, so a constant buffer is a
//! fixed point of the blur and results are bit-identical across runs.

use crate::error::{DepthstackError, DepthstackResult};

/// Blur a single-channel 8-bit plane (masks, alpha).
pub fn blur_plane_u8(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> DepthstackResult<Vec<u8>> {
    blur_channels::<1>(src, width, height, radius, sigma)
}

/// Blur an interleaved RGB buffer (the backdrop fallback).
pub fn blur_rgb8(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> DepthstackResult<Vec<u8>> {
    blur_channels::<3>(src, width, height, radius, sigma)
}

fn blur_channels<const C: usize>(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> DepthstackResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(C))
        .ok_or_else(|| DepthstackError::compositing("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(DepthstackError::compositing(
            "blur expects src matching width*height*channels",
        ));
    }
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass::<C>(src, &mut tmp, width, height, &kernel);
    vertical_pass::<C>(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> DepthstackResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(DepthstackError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(DepthstackError::compositing("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // push rounding residue into the center tap so the sum is exact
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let mid_val = i64::from(weights[mid]);
        weights[mid] = (mid_val + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass<const C: usize>(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; C];
            for (ki, &kw) in k.iter().enumerate() {
                let dx = ki as i32 - radius;
                let sx = (x + dx).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * C;
                for c in 0..C {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * C;
            for c in 0..C {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass<const C: usize>(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; C];
            for (ki, &kw) in k.iter().enumerate() {
                let dy = ki as i32 - radius;
                let sy = (y + dy).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * C;
                for c in 0..C {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * C;
            for c in 0..C {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_0_is_identity() {
        let src = vec![1u8, 2, 3, 4, 5, 6];
        assert_eq!(blur_plane_u8(&src, 3, 2, 0, 1.0).unwrap(), src);
        assert_eq!(blur_rgb8(&src, 2, 1, 0, 1.0).unwrap(), src);
    }

    #[test]
    fn constant_plane_is_fixed_point() {
        let src = vec![200u8; 5 * 7];
        let out = blur_plane_u8(&src, 5, 7, 3, 2.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn constant_rgb_is_fixed_point() {
        let px = [10u8, 20, 30];
        let src = px.repeat(4 * 3);
        let out = blur_rgb8(&src, 4, 3, 2, 1.5).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn energy_spreads_from_single_pixel() {
        let (w, h) = (5u32, 5u32);
        let mut src = vec![0u8; (w * h) as usize];
        src[(2 * w + 2) as usize] = 255;

        let out = blur_plane_u8(&src, w, h, 2, 1.2).unwrap();

        assert!(out.iter().filter(|&&v| v != 0).count() > 1);
        let sum: u32 = out.iter().map(|&v| u32::from(v)).sum();
        assert!((sum as i32 - 255).abs() <= 4);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(blur_plane_u8(&[0u8; 5], 2, 2, 1, 1.0).is_err());
    }
}
