//! Separable gaussian blur over premultiplied RGBA8, with Q16 fixed-point weights.

use crate::foundation::error::{TileGridError, TileGridResult};

const Q16_ONE: u32 = 1 << 16;

/// Soft glow for an overlay: `blur` follows the canvas `shadowBlur` convention, so the
/// gaussian sigma is half the blur distance and the kernel reaches `blur` pixels out.
pub fn glow_rgba8_premul(src: &[u8], width: u32, height: u32, blur: u32) -> TileGridResult<Vec<u8>> {
    let sigma = (blur as f32 * 0.5).max(0.5);
    blur_rgba8_premul(src, width, height, blur, sigma)
}

pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> TileGridResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| TileGridError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(TileGridError::render(format!(
            "blur expects {expected_len} bytes for {width}x{height}, got {}",
            src.len()
        )));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = Kernel::gaussian(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    let (w, h) = (width as usize, height as usize);
    for y in 0..h {
        kernel.convolve_line(src, &mut tmp, y * w, 1, w);
    }
    for x in 0..w {
        kernel.convolve_line(&tmp, &mut out, x, w, h);
    }
    Ok(out)
}

/// Symmetric 1-D kernel; weights sum to exactly [`Q16_ONE`].
struct Kernel {
    weights: Vec<u32>,
}

impl Kernel {
    fn gaussian(radius: u32, sigma: f32) -> TileGridResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(TileGridError::validation("blur sigma must be > 0"));
        }

        let r = radius as i64;
        let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
        let raw: Vec<f64> = (-r..=r)
            .map(|i| {
                let x = i as f64;
                (-x * x / denom).exp()
            })
            .collect();
        let sum: f64 = raw.iter().sum();
        if sum <= 0.0 {
            return Err(TileGridError::render("gaussian kernel sum is zero"));
        }

        let mut weights: Vec<u32> = raw
            .iter()
            .map(|w| ((w / sum) * f64::from(Q16_ONE)).round().clamp(0.0, f64::from(Q16_ONE)) as u32)
            .collect();
        // Rounding drift goes to the centre tap so flat regions stay flat.
        let total: i64 = weights.iter().map(|&w| i64::from(w)).sum();
        let mid = weights.len() / 2;
        let fixed = (i64::from(weights[mid]) + i64::from(Q16_ONE) - total).clamp(0, i64::from(Q16_ONE));
        weights[mid] = fixed as u32;

        Ok(Self { weights })
    }

    fn radius(&self) -> isize {
        (self.weights.len() / 2) as isize
    }

    /// Convolve `len` pixels starting at pixel `start`, `stride` pixels apart. Samples past
    /// either end clamp to the edge pixel.
    fn convolve_line(&self, src: &[u8], dst: &mut [u8], start: usize, stride: usize, len: usize) {
        let last = len as isize - 1;
        for i in 0..len as isize {
            let mut acc = [0u64; 4];
            for (k, &w) in self.weights.iter().enumerate() {
                let j = (i + k as isize - self.radius()).clamp(0, last) as usize;
                let idx = (start + j * stride) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(w) * u64::from(src[idx + c]);
                }
            }
            let out = (start + i as usize * stride) * 4;
            for (c, a) in acc.into_iter().enumerate() {
                dst[out + c] = ((a + u64::from(Q16_ONE / 2)) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_radius_is_identity() {
        let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap(), src);
    }

    #[test]
    fn flat_image_stays_flat() {
        let (w, h) = (6u32, 4u32);
        let src = [40u8, 40, 40, 40].repeat((w * h) as usize);
        assert_eq!(glow_rgba8_premul(&src, w, h, 3).unwrap(), src);
    }

    #[test]
    fn glow_spreads_a_thin_line_and_keeps_energy() {
        let (w, h) = (9u32, 9u32);
        let mut src = vec![0u8; (w * h * 4) as usize];
        for x in 0..w {
            let i = ((4 * w + x) * 4) as usize;
            src[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
        let out = glow_rgba8_premul(&src, w, h, 2).unwrap();

        let alpha = |x: u32, y: u32| out[((y * w + x) * 4 + 3) as usize];
        assert!(alpha(4, 3) > 0);
        assert!(alpha(4, 4) < 255);
        assert!(alpha(4, 3) < alpha(4, 4));
        let row_sum: u32 = (0..h).map(|y| u32::from(alpha(4, y))).sum();
        assert!((row_sum as i32 - 255).abs() <= 4, "{row_sum}");
    }

    #[test]
    fn mismatched_length_is_rejected() {
        assert!(blur_rgba8_premul(&[0; 12], 2, 2, 1, 1.0).is_err());
        assert!(blur_rgba8_premul(&[0; 16], 2, 2, 1, 0.0).is_err());
    }
}
