//! Premultiplied RGBA8 compositing helpers for overlays drawn outside the vector pass.

use crate::foundation::{
    core::Rect,
    error::{TileGridError, TileGridResult},
};

pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over with an extra global opacity on `src`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        out[i] = sc.saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> TileGridResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TileGridError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Zero every pixel whose centre lies outside `keep`.
pub fn mask_outside_rect(buf: &mut [u8], width: u32, height: u32, keep: Rect) -> TileGridResult<()> {
    if buf.len() != width as usize * height as usize * 4 {
        return Err(TileGridError::render(
            "mask_outside_rect expects width*height*4 bytes",
        ));
    }
    let inside = |v: u32, lo: f64, hi: f64| {
        let c = f64::from(v) + 0.5;
        c >= lo && c < hi
    };
    for (i, px) in buf.chunks_exact_mut(4).enumerate() {
        let x = (i % width as usize) as u32;
        let y = (i / width as usize) as u32;
        if !(inside(x, keep.x0, keep.x1) && inside(y, keep.y0, keep.y1)) {
            px.fill(0);
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
