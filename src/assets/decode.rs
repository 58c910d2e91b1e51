use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::error::{TileGridError, TileGridResult};

/// Decoded raster image, premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Build from straight-alpha RGBA8 pixels.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> TileGridResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| TileGridError::image_load("image buffer size overflow"))?;
        if rgba.len() != expected {
            return Err(TileGridError::image_load(format!(
                "rgba buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Where the background image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    /// Already-fetched encoded bytes (PNG, JPEG, ...).
    Encoded(Arc<Vec<u8>>),
}

impl ImageSource {
    /// Parse a URI. Plain paths and `file://` URIs are accepted; network schemes are not.
    pub fn parse(uri: &str) -> TileGridResult<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(TileGridError::image_load("empty image uri"));
        }
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(Self::Path(PathBuf::from(path)));
        }
        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(TileGridError::image_load(format!(
                "unsupported image uri scheme '{scheme}'"
            )));
        }
        Ok(Self::Path(PathBuf::from(uri)))
    }

    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }
}

/// Load and decode the image. This is the load-complete signal: `Ok` means the pixels
/// are ready, `Err` is always [`TileGridError::ImageLoad`].
#[tracing::instrument(skip(source))]
pub fn load_image(source: &ImageSource) -> TileGridResult<PreparedImage> {
    let img = match source {
        ImageSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                TileGridError::image_load(format!("read '{}': {e}", path.display()))
            })?;
            decode_image(&bytes)?
        }
        ImageSource::Encoded(bytes) => decode_image(bytes)?,
    };
    if img.is_empty() {
        return Err(TileGridError::image_load("image has zero area"));
    }
    tracing::debug!(width = img.width, height = img.height, "background image loaded");
    Ok(img)
}

pub fn decode_image(bytes: &[u8]) -> TileGridResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| TileGridError::image_load(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
