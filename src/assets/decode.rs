use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    foundation::core::Rect,
    foundation::error::{StoryError, StoryResult},
};

/// Decoded raster image in premultiplied RGBA8 form.
///
/// Equality compares dimensions and pixel content, not buffer identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Approximate resident size of the pixel buffer.
    pub fn byte_len(&self) -> usize {
        self.rgba8_premul.len()
    }

    /// Pixel extent as a rectangle in image coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Copy of the pixels with premultiplication undone, for export to straight-alpha formats.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.rgba8_premul.as_ref().clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }
}

/// Capability that turns an asset key into a decoded image.
///
/// The cache calls this synchronously on a miss, possibly from several threads at once.
pub trait ImageDecoder: Send + Sync {
    /// Decode the image addressed by `key`. Failures must be reported as [`StoryError::Decode`].
    fn decode(&self, key: &str) -> StoryResult<DecodedImage>;
}

impl<F> ImageDecoder for F
where
    F: Fn(&str) -> StoryResult<DecodedImage> + Send + Sync,
{
    fn decode(&self, key: &str) -> StoryResult<DecodedImage> {
        self(key)
    }
}

/// Decoder that reads image files from disk, resolving relative keys against `root`.
#[derive(Clone, Debug)]
pub struct FsImageDecoder {
    root: PathBuf,
}

impl FsImageDecoder {
    /// Construct a decoder rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used for relative keys.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_bytes(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.root.join(Path::new(key));
        std::fs::read(&path).with_context(|| format!("read image bytes from '{}'", path.display()))
    }
}

impl ImageDecoder for FsImageDecoder {
    fn decode(&self, key: &str) -> StoryResult<DecodedImage> {
        let bytes = self
            .read_bytes(key)
            .map_err(|e| StoryError::decode(key, format!("{e:#}")))?;
        decode_image(&bytes).map_err(|e| match e {
            StoryError::Other(inner) => StoryError::decode(key, format!("{inner:#}")),
            other => other,
        })
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StoryResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Normalize an asset path into a platform-stable cache key.
///
/// Backslashes become `/`, empty and `.` segments are dropped, and a leading `/` is kept so
/// absolute paths stay absolute.
pub fn normalize_asset_key(source: &str) -> StoryResult<String> {
    let s = source.trim().replace('\\', "/");
    if s.is_empty() {
        return Err(StoryError::validation("asset key must be non-empty"));
    }

    let parts: Vec<&str> = s
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    if parts.is_empty() {
        return Err(StoryError::validation("asset key must contain a file name"));
    }

    let joined = parts.join("/");
    if s.starts_with('/') {
        Ok(format!("/{joined}"))
    } else {
        Ok(joined)
    }
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

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
