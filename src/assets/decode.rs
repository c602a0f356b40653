use std::sync::Arc;

use crate::{
    foundation::core::ImageDims,
    foundation::error::{LdiError, LdiResult},
};

#[derive(Clone, Debug)]
/// Decoded color image in straight-alpha RGBA8.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major RGBA8.
    pub rgba8: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// Decoded single-channel image (disparity or mask).
pub struct PreparedGray {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major 8-bit luma.
    pub luma8: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn dims(&self) -> ImageDims {
        ImageDims::new(self.width, self.height)
    }
}

impl PreparedGray {
    pub fn dims(&self) -> ImageDims {
        ImageDims::new(self.width, self.height)
    }
}

/// Decode any supported raster format to RGBA8, guessing the format from its magic bytes.
pub fn decode_rgba(bytes: &[u8], format: Option<image::ImageFormat>) -> LdiResult<PreparedImage> {
    let rgba = load(bytes, format)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PreparedImage {
        width,
        height,
        rgba8: Arc::new(rgba.into_raw()),
    })
}

/// Decode any supported raster format to 8-bit luma.
pub fn decode_luma(bytes: &[u8]) -> LdiResult<PreparedGray> {
    let luma = load(bytes, None)?.to_luma8();
    let (width, height) = luma.dimensions();
    Ok(PreparedGray {
        width,
        height,
        luma8: Arc::new(luma.into_raw()),
    })
}

fn load(bytes: &[u8], format: Option<image::ImageFormat>) -> LdiResult<image::DynamicImage> {
    let decoded = match format {
        Some(f) => image::load_from_memory_with_format(bytes, f),
        None => image::load_from_memory(bytes),
    };
    decoded.map_err(|e| LdiError::image_decode(e.to_string()))
}

/// Replace the alpha channel of `albedo` with `mask`, resampling the mask when sizes differ.
pub fn pack_albedo_mask(albedo: &PreparedImage, mask: &PreparedGray) -> LdiResult<PreparedImage> {
    let alpha: Vec<u8> = if mask.dims() == albedo.dims() {
        mask.luma8.as_ref().clone()
    } else {
        let src = image::GrayImage::from_raw(mask.width, mask.height, mask.luma8.as_ref().clone())
            .ok_or_else(|| LdiError::image_decode("mask buffer does not match its dimensions"))?;
        image::imageops::resize(
            &src,
            albedo.width,
            albedo.height,
            image::imageops::FilterType::Triangle,
        )
        .into_raw()
    };

    let mut rgba8 = albedo.rgba8.as_ref().clone();
    if rgba8.len() != alpha.len() * 4 {
        return Err(LdiError::image_decode(format!(
            "albedo buffer holds {} bytes, expected {}",
            rgba8.len(),
            alpha.len() * 4
        )));
    }
    for (px, a) in rgba8.chunks_exact_mut(4).zip(alpha) {
        px[3] = a;
    }

    Ok(PreparedImage {
        width: albedo.width,
        height: albedo.height,
        rgba8: Arc::new(rgba8),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
