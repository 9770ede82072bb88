//! Canvas rasterizer — turns the drawing surface into an OCR-ready bitmap.
//!
//! Pipeline: pad with white → copy surface → binarize → encode PNG.
//! Bitmap OCR engines do noticeably better with whitespace around the ink
//! and no anti-aliased grey fringe, which is what padding and binarization
//! are for.

mod source;

pub use source::{ImageSource, DATA_URL_ENGINE};

use crate::error::{RecognitionError, RecognitionResult};
use crate::surface::{CanvasSurface, WHITE};
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PADDING: u32 = 20;
pub const DEFAULT_THRESHOLD: u8 = 180;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Rasterization knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterOptions {
    /// White margin on every side, in logical pixels (scaled by DPR).
    pub padding: u32,
    /// Channel average above which a pixel becomes white.
    pub threshold: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// An encoded bitmap ready to hand to a recognition engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl RasterImage {
    /// Encode an RGBA buffer as PNG.
    pub fn encode_png(buffer: &RgbaImage) -> RecognitionResult<Self> {
        let mut data = Vec::new();
        buffer
            .write_to(&mut std::io::Cursor::new(&mut data), ImageFormat::Png)
            .map_err(|e| RecognitionError::Raster(format!("PNG encode failed: {}", e)))?;
        Ok(Self {
            data,
            mime_type: "image/png".to_string(),
            width: buffer.width(),
            height: buffer.height(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `data:<mime>;base64,<payload>` form of the image.
    pub fn to_data_url(&self) -> String {
        source::encode_data_url(&self.mime_type, &self.data)
    }

    /// Decode a base64 data URL back into an image.
    pub fn from_data_url(url: &str) -> RecognitionResult<Self> {
        ImageSource::DataUrl(url.to_string()).into_raster()
    }
}

/// Render the surface into a padded, binarized PNG.
///
/// A surface that has not been laid out yet cannot be padded; its raw
/// content is encoded as-is (possibly an empty image) rather than failing.
pub fn render(surface: &CanvasSurface, options: &RasterOptions) -> RecognitionResult<RasterImage> {
    let start = std::time::Instant::now();

    if !surface.is_laid_out() {
        log::warn!("[RASTER] Surface has zero size — returning raw content unpadded");
        return Ok(RasterImage::encode_png(surface.pixels()).unwrap_or_else(|e| {
            log::warn!("[RASTER] Raw surface could not be encoded: {}", e);
            RasterImage {
                data: Vec::new(),
                mime_type: "image/png".to_string(),
                width: 0,
                height: 0,
            }
        }));
    }

    let buffer = compose(surface, options)?;
    let image = RasterImage::encode_png(&buffer)?;

    log::info!(
        "[RASTER] {}x{} PNG ({} bytes) in {}ms",
        image.width,
        image.height,
        image.data.len(),
        start.elapsed().as_millis()
    );
    Ok(image)
}

/// Build the padded, binarized buffer without encoding it.
///
/// Fails when the padded size does not fit a `u32` dimension.
pub fn compose(surface: &CanvasSurface, options: &RasterOptions) -> RecognitionResult<RgbaImage> {
    let source = surface.pixels();
    let pad = padded_margin(options.padding, surface.device_pixel_ratio())?;
    let width = padded_dimension(source.width(), pad)?;
    let height = padded_dimension(source.height(), pad)?;

    let mut out = RgbaImage::from_pixel(width, height, WHITE);
    imageops::replace(&mut out, source, pad as i64, pad as i64);
    binarize(&mut out, options.threshold);
    Ok(out)
}

fn padded_margin(padding: u32, device_pixel_ratio: f64) -> RecognitionResult<u32> {
    let pad = (padding as f64 * device_pixel_ratio).round();
    if pad > u32::MAX as f64 {
        return Err(RecognitionError::Raster(format!(
            "padding {} is too large",
            padding
        )));
    }
    Ok(pad as u32)
}

fn padded_dimension(size: u32, pad: u32) -> RecognitionResult<u32> {
    pad.checked_mul(2)
        .and_then(|margins| size.checked_add(margins))
        .ok_or_else(|| {
            RecognitionError::Raster(format!("{}px plus {}px padding per side overflows", size, pad))
        })
}

/// Snap every pixel to pure black or pure white, fully opaque.
pub fn binarize(buffer: &mut RgbaImage, threshold: u8) {
    for px in buffer.pixels_mut() {
        // Compare sums so a fractional average is not floored.
        let sum = px[0] as u16 + px[1] as u16 + px[2] as u16;
        *px = if sum > 3 * threshold as u16 { WHITE } else { BLACK };
    }
}
