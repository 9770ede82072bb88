//! Image sources accepted by bitmap engines, and data-URL handling.
//!
//! Base64 decoding goes through one engine picked here, never through
//! per-call-site platform checks.

use super::RasterImage;
use crate::error::{RecognitionError, RecognitionResult};
use base64::engine::general_purpose::STANDARD;
use base64::engine::GeneralPurpose;
use base64::Engine;

/// The single base64 engine used for every data URL in the crate.
pub static DATA_URL_ENGINE: &GeneralPurpose = &STANDARD;

/// Anything a bitmap engine can be handed.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Encoded(RasterImage),
    Bytes(Vec<u8>),
    DataUrl(String),
}

impl ImageSource {
    /// Resolve to an encoded image with a known MIME type.
    pub fn into_raster(self) -> RecognitionResult<RasterImage> {
        match self {
            ImageSource::Encoded(image) => Ok(image),
            ImageSource::Bytes(data) => from_bytes(data, None),
            ImageSource::DataUrl(url) => {
                let (mime, data) = decode_data_url(&url)?;
                from_bytes(data, Some(mime))
            }
        }
    }
}

impl From<RasterImage> for ImageSource {
    fn from(image: RasterImage) -> Self {
        ImageSource::Encoded(image)
    }
}

pub(crate) fn encode_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, DATA_URL_ENGINE.encode(data))
}

/// Split a `data:<mime>;base64,<payload>` URL into MIME type and bytes.
fn decode_data_url(url: &str) -> RecognitionResult<(String, Vec<u8>)> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| RecognitionError::InvalidImage("not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| RecognitionError::InvalidImage("data URL has no payload".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| RecognitionError::InvalidImage("data URL is not base64".to_string()))?;

    let data = DATA_URL_ENGINE
        .decode(payload.trim())
        .map_err(|e| RecognitionError::InvalidImage(format!("bad base64 payload: {}", e)))?;
    Ok((mime.to_string(), data))
}

fn from_bytes(data: Vec<u8>, mime: Option<String>) -> RecognitionResult<RasterImage> {
    if data.is_empty() {
        return Err(RecognitionError::InvalidImage("empty image".to_string()));
    }
    let format = image::guess_format(&data).ok();
    let mime_type = match (mime, format) {
        (Some(m), _) if !m.is_empty() => m,
        (_, Some(f)) => f.to_mime_type().to_string(),
        _ => "application/octet-stream".to_string(),
    };
    let (width, height) = image::ImageReader::new(std::io::Cursor::new(&data))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok())
        .unwrap_or((0, 0));

    Ok(RasterImage {
        data,
        mime_type,
        width,
        height,
    })
}
