//! Recognition engine adapters.
//!
//! Each backend implements `RecognitionEngine`. The recognizer dispatches
//! through this trait only, so a new backend plugs in without touching
//! the façade's control flow.
//!
//! Engines:
//!   - cloud.rs — cloud ink service (strokes + bitmap), optional HMAC signing
//!   - local.rs — local bitmap OCR on a background worker

mod cloud;
mod local;
mod signing;
mod tesseract;
mod worker;

pub use cloud::{CloudEngine, ACCEPT, JIIX_CONTENT_TYPE};
pub use local::LocalOcrEngine;
pub use signing::{sign, RequestSigner, APPLICATION_KEY_HEADER, HMAC_HEADER};
pub use tesseract::TesseractCli;
pub use worker::OcrWorker;

use crate::config::Settings;
use crate::error::{RecognitionError, RecognitionResult};
use crate::ink::InkDocument;
use crate::raster::RasterImage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw engine output, before the recognizer normalizes it to text.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineReply {
    /// Engine produced text directly.
    Text(String),
    /// Structured JSON reply; shape varies by backend and API version.
    Json(serde_json::Value),
    /// Successful reply whose body could not be parsed.
    Unparsed(String),
}

/// Uniform capability every backend exposes.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Pure check of the credentials currently held. No network.
    fn is_configured(&self) -> bool;

    fn supports_strokes(&self) -> bool {
        false
    }

    async fn recognize_strokes(&self, _document: &InkDocument) -> RecognitionResult<EngineReply> {
        Err(RecognitionError::Unsupported("stroke recognition"))
    }

    async fn recognize_bitmap(&self, image: &RasterImage) -> RecognitionResult<EngineReply>;

    /// Pick up changed settings. Engines holding no settings-derived state
    /// ignore this.
    fn apply_settings(&mut self, _settings: &Settings) {}
}

/// Page layout analysis used by the local engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    /// Treat the image as one uniform block of text. Best for handwriting.
    SingleBlock,
    /// Let the engine segment the page itself.
    Auto,
}

impl LayoutMode {
    pub fn for_handwriting(handwriting: bool) -> Self {
        if handwriting {
            LayoutMode::SingleBlock
        } else {
            LayoutMode::Auto
        }
    }
}

/// Local OCR configuration. Changing it means a new worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrOptions {
    pub language: String,
    pub layout: LayoutMode,
}

impl OcrOptions {
    pub fn new(language: impl Into<String>, handwriting: bool) -> Self {
        Self {
            language: language.into(),
            layout: LayoutMode::for_handwriting(handwriting),
        }
    }
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self::new("eng", true)
    }
}

/// Black-box bitmap-to-text capability run on the OCR worker thread.
pub trait RasterOcr: Send {
    fn raster_to_text(&mut self, image: &[u8], options: &OcrOptions) -> RecognitionResult<String>;
}

impl<F> RasterOcr for F
where
    F: FnMut(&[u8], &OcrOptions) -> RecognitionResult<String> + Send,
{
    fn raster_to_text(&mut self, image: &[u8], options: &OcrOptions) -> RecognitionResult<String> {
        self(image, options)
    }
}
