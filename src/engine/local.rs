//! Local bitmap OCR engine.
//!
//! Owns a single `OcrWorker`, created lazily on first use. Changing the
//! language or layout disposes the current worker completely before a new
//! one is started, so at most one OCR engine instance is alive.

use super::worker::OcrWorker;
use super::{EngineReply, OcrOptions, RasterOcr, RecognitionEngine, TesseractCli};
use crate::config::Settings;
use crate::error::{RecognitionError, RecognitionResult};
use crate::raster::{ImageSource, RasterImage};
use async_trait::async_trait;
use std::sync::Mutex;

type EngineFactory = Box<dyn Fn() -> RecognitionResult<Box<dyn RasterOcr>> + Send + Sync>;

pub struct LocalOcrEngine {
    factory: EngineFactory,
    options: OcrOptions,
    worker: Mutex<Option<OcrWorker>>,
}

impl LocalOcrEngine {
    /// Local engine backed by the `tesseract` binary.
    pub fn tesseract(options: OcrOptions) -> Self {
        Self::with_factory(options, || {
            TesseractCli::locate().map(|cli| Box::new(cli) as Box<dyn RasterOcr>)
        })
    }

    /// Local engine backed by any `RasterOcr`, built fresh for each worker.
    pub fn with_factory<F>(options: OcrOptions, factory: F) -> Self
    where
        F: Fn() -> RecognitionResult<Box<dyn RasterOcr>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            options,
            worker: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &OcrOptions {
        &self.options
    }

    /// Whether a worker is currently alive.
    pub fn has_worker(&self) -> bool {
        self.worker
            .lock()
            .map(|guard| guard.as_ref().is_some_and(OcrWorker::is_running))
            .unwrap_or(false)
    }

    /// Apply new options. A change tears down the worker; the next
    /// recognition starts a fresh one.
    pub fn reconfigure(&mut self, options: OcrOptions) {
        if options == self.options {
            return;
        }
        log::info!(
            "[OCR] Reconfiguring: language {} → {}, layout {:?} → {:?}",
            self.options.language,
            options.language,
            self.options.layout,
            options.layout
        );
        self.dispose();
        self.options = options;
    }

    /// Stop the worker, if any, and wait for it to exit.
    pub fn dispose(&mut self) {
        let worker = match self.worker.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(mut worker) = worker {
            worker.dispose();
        }
    }

    /// Recognize any supported image source.
    pub async fn recognize_source(&self, source: ImageSource) -> RecognitionResult<String> {
        let image = source.into_raster()?;
        self.run(image.data).await
    }

    async fn run(&self, data: Vec<u8>) -> RecognitionResult<String> {
        let reply = {
            let mut guard = self
                .worker
                .lock()
                .map_err(|_| RecognitionError::Engine("OCR worker lock poisoned".to_string()))?;
            if guard.is_none() {
                let engine = (self.factory)()?;
                *guard = Some(OcrWorker::spawn(engine, self.options.clone())?);
            }
            match guard.as_ref() {
                Some(worker) => worker.submit(data)?,
                None => return Err(RecognitionError::Engine("OCR worker unavailable".to_string())),
            }
        };
        reply
            .await
            .map_err(|_| RecognitionError::Engine("OCR worker dropped the request".to_string()))?
    }
}

impl Drop for LocalOcrEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[async_trait]
impl RecognitionEngine for LocalOcrEngine {
    fn name(&self) -> &'static str {
        "local"
    }

    fn is_configured(&self) -> bool {
        !self.options.language.trim().is_empty()
    }

    async fn recognize_bitmap(&self, image: &RasterImage) -> RecognitionResult<EngineReply> {
        if !self.is_configured() {
            return Err(RecognitionError::Configuration(
                "Local OCR needs a language (e.g. 'eng')".to_string(),
            ));
        }
        self.run(image.data.clone()).await.map(EngineReply::Text)
    }

    fn apply_settings(&mut self, settings: &Settings) {
        self.reconfigure(settings.ocr_options());
    }
}
