//! Recognition façade: engine dispatch, bitmap fallback, reply normalization.
//!
//! One `recognize` call is one independent request:
//! capture snapshot → (serialize | rasterize) → engine → normalize → text.
//!
//! Policy:
//! - Nothing drawn → `""` without touching an engine.
//! - Local engine → always the bitmap path; strokes are ignored.
//! - Cloud engine → strokes when there are any, else the bitmap path.
//!   A failed stroke request is retried once as a bitmap when fallback is
//!   enabled and the error is not a configuration problem.
//!
//! Signing and transport belong to the engines; this module only sees
//! `RecognitionEngine`.

mod normalize;
mod request;

pub use normalize::{extract_text, normalize_reply, REPLY_EXTRACTORS};
pub use request::{RecognitionRequest, RecognitionState, RequestPayload};

use crate::capture::RecognitionInput;
use crate::config::{EngineKind, Settings, APPLICATION_KEY_ENV};
use crate::engine::{CloudEngine, EngineReply, LocalOcrEngine, RecognitionEngine};
use crate::error::{RecognitionError, RecognitionResult};
use crate::ink;
use crate::raster::{self, RasterOptions};
use crate::surface::CanvasSurface;

/// Per-call knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizeOptions {
    /// Cloud locale, e.g. `en_US`.
    pub language: String,
    pub fallback_to_bitmap: bool,
    pub raster: RasterOptions,
}

impl Default for RecognizeOptions {
    fn default() -> Self {
        Self {
            language: "en_US".to_string(),
            fallback_to_bitmap: true,
            raster: RasterOptions::default(),
        }
    }
}

pub struct Recognizer {
    cloud: Box<dyn RecognitionEngine>,
    local: Box<dyn RecognitionEngine>,
    default_engine: EngineKind,
}

impl Recognizer {
    pub fn new(
        cloud: Box<dyn RecognitionEngine>,
        local: Box<dyn RecognitionEngine>,
        default_engine: EngineKind,
    ) -> Self {
        Self {
            cloud,
            local,
            default_engine,
        }
    }

    /// Build both engines from persisted settings and the environment.
    pub fn from_settings(settings: &Settings) -> Self {
        let cloud = CloudEngine::with_endpoint(settings.cloud_credentials(), settings.endpoint.clone());
        let local = LocalOcrEngine::tesseract(settings.ocr_options());
        Self::new(Box::new(cloud), Box::new(local), settings.resolve_engine())
    }

    /// Push changed settings into both engines and re-resolve the default.
    ///
    /// A changed OCR language or layout disposes the local worker here, so
    /// the old OCR instance is gone before the next recognition starts.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.cloud.apply_settings(settings);
        self.local.apply_settings(settings);
        self.default_engine = settings.resolve_engine();
        log::info!("[RECOGNIZE] Settings applied (default engine: {})", self.default_engine);
    }

    pub fn default_engine(&self) -> EngineKind {
        self.default_engine
    }

    pub fn engine(&self, kind: EngineKind) -> &dyn RecognitionEngine {
        match kind {
            EngineKind::Cloud => self.cloud.as_ref(),
            EngineKind::Local => self.local.as_ref(),
        }
    }

    /// Whether the default engine holds everything it needs.
    pub fn is_configured(&self) -> bool {
        self.is_engine_configured(self.default_engine)
    }

    pub fn is_engine_configured(&self, kind: EngineKind) -> bool {
        self.engine(kind).is_configured()
    }

    /// Recognize with the default engine.
    pub async fn recognize_default(
        &self,
        input: RecognitionInput<'_>,
        options: &RecognizeOptions,
    ) -> RecognitionResult<String> {
        self.recognize(input, self.default_engine, options).await
    }

    /// Recognize the captured ink with the selected engine.
    pub async fn recognize(
        &self,
        input: RecognitionInput<'_>,
        selection: EngineKind,
        options: &RecognizeOptions,
    ) -> RecognitionResult<String> {
        if input.strokes.is_empty() && !input.surface.has_ink() {
            log::info!("[RECOGNIZE] Nothing drawn — skipping {} engine", selection);
            return Ok(String::new());
        }

        let start = std::time::Instant::now();
        let mut state = RecognitionState::Idle.next(None);
        log::info!(
            "[RECOGNIZE] {:?} via {} ({} strokes, {} points)",
            state,
            selection,
            input.strokes.len(),
            input.strokes.point_count()
        );

        let result = match selection {
            EngineKind::Local => self.recognize_local(input.surface, options).await,
            EngineKind::Cloud => self.recognize_cloud(input, options).await,
        };

        state = state.next(Some(result.is_ok()));
        let elapsed = start.elapsed().as_millis();
        match result {
            Ok(reply) => {
                let text = normalize_reply(reply);
                log::info!(
                    "[RECOGNIZE] {:?}: {} chars in {}ms",
                    state,
                    text.chars().count(),
                    elapsed
                );
                Ok(text)
            }
            Err(e) => {
                log::error!("[RECOGNIZE] {:?} after {}ms: {}", state, elapsed, e);
                Err(e)
            }
        }
    }

    async fn recognize_local(
        &self,
        surface: &CanvasSurface,
        options: &RecognizeOptions,
    ) -> RecognitionResult<EngineReply> {
        let request = rasterize(EngineKind::Local, surface, options)?;
        dispatch(self.local.as_ref(), &request).await
    }

    async fn recognize_cloud(
        &self,
        input: RecognitionInput<'_>,
        options: &RecognizeOptions,
    ) -> RecognitionResult<EngineReply> {
        let engine = self.cloud.as_ref();
        if !engine.is_configured() {
            return Err(RecognitionError::Configuration(format!(
                "Cloud recognition needs an application key. Add one in settings or set {}.",
                APPLICATION_KEY_ENV
            )));
        }

        if input.strokes.is_empty() || !engine.supports_strokes() {
            let request = rasterize(EngineKind::Cloud, input.surface, options)?;
            return dispatch(engine, &request).await;
        }

        let document = ink::serialize(input.strokes, &options.language);
        let request = RecognitionRequest::strokes(EngineKind::Cloud, document);
        let stroke_error = match dispatch(engine, &request).await {
            Ok(reply) => return Ok(reply),
            Err(e) => e,
        };

        if !options.fallback_to_bitmap || !stroke_error.is_retryable() {
            return Err(stroke_error);
        }

        log::warn!(
            "[RECOGNIZE] Stroke request failed ({}) — retrying as bitmap",
            stroke_error
        );
        let retry = match rasterize(EngineKind::Cloud, input.surface, options) {
            Ok(request) => dispatch(engine, &request).await,
            Err(e) => Err(e),
        };
        retry.map_err(|bitmap_error| RecognitionError::FallbackExhausted {
            stroke: Box::new(stroke_error),
            bitmap: Box::new(bitmap_error),
        })
    }
}

fn rasterize(
    engine: EngineKind,
    surface: &CanvasSurface,
    options: &RecognizeOptions,
) -> RecognitionResult<RecognitionRequest> {
    let image = raster::render(surface, &options.raster)?;
    if image.is_empty() {
        return Err(RecognitionError::Raster(
            "Canvas produced no image data".to_string(),
        ));
    }
    Ok(RecognitionRequest::raster(engine, &options.language, image))
}

async fn dispatch(
    engine: &dyn RecognitionEngine,
    request: &RecognitionRequest,
) -> RecognitionResult<EngineReply> {
    log::debug!(
        "[RECOGNIZE] Sending {} to {} (lang={})",
        request.payload.kind(),
        engine.name(),
        request.language
    );
    match &request.payload {
        RequestPayload::Strokes(document) => engine.recognize_strokes(document).await,
        RequestPayload::Raster(image) => engine.recognize_bitmap(image).await,
    }
}
