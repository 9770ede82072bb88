//! Ink OCR — handwriting capture and recognition.
//!
//! This is the crate root that wires the domains together. No business
//! logic lives here, only module declarations and the public surface.
//!
//! Pipeline:
//!   - capture    — pointer events → strokes + live ink on a surface
//!   - surface    — device-pixel canvas the ink is drawn on
//!   - raster     — surface → padded, binarized PNG
//!   - ink        — strokes → cloud ink document
//!   - engine     — cloud and local recognition backends
//!   - recognize  — engine dispatch, bitmap fallback, reply normalization
//!   - config     — settings file, `.env` loading, credential precedence

pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod ink;
pub mod raster;
pub mod recognize;
pub mod surface;

pub use capture::{PointerEvent, RecognitionInput, Stroke, StrokeCapture, StrokePoint, StrokeSet};
pub use config::{EngineKind, Settings};
pub use error::{RecognitionError, RecognitionResult};
pub use raster::{RasterImage, RasterOptions};
pub use recognize::{RecognizeOptions, Recognizer};
pub use surface::CanvasSurface;
