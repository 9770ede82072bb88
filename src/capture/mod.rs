//! Stroke capture domain — public API.
//!
//! Turns the host's pointer-event stream into structured strokes and
//! live ink on a `CanvasSurface`. External code should only use the
//! types re-exported here.

mod pointer;
mod session;
mod stroke;

pub use pointer::{PointerEvent, PointerKind, PointerPhase};
pub use session::{CaptureOutcome, RecognitionInput, StrokeCapture};
pub use stroke::{normalize_pressure, Stroke, StrokePoint, StrokeSet, DEFAULT_PRESSURE};

/// Running pressure statistics for the current session. Diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressureStats {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl PressureStats {
    pub fn record(&mut self, pressure: f64) {
        self.count += 1;
        self.sum += pressure;
        self.min = Some(self.min.map_or(pressure, |m| m.min(pressure)));
        self.max = Some(self.max.map_or(pressure, |m| m.max(pressure)));
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
