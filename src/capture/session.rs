//! Stroke capture state machine.
//!
//! `StrokeCapture` consumes pointer events one at a time and owns the only
//! mutable capture state: `Idle`, or `Capturing` with the in-progress
//! stroke buffer. Rendering onto the surface is feedback for the user;
//! recognition reads the structured `StrokeSet`, never the pixels.

use super::pointer::{PointerEvent, PointerPhase};
use super::stroke::{normalize_pressure, Stroke, StrokePoint, StrokeSet};
use super::PressureStats;
use crate::surface::CanvasSurface;

#[derive(Debug, Clone)]
enum CaptureState {
    Idle,
    Capturing {
        pointer_id: i64,
        stroke: Stroke,
        started_at_ms: f64,
        last: (f64, f64),
    },
}

/// What a pointer event did to the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Ignored,
    Started,
    Extended,
    /// The stroke was sealed; carries its index in the `StrokeSet`.
    Sealed(usize),
}

/// Borrowed view of a capture session handed to the recognizer.
#[derive(Debug, Clone, Copy)]
pub struct RecognitionInput<'a> {
    pub strokes: &'a StrokeSet,
    pub surface: &'a CanvasSurface,
}

#[derive(Debug, Clone)]
pub struct StrokeCapture {
    surface: CanvasSurface,
    strokes: StrokeSet,
    state: CaptureState,
    pressure: PressureStats,
    record_pressure: bool,
}

impl StrokeCapture {
    pub fn new(surface: CanvasSurface) -> Self {
        Self {
            surface,
            strokes: StrokeSet::new(),
            state: CaptureState::Idle,
            pressure: PressureStats::default(),
            record_pressure: true,
        }
    }

    /// Whether points carry a pressure value. On by default.
    pub fn with_pressure_recording(mut self, record: bool) -> Self {
        self.record_pressure = record;
        self
    }

    /// Change pressure recording for strokes started from now on.
    pub fn set_pressure_recording(&mut self, record: bool) {
        self.record_pressure = record;
    }

    pub fn handle(&mut self, event: &PointerEvent) -> CaptureOutcome {
        match event.phase {
            PointerPhase::Down => self.pointer_down(event),
            PointerPhase::Move => self.pointer_move(event),
            PointerPhase::Up | PointerPhase::Cancel | PointerPhase::Out => self.pointer_end(event),
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent) -> CaptureOutcome {
        if let CaptureState::Capturing { pointer_id, .. } = self.state {
            log::debug!(
                "[CAPTURE] Ignoring pointer {} down while pointer {} is drawing",
                event.pointer_id,
                pointer_id
            );
            return CaptureOutcome::Ignored;
        }

        let (x, y) = self.surface.to_local(event.client_x, event.client_y);
        let pressure = normalize_pressure(event.pressure);
        self.pressure.record(pressure);

        let width = self.surface.style().line_width;
        self.surface.draw_dot((x, y), width);

        self.state = CaptureState::Capturing {
            pointer_id: event.pointer_id,
            stroke: Stroke::begin(StrokePoint::new(x, y, 0, self.pressure_field(pressure))),
            started_at_ms: event.timestamp_ms,
            last: (x, y),
        };
        CaptureOutcome::Started
    }

    fn pointer_move(&mut self, event: &PointerEvent) -> CaptureOutcome {
        let record_pressure = self.record_pressure;
        let CaptureState::Capturing {
            pointer_id,
            stroke,
            started_at_ms,
            last,
        } = &mut self.state
        else {
            return CaptureOutcome::Ignored;
        };
        if *pointer_id != event.pointer_id {
            return CaptureOutcome::Ignored;
        }

        let (x, y) = self.surface.to_local(event.client_x, event.client_y);
        let pressure = normalize_pressure(event.pressure);
        self.pressure.record(pressure);

        let width = self.surface.style().line_width * (0.5 + pressure);
        let elapsed = (event.timestamp_ms - *started_at_ms).max(0.0).round() as u64;
        stroke.push(StrokePoint::new(
            x,
            y,
            elapsed,
            record_pressure.then_some(pressure),
        ));

        self.surface.draw_segment(*last, (x, y), width);
        *last = (x, y);
        CaptureOutcome::Extended
    }

    fn pointer_end(&mut self, event: &PointerEvent) -> CaptureOutcome {
        match &self.state {
            CaptureState::Capturing { pointer_id, .. } if *pointer_id == event.pointer_id => {}
            _ => return CaptureOutcome::Ignored,
        }

        let CaptureState::Capturing { stroke, .. } =
            std::mem::replace(&mut self.state, CaptureState::Idle)
        else {
            return CaptureOutcome::Ignored;
        };

        let index = self.strokes.len();
        log::debug!(
            "[CAPTURE] Stroke {} sealed ({:?}): {} points over {}ms",
            index,
            event.phase,
            stroke.len(),
            stroke.last().t
        );
        self.strokes.push(stroke);
        CaptureOutcome::Sealed(index)
    }

    fn pressure_field(&self, pressure: f64) -> Option<f64> {
        self.record_pressure.then_some(pressure)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing { .. })
    }

    /// The stroke being drawn right now, if any.
    pub fn current_stroke(&self) -> Option<&Stroke> {
        match &self.state {
            CaptureState::Capturing { stroke, .. } => Some(stroke),
            CaptureState::Idle => None,
        }
    }

    pub fn strokes(&self) -> &StrokeSet {
        &self.strokes
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut CanvasSurface {
        &mut self.surface
    }

    pub fn pressure_stats(&self) -> &PressureStats {
        &self.pressure
    }

    /// Resize the surface. Stroke data is in logical space and is untouched.
    pub fn resize(&mut self, logical_width: f64, logical_height: f64, device_pixel_ratio: f64) {
        self.surface
            .resize(logical_width, logical_height, device_pixel_ratio);
    }

    /// Drop all strokes, any stroke in progress, pressure samples and ink.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.state = CaptureState::Idle;
        self.pressure = PressureStats::default();
        self.surface.clear();
        log::debug!("[CAPTURE] Cleared");
    }

    /// Immutable snapshot for a recognition call.
    pub fn input(&self) -> RecognitionInput<'_> {
        RecognitionInput {
            strokes: &self.strokes,
            surface: &self.surface,
        }
    }
}
