//! Unified pointer events. Mouse, touch and pen share one model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Touch,
    #[default]
    Pen,
}

/// A single pointer sample as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub pointer_id: i64,
    #[serde(default)]
    pub kind: PointerKind,
    pub client_x: f64,
    pub client_y: f64,
    /// Raw device pressure; `None` when the device has no pressure sensor.
    #[serde(default)]
    pub pressure: Option<f64>,
    /// Host event timestamp in milliseconds.
    pub timestamp_ms: f64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, client_x: f64, client_y: f64, timestamp_ms: f64) -> Self {
        Self {
            phase,
            pointer_id: 1,
            kind: PointerKind::Pen,
            client_x,
            client_y,
            pressure: None,
            timestamp_ms,
        }
    }

    pub fn down(client_x: f64, client_y: f64, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Down, client_x, client_y, timestamp_ms)
    }

    pub fn moved(client_x: f64, client_y: f64, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Move, client_x, client_y, timestamp_ms)
    }

    pub fn up(client_x: f64, client_y: f64, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Up, client_x, client_y, timestamp_ms)
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_pointer(mut self, pointer_id: i64, kind: PointerKind) -> Self {
        self.pointer_id = pointer_id;
        self.kind = kind;
        self
    }

    /// Up, cancel and out all end the stroke.
    pub fn ends_stroke(&self) -> bool {
        matches!(
            self.phase,
            PointerPhase::Up | PointerPhase::Cancel | PointerPhase::Out
        )
    }
}
