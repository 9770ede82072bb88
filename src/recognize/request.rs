//! Recognition requests and the per-request state machine.

use crate::config::EngineKind;
use crate::ink::InkDocument;
use crate::raster::RasterImage;

/// What gets sent: vector ink or a bitmap.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    Strokes(InkDocument),
    Raster(RasterImage),
}

impl RequestPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            RequestPayload::Strokes(_) => "strokes",
            RequestPayload::Raster(_) => "bitmap",
        }
    }
}

/// One request to one engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionRequest {
    pub engine: EngineKind,
    pub language: String,
    pub payload: RequestPayload,
}

impl RecognitionRequest {
    pub fn strokes(engine: EngineKind, document: InkDocument) -> Self {
        Self {
            engine,
            language: document.language().to_string(),
            payload: RequestPayload::Strokes(document),
        }
    }

    pub fn raster(engine: EngineKind, language: &str, image: RasterImage) -> Self {
        Self {
            engine,
            language: language.to_string(),
            payload: RequestPayload::Raster(image),
        }
    }
}

/// Lifecycle of a single request. Not shared between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionState {
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

impl RecognitionState {
    /// Advance on an event; illegal transitions leave the state unchanged.
    pub fn next(self, outcome: Option<bool>) -> Self {
        match (self, outcome) {
            (RecognitionState::Idle, None) => RecognitionState::Requesting,
            (RecognitionState::Requesting, Some(true)) => RecognitionState::Succeeded,
            (RecognitionState::Requesting, Some(false)) => RecognitionState::Failed,
            (state, _) => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RecognitionState::Succeeded | RecognitionState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_only_moves_forward() {
        let s = RecognitionState::Idle;
        assert_eq!(s.next(Some(true)), RecognitionState::Idle);
        let s = s.next(None);
        assert_eq!(s, RecognitionState::Requesting);
        assert_eq!(s.next(None), RecognitionState::Requesting);
        let done = s.next(Some(false));
        assert_eq!(done, RecognitionState::Failed);
        assert!(done.is_terminal());
        assert_eq!(done.next(Some(true)), RecognitionState::Failed);
    }
}
