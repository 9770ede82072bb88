//! Recognition error taxonomy.
//!
//! Every failure in the pipeline resolves to one of these variants so the
//! caller can show a message and carry on. Nothing here is fatal.

use thiserror::Error;

/// Longest backend body kept in a transport error.
pub const MAX_ERROR_BODY_CHARS: usize = 300;

pub type RecognitionResult<T> = Result<T, RecognitionError>;

#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Missing or incomplete credentials. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network failure (`status: None`) or a non-2xx reply.
    #[error("{}", transport_message(.status, .body))]
    Transport { status: Option<u16>, body: String },

    /// The local OCR worker or process failed.
    #[error("OCR engine error: {0}")]
    Engine(String),

    /// The canvas could not be encoded.
    #[error("rasterization failed: {0}")]
    Raster(String),

    /// A data URL or byte buffer could not be decoded as an image.
    #[error("invalid image source: {0}")]
    InvalidImage(String),

    /// The adapter does not offer this capability.
    #[error("{0} is not supported by this engine")]
    Unsupported(&'static str),

    /// Stroke path failed, then the bitmap retry failed too.
    #[error("stroke recognition failed ({stroke}); bitmap fallback failed ({bitmap})")]
    FallbackExhausted {
        stroke: Box<RecognitionError>,
        bitmap: Box<RecognitionError>,
    },
}

fn transport_message(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("recognition service returned {}: {}", code, body),
        None => format!("recognition request failed: {}", body),
    }
}

impl RecognitionError {
    /// Build a transport error for a non-2xx reply, truncating the body.
    pub fn http(status: u16, body: &str) -> Self {
        RecognitionError::Transport {
            status: Some(status),
            body: truncate_body(body),
        }
    }

    /// Build a transport error for a request that never got a reply.
    pub fn network(err: impl std::fmt::Display) -> Self {
        RecognitionError::Transport {
            status: None,
            body: truncate_body(&err.to_string()),
        }
    }

    /// Whether a failed stroke request may be retried through the bitmap path.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            RecognitionError::Configuration(_) | RecognitionError::Unsupported(_)
        )
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RecognitionError::Transport { status, .. } => *status,
            RecognitionError::FallbackExhausted { bitmap, .. } => bitmap.status(),
            _ => None,
        }
    }
}

/// Cut a backend body down to `MAX_ERROR_BODY_CHARS` characters.
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_status_and_body() {
        let err = RecognitionError::http(401, "{\"message\":\"bad key\"}");
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.to_string(),
            "recognition service returned 401: {\"message\":\"bad key\"}"
        );
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY_CHARS + 50);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS + 1);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn configuration_errors_are_not_retryable() {
        assert!(!RecognitionError::Configuration("no key".into()).is_retryable());
        assert!(!RecognitionError::Unsupported("stroke recognition").is_retryable());
        assert!(RecognitionError::network("connection refused").is_retryable());
        assert!(RecognitionError::http(500, "").is_retryable());
    }
}
