//! Cloud ink recognition — batch endpoint over HTTPS.
//!
//! Two request kinds go to the same endpoint:
//! - strokes: JSON ink document, `Content-Type` JIIX (signed) or JSON (key only)
//! - bitmap: raw image bytes with the image's own MIME type
//!
//! Key differences between auth variants live in `RequestSigner`; this
//! module never branches on them beyond the content type.

use super::signing::RequestSigner;
use super::{EngineReply, RecognitionEngine};
use crate::config::{CloudCredentials, Settings, DEFAULT_ENDPOINT};
use crate::error::{RecognitionError, RecognitionResult};
use crate::ink::InkDocument;
use crate::raster::RasterImage;
use async_trait::async_trait;

pub const ACCEPT: &str = "application/vnd.myscript.jiix, text/plain";
pub const JIIX_CONTENT_TYPE: &str = "application/vnd.myscript.jiix; charset=UTF-8";
const JSON_CONTENT_TYPE: &str = "application/json";

pub struct CloudEngine {
    client: reqwest::Client,
    endpoint: String,
    credentials: CloudCredentials,
    signer: RequestSigner,
}

impl CloudEngine {
    pub fn new(credentials: CloudCredentials) -> Self {
        Self::with_endpoint(credentials, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(credentials: CloudCredentials, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            signer: RequestSigner::for_credentials(&credentials),
            credentials,
        }
    }

    /// Swap credentials; the signing strategy follows.
    pub fn set_credentials(&mut self, credentials: CloudCredentials) {
        self.signer = RequestSigner::for_credentials(&credentials);
        self.credentials = credentials;
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    fn require_credentials(&self) -> RecognitionResult<()> {
        if self.credentials.is_complete() {
            Ok(())
        } else {
            Err(RecognitionError::Configuration(
                "Cloud recognition needs an application key. Add it in settings or set MYSCRIPT_APPLICATION_KEY."
                    .to_string(),
            ))
        }
    }

    /// POST a body and turn the reply into an `EngineReply`.
    async fn post(&self, body: Vec<u8>, content_type: &str) -> RecognitionResult<EngineReply> {
        self.require_credentials()?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Accept", ACCEPT)
            .header("Content-Type", content_type);
        for (name, value) in self.signer.headers(&body)? {
            request = request.header(name, value);
        }

        let start = std::time::Instant::now();
        let response = request.body(body).send().await.map_err(|e| {
            log::error!("[CLOUD] HTTP request failed: {}", e);
            RecognitionError::network(e)
        })?;

        let status = response.status();
        let reply_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        let text = response.text().await.map_err(|e| {
            log::error!("[CLOUD] Failed to read reply body: {}", e);
            RecognitionError::network(e)
        })?;

        log::info!(
            "[CLOUD] {} in {}ms ({} bytes, {})",
            status,
            start.elapsed().as_millis(),
            text.len(),
            if reply_type.is_empty() { "no content type" } else { reply_type.as_str() }
        );

        if !status.is_success() {
            log::error!("[CLOUD] Service returned {}: {}", status, text);
            return Err(RecognitionError::http(status.as_u16(), &text));
        }

        Ok(parse_reply(&reply_type, text))
    }
}

/// Plain-text replies pass through; everything else is tried as JSON.
fn parse_reply(content_type: &str, body: String) -> EngineReply {
    if content_type.starts_with("text/plain") {
        return EngineReply::Text(body);
    }
    match serde_json::from_str(&body) {
        Ok(json) => EngineReply::Json(json),
        Err(e) => {
            let preview: String = body.chars().take(100).collect();
            log::warn!("[CLOUD] Reply is not JSON ({}): {}", e, preview);
            EngineReply::Unparsed(body)
        }
    }
}

#[async_trait]
impl RecognitionEngine for CloudEngine {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_complete()
    }

    fn supports_strokes(&self) -> bool {
        true
    }

    async fn recognize_strokes(&self, document: &InkDocument) -> RecognitionResult<EngineReply> {
        let body = serde_json::to_vec(document)
            .map_err(|e| RecognitionError::Engine(format!("Failed to encode ink document: {}", e)))?;
        let content_type = if self.signer.is_signing() {
            JIIX_CONTENT_TYPE
        } else {
            JSON_CONTENT_TYPE
        };
        log::info!(
            "[CLOUD] Sending {} strokes ({} bytes, {:?})",
            document.strokes().count(),
            body.len(),
            self.signer
        );
        self.post(body, content_type).await
    }

    async fn recognize_bitmap(&self, image: &RasterImage) -> RecognitionResult<EngineReply> {
        log::info!(
            "[CLOUD] Sending {}x{} {} ({} bytes, {:?})",
            image.width,
            image.height,
            image.mime_type,
            image.data.len(),
            self.signer
        );
        self.post(image.data.clone(), &image.mime_type).await
    }

    fn apply_settings(&mut self, settings: &Settings) {
        self.set_credentials(settings.cloud_credentials());
        if self.endpoint != settings.endpoint {
            log::info!("[CLOUD] Endpoint changed to {}", settings.endpoint);
            self.endpoint = settings.endpoint.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_replies_pass_through() {
        let reply = parse_reply("text/plain; charset=utf-8", "hello".to_string());
        assert_eq!(reply, EngineReply::Text("hello".to_string()));
    }

    #[test]
    fn jiix_replies_parse_as_json() {
        let reply = parse_reply("application/vnd.myscript.jiix", r#"{"label":"hi"}"#.to_string());
        assert_eq!(reply, EngineReply::Json(serde_json::json!({"label": "hi"})));
    }

    #[test]
    fn garbage_bodies_are_unparsed_not_errors() {
        let reply = parse_reply("", "<html>oops</html>".to_string());
        assert_eq!(reply, EngineReply::Unparsed("<html>oops</html>".to_string()));
    }

    #[test]
    fn unconfigured_engine_reports_so() {
        let engine = CloudEngine::new(CloudCredentials::default());
        assert!(!engine.is_configured());
        assert!(engine.supports_strokes());
        assert_eq!(engine.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn settings_swap_credentials_and_endpoint() {
        let mut engine = CloudEngine::new(CloudCredentials::default());
        let settings = Settings {
            application_key: "app".to_string(),
            hmac_key: "secret".to_string(),
            endpoint: "http://127.0.0.1:9/batch".to_string(),
            ..Settings::default()
        };
        engine.apply_settings(&settings);
        assert!(engine.is_configured());
        assert!(engine.signer().is_signing());
        assert_eq!(engine.endpoint(), "http://127.0.0.1:9/batch");
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let engine = CloudEngine::with_endpoint(CloudCredentials::default(), "http://127.0.0.1:9");
        let doc = crate::ink::serialize(&crate::capture::StrokeSet::new(), "en_US");
        let err = engine.recognize_strokes(&doc).await.unwrap_err();
        assert!(matches!(err, RecognitionError::Configuration(_)));
    }
}
