//! Recognizer policy tests with scripted engines.
//!
//! Each double replays queued results and records which path was called,
//! so dispatch, fallback and normalization can be checked without I/O.

use async_trait::async_trait;
use ink_ocr_lib::capture::{PointerEvent, StrokeCapture};
use ink_ocr_lib::engine::{EngineReply, RecognitionEngine};
use ink_ocr_lib::ink::InkDocument;
use ink_ocr_lib::raster::RasterImage;
use ink_ocr_lib::{CanvasSurface, EngineKind, RecognitionError, RecognitionResult, RecognizeOptions, Recognizer};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Calls = Arc<Mutex<Vec<&'static str>>>;

struct Scripted {
    name: &'static str,
    configured: bool,
    strokes: bool,
    replies: Mutex<VecDeque<RecognitionResult<EngineReply>>>,
    calls: Calls,
}

impl Scripted {
    fn new(name: &'static str, calls: &Calls) -> Self {
        Self {
            name,
            configured: true,
            strokes: true,
            replies: Mutex::new(VecDeque::new()),
            calls: calls.clone(),
        }
    }

    fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    fn bitmap_only(mut self) -> Self {
        self.strokes = false;
        self
    }

    fn then(self, reply: RecognitionResult<EngineReply>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    fn next(&self, path: &'static str) -> RecognitionResult<EngineReply> {
        self.calls.lock().unwrap().push(path);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RecognitionError::Engine("no scripted reply".to_string())))
    }
}

#[async_trait]
impl RecognitionEngine for Scripted {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn supports_strokes(&self) -> bool {
        self.strokes
    }

    async fn recognize_strokes(&self, document: &InkDocument) -> RecognitionResult<EngineReply> {
        assert!(document.strokes().next().is_some());
        self.next(if self.name == "cloud" { "cloud:strokes" } else { "local:strokes" })
    }

    async fn recognize_bitmap(&self, image: &RasterImage) -> RecognitionResult<EngineReply> {
        assert_eq!(image.mime_type, "image/png");
        assert!(!image.is_empty());
        self.next(if self.name == "cloud" { "cloud:bitmap" } else { "local:bitmap" })
    }
}

fn recognizer(cloud: Scripted, local: Scripted) -> Recognizer {
    Recognizer::new(Box::new(cloud), Box::new(local), EngineKind::Cloud)
}

/// A short diagonal stroke, captured the way a host would feed it.
fn drawn() -> StrokeCapture {
    let mut capture = StrokeCapture::new(CanvasSurface::new(120.0, 80.0, 1.0));
    capture.handle(&PointerEvent::down(10.0, 10.0, 0.0).with_pressure(0.4));
    capture.handle(&PointerEvent::moved(40.0, 30.0, 16.0).with_pressure(0.6));
    capture.handle(&PointerEvent::moved(70.0, 50.0, 32.0).with_pressure(0.6));
    capture.handle(&PointerEvent::up(70.0, 50.0, 40.0));
    capture
}

fn json_reply(value: serde_json::Value) -> RecognitionResult<EngineReply> {
    Ok(EngineReply::Json(value))
}

fn http_500() -> RecognitionError {
    RecognitionError::http(500, "upstream exploded")
}

async fn recognize_cloud(recognizer: &Recognizer, capture: &StrokeCapture) -> RecognitionResult<String> {
    recognizer
        .recognize(capture.input(), EngineKind::Cloud, &RecognizeOptions::default())
        .await
}

#[tokio::test]
async fn normalizes_every_known_reply_shape() {
    let cases = [
        (json!({"text": {"label": "hello"}}), "hello"),
        (json!({"result": {"textLines": [{"label": "a"}, {"label": "b"}]}}), "a\nb"),
        (json!({"words": [{"label": "x"}, {"label": "y"}]}), "x y"),
        (json!({"label": "top"}), "top"),
        (json!({"foo": 1}), ""),
    ];
    let capture = drawn();

    for (reply, expected) in cases {
        let calls = Calls::default();
        let r = recognizer(
            Scripted::new("cloud", &calls).then(json_reply(reply)),
            Scripted::new("local", &calls),
        );
        assert_eq!(recognize_cloud(&r, &capture).await.unwrap(), expected);
        assert_eq!(*calls.lock().unwrap(), vec!["cloud:strokes"]);
    }
}

#[tokio::test]
async fn stroke_failure_falls_back_to_bitmap() {
    let calls = Calls::default();
    let r = recognizer(
        Scripted::new("cloud", &calls)
            .then(Err(http_500()))
            .then(json_reply(json!({"label": "from bitmap"}))),
        Scripted::new("local", &calls),
    );

    let text = recognize_cloud(&r, &drawn()).await.unwrap();
    assert_eq!(text, "from bitmap");
    assert_eq!(*calls.lock().unwrap(), vec!["cloud:strokes", "cloud:bitmap"]);
}

#[tokio::test]
async fn disabled_fallback_surfaces_stroke_error() {
    let calls = Calls::default();
    let r = recognizer(
        Scripted::new("cloud", &calls).then(Err(http_500())),
        Scripted::new("local", &calls),
    );
    let options = RecognizeOptions {
        fallback_to_bitmap: false,
        ..RecognizeOptions::default()
    };

    let err = r
        .recognize(drawn().input(), EngineKind::Cloud, &options)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("upstream exploded"));
    assert_eq!(*calls.lock().unwrap(), vec!["cloud:strokes"]);
}

#[tokio::test]
async fn double_failure_keeps_both_errors() {
    let calls = Calls::default();
    let r = recognizer(
        Scripted::new("cloud", &calls)
            .then(Err(http_500()))
            .then(Err(RecognitionError::http(413, "too large"))),
        Scripted::new("local", &calls),
    );

    match recognize_cloud(&r, &drawn()).await {
        Err(RecognitionError::FallbackExhausted { stroke, bitmap }) => {
            assert_eq!(stroke.status(), Some(500));
            assert_eq!(bitmap.status(), Some(413));
        }
        other => panic!("expected FallbackExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn configuration_errors_are_not_retried() {
    let calls = Calls::default();
    let r = recognizer(
        Scripted::new("cloud", &calls)
            .then(Err(RecognitionError::Configuration("key revoked".to_string()))),
        Scripted::new("local", &calls),
    );

    let err = recognize_cloud(&r, &drawn()).await.unwrap_err();
    assert!(matches!(err, RecognitionError::Configuration(_)));
    assert_eq!(*calls.lock().unwrap(), vec!["cloud:strokes"]);
}

#[tokio::test]
async fn unconfigured_cloud_fails_before_any_request() {
    let calls = Calls::default();
    let r = recognizer(
        Scripted::new("cloud", &calls).unconfigured(),
        Scripted::new("local", &calls),
    );
    assert!(!r.is_configured());

    let err = recognize_cloud(&r, &drawn()).await.unwrap_err();
    assert!(matches!(err, RecognitionError::Configuration(_)));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_input_makes_no_calls() {
    let calls = Calls::default();
    let r = recognizer(Scripted::new("cloud", &calls), Scripted::new("local", &calls));
    let capture = StrokeCapture::new(CanvasSurface::new(100.0, 100.0, 2.0));

    for engine in [EngineKind::Cloud, EngineKind::Local] {
        let text = r
            .recognize(capture.input(), engine, &RecognizeOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "");
    }
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn ink_without_strokes_uses_bitmap_path() {
    let calls = Calls::default();
    let r = recognizer(
        Scripted::new("cloud", &calls).then(Ok(EngineReply::Text("painted".to_string()))),
        Scripted::new("local", &calls),
    );
    let mut capture = StrokeCapture::new(CanvasSurface::new(60.0, 60.0, 1.0));
    capture.surface_mut().draw_segment((5.0, 5.0), (50.0, 50.0), 4.0);

    assert_eq!(recognize_cloud(&r, &capture).await.unwrap(), "painted");
    assert_eq!(*calls.lock().unwrap(), vec!["cloud:bitmap"]);
}

#[tokio::test]
async fn bitmap_only_cloud_skips_strokes() {
    let calls = Calls::default();
    let r = recognizer(
        Scripted::new("cloud", &calls)
            .bitmap_only()
            .then(json_reply(json!({"text": {"label": "ok"}}))),
        Scripted::new("local", &calls),
    );

    assert_eq!(recognize_cloud(&r, &drawn()).await.unwrap(), "ok");
    assert_eq!(*calls.lock().unwrap(), vec!["cloud:bitmap"]);
}

#[tokio::test]
async fn local_engine_always_gets_a_bitmap() {
    let calls = Calls::default();
    let r = recognizer(
        Scripted::new("cloud", &calls).unconfigured(),
        Scripted::new("local", &calls).then(Ok(EngineReply::Text("hand".to_string()))),
    );

    let text = r
        .recognize(drawn().input(), EngineKind::Local, &RecognizeOptions::default())
        .await
        .unwrap();
    assert_eq!(text, "hand");
    assert_eq!(*calls.lock().unwrap(), vec!["local:bitmap"]);
}

#[tokio::test]
async fn default_engine_follows_construction() {
    let calls = Calls::default();
    let r = Recognizer::new(
        Box::new(Scripted::new("cloud", &calls)),
        Box::new(Scripted::new("local", &calls).then(Ok(EngineReply::Text("l".to_string())))),
        EngineKind::Local,
    );

    let text = r
        .recognize_default(drawn().input(), &RecognizeOptions::default())
        .await
        .unwrap();
    assert_eq!(text, "l");
    assert_eq!(*calls.lock().unwrap(), vec!["local:bitmap"]);
}
