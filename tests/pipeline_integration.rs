//! Capture → serialize → rasterize, end to end and without I/O.

use ink_ocr_lib::capture::{PointerEvent, StrokeCapture};
use ink_ocr_lib::config::Settings;
use ink_ocr_lib::{ink, raster, CanvasSurface};

fn write_two_strokes(capture: &mut StrokeCapture) {
    capture.handle(&PointerEvent::down(10.7, 20.3, 500.0).with_pressure(0.3));
    capture.handle(&PointerEvent::moved(15.2, 25.8, 510.0).with_pressure(0.8));
    capture.handle(&PointerEvent::up(15.2, 25.8, 512.0));

    capture.handle(&PointerEvent::down(40.0, 20.0, 900.0));
    capture.handle(&PointerEvent::moved(60.0, 22.0, 925.5));
    capture.handle(&PointerEvent::up(60.0, 22.0, 930.0));
}

#[test]
fn captured_strokes_serialize_to_rounded_wire_records() {
    let mut capture = StrokeCapture::new(CanvasSurface::new(100.0, 60.0, 2.0));
    write_two_strokes(&mut capture);

    let doc = ink::serialize(capture.strokes(), "fr_FR");
    let strokes: Vec<_> = doc.strokes().collect();
    assert_eq!(strokes.len(), 2);
    assert_eq!(doc.language(), "fr_FR");

    assert_eq!(strokes[0].x, vec![11, 15]);
    assert_eq!(strokes[0].y, vec![20, 26]);
    assert_eq!(strokes[0].t, vec![0, 10]);
    assert_eq!(strokes[0].p, Some(vec![0.3, 0.8]));

    // No device pressure: the capture still records the 0.5 default.
    assert_eq!(strokes[1].t, vec![0, 26]);
    assert_eq!(strokes[1].p, Some(vec![0.5, 0.5]));
    assert_eq!(ink::serialize(capture.strokes(), "fr_FR"), doc);
}

#[test]
fn pressure_free_capture_omits_pressure_arrays() {
    let mut capture =
        StrokeCapture::new(CanvasSurface::new(100.0, 60.0, 1.0)).with_pressure_recording(false);
    write_two_strokes(&mut capture);

    let json = serde_json::to_value(ink::serialize(capture.strokes(), "en_US")).unwrap();
    for stroke in json["strokeGroups"][0]["strokes"].as_array().unwrap() {
        assert!(stroke.get("p").is_none());
    }
}

#[test]
fn captured_ink_rasterizes_to_black_on_white() {
    let settings = Settings::default();
    let mut capture = StrokeCapture::new(CanvasSurface::new(100.0, 60.0, 2.0));
    write_two_strokes(&mut capture);

    let buffer = raster::compose(capture.surface(), &settings.raster_options()).unwrap();
    let pad = settings.padding * 2;
    assert_eq!(buffer.dimensions(), (200 + 2 * pad, 120 + 2 * pad));

    let black = buffer.pixels().filter(|p| p.0 == [0, 0, 0, 255]).count();
    let white = buffer.pixels().filter(|p| p.0 == [255, 255, 255, 255]).count();
    assert!(black > 0);
    assert_eq!(black + white, buffer.pixels().count());
    // Second stroke passes through (50, 21) logical → backing (100, 42).
    assert_eq!(buffer.get_pixel(100 + pad, 42 + pad).0, [0, 0, 0, 255]);
}
