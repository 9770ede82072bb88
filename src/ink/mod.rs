//! Stroke serializer — captured strokes to the cloud ink wire format.
//!
//! `serialize` is a pure function: no I/O, no clock, no randomness.
//! Identical input always yields an identical document.

pub mod types;

pub use types::{
    ExportConfiguration, InkConfiguration, InkDocument, JiixExport, StrokeGroup, TextExport,
    WireStroke,
};

use crate::capture::{Stroke, StrokeSet, DEFAULT_PRESSURE};

pub const CONTENT_TYPE_TEXT: &str = "Text";
pub const POINTER_TYPE_PEN: &str = "PEN";
pub const POINTER_ID: u32 = 1;
/// Logical (CSS) pixels are 96 per inch.
pub const LOGICAL_DPI: u32 = 96;

/// Build the request document for a stroke set.
///
/// An empty set yields a valid document with one empty stroke group.
pub fn serialize(strokes: &StrokeSet, language: &str) -> InkDocument {
    let wire: Vec<WireStroke> = strokes
        .strokes()
        .iter()
        .enumerate()
        .map(|(index, stroke)| wire_stroke(index, stroke))
        .collect();

    log::debug!(
        "[INK] Serialized {} strokes ({} points) for {}",
        wire.len(),
        strokes.point_count(),
        language
    );

    InkDocument {
        configuration: InkConfiguration {
            lang: language.to_string(),
            export: ExportConfiguration {
                jiix: JiixExport {
                    bounding_box: false,
                    strokes: true,
                    text: TextExport {
                        chars: true,
                        words: true,
                    },
                },
            },
        },
        content_type: CONTENT_TYPE_TEXT.to_string(),
        x_dpi: LOGICAL_DPI,
        y_dpi: LOGICAL_DPI,
        stroke_groups: vec![StrokeGroup { strokes: wire }],
    }
}

fn wire_stroke(index: usize, stroke: &Stroke) -> WireStroke {
    let points = stroke.points();
    let pressure = stroke.first().p.map(|_| {
        points
            .iter()
            .map(|p| p.p.unwrap_or(DEFAULT_PRESSURE))
            .collect()
    });

    WireStroke {
        id: format!("stroke-{}", index),
        pointer_type: POINTER_TYPE_PEN.to_string(),
        pointer_id: POINTER_ID,
        x: points.iter().map(|p| p.x.round() as i64).collect(),
        y: points.iter().map(|p| p.y.round() as i64).collect(),
        t: points.iter().map(|p| p.t).collect(),
        p: pressure,
    }
}
