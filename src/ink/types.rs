//! Ink wire types for the cloud batch endpoint.
//!
//! These serialize directly into the request body. Field names follow the
//! service's JSON, hence the renames.

use serde::{Deserialize, Serialize};

/// Top-level stroke-recognition request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkDocument {
    pub configuration: InkConfiguration,
    pub content_type: String,
    #[serde(rename = "xDPI")]
    pub x_dpi: u32,
    #[serde(rename = "yDPI")]
    pub y_dpi: u32,
    pub stroke_groups: Vec<StrokeGroup>,
}

impl InkDocument {
    /// Every stroke record across all groups, in order.
    pub fn strokes(&self) -> impl Iterator<Item = &WireStroke> {
        self.stroke_groups.iter().flat_map(|g| g.strokes.iter())
    }

    pub fn language(&self) -> &str {
        &self.configuration.lang
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkConfiguration {
    pub lang: String,
    pub export: ExportConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfiguration {
    pub jiix: JiixExport,
}

/// Facets the service should include in its JIIX reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiixExport {
    #[serde(rename = "bounding-box")]
    pub bounding_box: bool,
    pub strokes: bool,
    pub text: TextExport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextExport {
    pub chars: bool,
    pub words: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeGroup {
    pub strokes: Vec<WireStroke>,
}

/// One stroke as the service expects it: parallel coordinate arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStroke {
    pub id: String,
    pub pointer_type: String,
    pub pointer_id: u32,
    pub x: Vec<i64>,
    pub y: Vec<i64>,
    pub t: Vec<u64>,
    /// Present only when the stroke's first point carried pressure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<Vec<f64>>,
}
