//! Drawing surface abstraction.
//!
//! The paint pass emits primitive operations against this trait; the
//! application supplies a backend (canvas, GPU scene, SVG writer). A
//! surface doubles as the text-measurement oracle so layout and drawing
//! agree on glyph advances.

use blurb_core::{Error, TextMeasurer, TextStyle};
use kurbo::{BezPath, Point};
use peniko::Color;

/// Backend drawing operations. Coordinates are canvas-space pixels.
pub trait Surface: TextMeasurer {
    /// Whether the backend can accept draw calls right now (a canvas can
    /// lose its context, a swapchain its frame). The paint pass aborts
    /// with `Error::SurfaceUnavailable` when this is false.
    fn is_ready(&self) -> bool {
        true
    }

    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Stroke an outline. An empty `dash` slice means a solid stroke.
    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f32, dash: &[f32]);

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32);

    /// Draw one styled run with its left edge at `x` and the vertical
    /// midpoint of its line box at `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> Result<(), Error>;
}

/// Convert a model color into the backend color space.
pub fn to_peniko(c: blurb_core::Color) -> Color {
    Color::from_rgba8(
        (c.r.clamp(0.0, 1.0) * 255.0).round() as u8,
        (c.g.clamp(0.0, 1.0) * 255.0).round() as u8,
        (c.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        (c.a.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ─── Recording surface ───────────────────────────────────────────────────

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillPath {
        path: BezPath,
        color: Color,
    },
    StrokePath {
        path: BezPath,
        color: Color,
        width: f32,
        dash: Vec<f32>,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        font_size: f32,
    },
}

/// Headless surface that records every operation. Measurement uses a
/// fixed-advance model (`char_width` × font size per character), which
/// keeps layout assertions exact.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    pub char_width: f32,
    /// When set, `fill_text` rejects families outside this list.
    pub known_fonts: Option<Vec<String>>,
    /// Clear to simulate a backend that lost its drawing context.
    pub available: bool,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            char_width: 0.5,
            known_fonts: None,
            available: true,
        }
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded text runs, concatenated in draw order.
    pub fn drawn_text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasurer for RecordingSurface {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        text.chars().count() as f32 * style.font_size * self.char_width
    }
}

impl Surface for RecordingSurface {
    fn is_ready(&self) -> bool {
        self.available
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.ops.push(DrawOp::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f32, dash: &[f32]) {
        self.ops.push(DrawOp::StrokePath {
            path: path.clone(),
            color,
            width,
            dash: dash.to_vec(),
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> Result<(), Error> {
        if let Some(fonts) = &self.known_fonts
            && !fonts.iter().any(|f| f == &style.font_family)
        {
            return Err(Error::FontResolution(style.font_family.clone()));
        }
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font_size: style.font_size,
        });
        Ok(())
    }
}
