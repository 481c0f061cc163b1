//! Bubble list → surface drawing commands.
//!
//! Walks the bubbles in stacking order and emits fills, strokes, and
//! text runs. Shape paths are regenerated on every pass — they are pure
//! functions of the bubble, so nothing needs caching or invalidation.

use crate::hit::handle_positions;
use crate::surface::{Surface, to_peniko};
use crate::text::draw_bubble_text;
use blurb_core::{Bubble, BubbleId, Error, Part, PathCmd, generate_shape};
use kurbo::{BezPath, Circle, Rect, Shape as _};
use peniko::Color;

const STROKE_WIDTH: f32 = 2.0;
const WHISPER_DASH: [f32; 2] = [6.0, 4.0];
const FLATTEN_TOLERANCE: f64 = 0.1;

/// Selection chrome sizing.
pub const HANDLE_SIZE: f32 = 8.0;
pub const GRIP_RADIUS: f32 = 5.0;

const BUBBLE_FILL: Color = Color::WHITE;
const ACCENT: Color = Color::from_rgb8(0x2d, 0x8c, 0xf0);

/// Paint every bubble, back to front, then the selection chrome.
///
/// Call once per frame against a cleared surface; the caller composites
/// the background image underneath.
pub fn paint_scene(
    surface: &mut impl Surface,
    bubbles: &[Bubble],
    selected: Option<BubbleId>,
) -> Result<(), Error> {
    if !surface.is_ready() {
        return Err(Error::SurfaceUnavailable);
    }

    let mut order: Vec<&Bubble> = bubbles.iter().collect();
    order.sort_by_key(|b| b.z_index);

    for bubble in order {
        paint_bubble(surface, bubble)?;
    }

    if let Some(id) = selected
        && let Some(bubble) = bubbles.iter().find(|b| b.id == id)
    {
        paint_selection(surface, bubble);
    }
    Ok(())
}

fn paint_bubble(surface: &mut impl Surface, bubble: &Bubble) -> Result<(), Error> {
    log::trace!(
        "paint bubble {} {:?} at ({}, {})",
        bubble.id,
        bubble.kind,
        bubble.x,
        bubble.y
    );
    for part in &bubble.parts {
        let supported = (part.is_tail() && bubble.kind.allows_tail())
            || (part.is_dot() && bubble.kind.allows_dots());
        if !supported {
            log::warn!("bubble {}: skipping part unsupported by {:?}", bubble.id, bubble.kind);
        }
    }

    let spec = generate_shape(bubble);
    let border = to_peniko(bubble.border_color);
    let dash: &[f32] = if bubble.kind == blurb_core::BubbleKind::Whisper {
        &WHISPER_DASH
    } else {
        &[]
    };

    if !spec.outline.is_empty() {
        let path = to_bez(&spec.outline, bubble.x, bubble.y);
        surface.fill_path(&path, BUBBLE_FILL);
        surface.stroke_path(&path, border, STROKE_WIDTH, dash);
    }

    for circle in &spec.circles {
        let shape = Circle::new(
            ((bubble.x + circle.cx) as f64, (bubble.y + circle.cy) as f64),
            circle.radius as f64,
        );
        let path = shape.to_path(FLATTEN_TOLERANCE);
        surface.fill_path(&path, BUBBLE_FILL);
        surface.stroke_path(&path, border, STROKE_WIDTH, &[]);
    }

    draw_bubble_text(surface, bubble)
}

/// Translate a bubble-local outline into a canvas-space bezier path.
fn to_bez(commands: &[PathCmd], dx: f32, dy: f32) -> BezPath {
    let (dx, dy) = (dx as f64, dy as f64);
    let mut bez = BezPath::new();
    for cmd in commands {
        match *cmd {
            PathCmd::MoveTo(x, y) => bez.move_to((dx + x as f64, dy + y as f64)),
            PathCmd::LineTo(x, y) => bez.line_to((dx + x as f64, dy + y as f64)),
            PathCmd::QuadTo(cx, cy, ex, ey) => bez.quad_to(
                (dx + cx as f64, dy + cy as f64),
                (dx + ex as f64, dy + ey as f64),
            ),
            PathCmd::Close => bez.close_path(),
        }
    }
    bez
}

// ─── Selection chrome ────────────────────────────────────────────────────

fn paint_selection(surface: &mut impl Surface, bubble: &Bubble) {
    // Dashed bounding box.
    let bounds = Rect::new(
        bubble.x as f64,
        bubble.y as f64,
        (bubble.x + bubble.width) as f64,
        (bubble.y + bubble.height) as f64,
    );
    surface.stroke_path(&bounds.to_path(FLATTEN_TOLERANCE), ACCENT, 1.0, &[4.0, 4.0]);

    for (_, hx, hy) in handle_positions(bubble) {
        let half = (HANDLE_SIZE / 2.0) as f64;
        let rect = Rect::new(
            hx as f64 - half,
            hy as f64 - half,
            hx as f64 + half,
            hy as f64 + half,
        );
        let path = rect.to_path(FLATTEN_TOLERANCE);
        surface.fill_path(&path, Color::WHITE);
        surface.stroke_path(&path, ACCENT, 1.0, &[]);
    }

    // Grips for the movable part anchors.
    for part in &bubble.parts {
        match *part {
            Part::Tail {
                base_cx,
                base_cy,
                tip_x,
                tip_y,
                ..
            } => {
                grip(surface, bubble.x + base_cx, bubble.y + base_cy);
                grip(surface, bubble.x + tip_x, bubble.y + tip_y);
            }
            Part::Dot {
                offset_x, offset_y, ..
            } => grip(surface, bubble.x + offset_x, bubble.y + offset_y),
        }
    }
}

fn grip(surface: &mut impl Surface, cx: f32, cy: f32) {
    let path = Circle::new((cx as f64, cy as f64), GRIP_RADIUS as f64).to_path(FLATTEN_TOLERANCE);
    surface.fill_path(&path, ACCENT);
}
