//! Text drawing: wrapped lines → centered surface runs.
//!
//! Layout itself lives in the core crate; this module positions the
//! resulting lines inside the bubble's safe zone and emits the runs plus
//! underline/strikethrough decorations.

use crate::surface::{Surface, to_peniko};
use blurb_core::{Bubble, Error, TextStyle, compute_safe_zone, markup, text, text_extent};
use kurbo::Point;

/// Vertical offset of the underline below the line midpoint, as a
/// fraction of the font size.
const UNDERLINE_DROP: f32 = 0.45;

/// Wrap and draw a bubble's markup text, centered in its safe zone.
pub fn draw_bubble_text(surface: &mut impl Surface, bubble: &Bubble) -> Result<(), Error> {
    if bubble.text.is_empty() {
        return Ok(());
    }

    let doc = markup::parse_or_plain(&bubble.text);
    let style = TextStyle::new(&bubble.font_family, bubble.font_size, bubble.text_color);
    let zone = compute_safe_zone(bubble);
    let extent = text_extent(bubble);

    // First pass measures the block so it can be vertically centered;
    // the second re-wraps at the final rows (the per-row extent can
    // differ between the two positions).
    let probe = text::layout_text(&doc, &style, zone.width, Some(&extent), zone.y_offset, surface);
    let slack = zone.height - text::block_height(&probe);
    let start_y = zone.y_offset + (slack / 2.0).max(0.0);
    let lines = text::layout_text(&doc, &style, zone.width, Some(&extent), start_y, surface);

    let mut cursor_y = bubble.y + start_y;
    for line in &lines {
        let mid_y = cursor_y + line.height / 2.0;
        let mut x = bubble.x + (bubble.width - line.width) / 2.0;
        x = x.max(bubble.x + zone.x_offset);

        for seg in &line.segments {
            surface.fill_text(&seg.text, x, mid_y, &seg.style)?;
            decorate(surface, seg, x, mid_y);
            x += seg.width;
        }
        cursor_y += line.height;
    }
    Ok(())
}

/// Underline / strikethrough for one run.
fn decorate(surface: &mut impl Surface, seg: &blurb_core::TextSegment, x: f32, mid_y: f32) {
    if !seg.style.underline && !seg.style.strikethrough {
        return;
    }
    let color = to_peniko(seg.style.color);
    let thickness = (seg.style.font_size / 16.0).max(1.0);
    let line = |y: f32| {
        (
            Point::new(x as f64, y as f64),
            Point::new((x + seg.width) as f64, y as f64),
        )
    };
    if seg.style.underline {
        let (a, b) = line(mid_y + seg.style.font_size * UNDERLINE_DROP);
        surface.stroke_line(a, b, color, thickness);
    }
    if seg.style.strikethrough {
        let (a, b) = line(mid_y);
        surface.stroke_line(a, b, color, thickness);
    }
}
