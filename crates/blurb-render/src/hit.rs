//! Hit testing: pointer position → interaction target.
//!
//! Reverse-walks the stacking order (topmost first) so the bubble the
//! user sees on top is the one that takes the click. The selected
//! bubble's chrome — resize handles and part grips — is checked before
//! any body so small targets stay grabbable even when overlapped.

use blurb_core::{Bubble, BubbleId, Part};

/// Pointer distance within which a resize handle or part grip is grabbed.
pub const HANDLE_RADIUS: f32 = 6.0;

/// The eight resize handles, by compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    NW,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
}

impl Handle {
    /// Which edges this handle moves.
    pub fn edges(&self) -> (bool, bool, bool, bool) {
        // (left, top, right, bottom)
        match self {
            Handle::NW => (true, true, false, false),
            Handle::N => (false, true, false, false),
            Handle::NE => (false, true, true, false),
            Handle::E => (false, false, true, false),
            Handle::SE => (false, false, true, true),
            Handle::S => (false, false, false, true),
            Handle::SW => (true, false, false, true),
            Handle::W => (true, false, false, false),
        }
    }
}

/// What a pointer-down lands on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    Body(BubbleId),
    Resize(BubbleId, Handle),
    TailBase(BubbleId),
    TailTip(BubbleId),
    Dot(BubbleId, usize),
}

impl HitTarget {
    pub fn bubble(&self) -> BubbleId {
        match *self {
            HitTarget::Body(id)
            | HitTarget::Resize(id, _)
            | HitTarget::TailBase(id)
            | HitTarget::TailTip(id)
            | HitTarget::Dot(id, _) => id,
        }
    }
}

/// Canvas-space centers of the eight resize handles.
pub fn handle_positions(b: &Bubble) -> [(Handle, f32, f32); 8] {
    let (x0, y0) = (b.x, b.y);
    let (x1, y1) = (b.x + b.width, b.y + b.height);
    let (mx, my) = (b.x + b.width / 2.0, b.y + b.height / 2.0);
    [
        (Handle::NW, x0, y0),
        (Handle::N, mx, y0),
        (Handle::NE, x1, y0),
        (Handle::E, x1, my),
        (Handle::SE, x1, y1),
        (Handle::S, mx, y1),
        (Handle::SW, x0, y1),
        (Handle::W, x0, my),
    ]
}

fn near(px: f32, py: f32, cx: f32, cy: f32) -> bool {
    (px - cx).abs() <= HANDLE_RADIUS && (py - cy).abs() <= HANDLE_RADIUS
}

/// Find what the pointer at `(px, py)` lands on, or `None` for the
/// background.
pub fn hit_test(
    bubbles: &[Bubble],
    selected: Option<BubbleId>,
    px: f32,
    py: f32,
) -> Option<HitTarget> {
    // Selection chrome first.
    if let Some(id) = selected
        && let Some(bubble) = bubbles.iter().find(|b| b.id == id)
        && let Some(target) = hit_chrome(bubble, px, py)
    {
        return Some(target);
    }

    // Then bodies, topmost first.
    let mut order: Vec<&Bubble> = bubbles.iter().collect();
    order.sort_by_key(|b| b.z_index);
    order
        .iter()
        .rev()
        .find(|b| b.contains(px, py))
        .map(|b| HitTarget::Body(b.id))
}

fn hit_chrome(bubble: &Bubble, px: f32, py: f32) -> Option<HitTarget> {
    for (i, part) in bubble.parts.iter().enumerate() {
        match *part {
            Part::Tail {
                base_cx,
                base_cy,
                tip_x,
                tip_y,
                ..
            } => {
                if near(px, py, bubble.x + tip_x, bubble.y + tip_y) {
                    return Some(HitTarget::TailTip(bubble.id));
                }
                if near(px, py, bubble.x + base_cx, bubble.y + base_cy) {
                    return Some(HitTarget::TailBase(bubble.id));
                }
            }
            Part::Dot {
                offset_x, offset_y, ..
            } => {
                if near(px, py, bubble.x + offset_x, bubble.y + offset_y) {
                    return Some(HitTarget::Dot(bubble.id, i));
                }
            }
        }
    }

    handle_positions(bubble)
        .into_iter()
        .find(|(_, hx, hy)| near(px, py, *hx, *hy))
        .map(|(h, _, _)| HitTarget::Resize(bubble.id, h))
}
