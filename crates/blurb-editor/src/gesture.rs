//! Pointer gesture state machine.
//!
//! A gesture snapshots the bubble at pointer-down and recomputes the
//! whole result from that snapshot plus the cumulative pointer delta on
//! every move. Nothing is mutated incrementally, so a jittery pointer
//! can never accumulate rounding drift and escape-to-cancel is just
//! dropping the snapshot.

use blurb_core::{
    Bubble, EDGE_EPS, MIN_BUBBLE_HEIGHT, MIN_BUBBLE_WIDTH, MIN_DOT_SIZE, Part,
};
use blurb_render::hit::{Handle, HitTarget};

/// What the active gesture is manipulating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Moving,
    Resizing(Handle),
    DraggingTailTip,
    DraggingTailBase,
    DraggingDot(usize),
}

/// Which rectangle edge a tail base is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

fn pinned_edge(base_cx: f32, base_cy: f32, w: f32, h: f32) -> Option<Edge> {
    if base_cy.abs() <= EDGE_EPS {
        Some(Edge::Top)
    } else if (base_cy - h).abs() <= EDGE_EPS {
        Some(Edge::Bottom)
    } else if base_cx.abs() <= EDGE_EPS {
        Some(Edge::Left)
    } else if (base_cx - w).abs() <= EDGE_EPS {
        Some(Edge::Right)
    } else {
        None
    }
}

struct Snapshot {
    start_x: f32,
    start_y: f32,
    origin: Bubble,
}

/// One in-flight pointer gesture over a single bubble.
pub struct Gesture {
    state: GestureState,
    snapshot: Option<Snapshot>,
}

impl Default for Gesture {
    fn default() -> Self {
        Self::new()
    }
}

impl Gesture {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            snapshot: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Begin a gesture from a hit-test result. `bubble` must be the
    /// bubble the target refers to.
    pub fn begin(&mut self, target: HitTarget, bubble: &Bubble, px: f32, py: f32) {
        self.state = match target {
            HitTarget::Body(_) => GestureState::Moving,
            HitTarget::Resize(_, handle) => GestureState::Resizing(handle),
            HitTarget::TailTip(_) => GestureState::DraggingTailTip,
            HitTarget::TailBase(_) => GestureState::DraggingTailBase,
            HitTarget::Dot(_, index) => GestureState::DraggingDot(index),
        };
        log::debug!("gesture begin {:?} on bubble {}", self.state, bubble.id);
        self.snapshot = Some(Snapshot {
            start_x: px,
            start_y: py,
            origin: bubble.clone(),
        });
    }

    /// Recompute the gesture result for the current pointer position.
    /// Returns the full replacement bubble, or `None` when idle.
    pub fn update(&self, px: f32, py: f32) -> Option<Bubble> {
        let snap = self.snapshot.as_ref()?;
        let dx = px - snap.start_x;
        let dy = py - snap.start_y;

        match self.state {
            GestureState::Idle => None,
            GestureState::Moving => {
                let mut out = snap.origin.clone();
                out.x += dx;
                out.y += dy;
                Some(out)
            }
            GestureState::Resizing(handle) => Some(resize(&snap.origin, handle, dx, dy)),
            GestureState::DraggingTailTip => Some(drag_tail_tip(&snap.origin, dx, dy)),
            GestureState::DraggingTailBase => Some(drag_tail_base(&snap.origin, px, py, dx, dy)),
            GestureState::DraggingDot(index) => Some(drag_dot(&snap.origin, index, dx, dy)),
        }
    }

    /// End the gesture. Returns true when a gesture was in flight (the
    /// caller closes its undo batch on that).
    pub fn finish(&mut self) -> bool {
        let was_active = self.is_active();
        if was_active {
            log::debug!("gesture finish {:?}", self.state);
        }
        self.state = GestureState::Idle;
        self.snapshot = None;
        was_active
    }

    /// Abandon the gesture without committing.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
        self.snapshot = None;
    }
}

// ─── Resize ──────────────────────────────────────────────────────────────

/// Resize from the origin rectangle: dragged edges follow the pointer,
/// the opposite edges stay anchored, and the result never shrinks below
/// the minimum footprint. Parts are rescaled from the origin geometry.
fn resize(origin: &Bubble, handle: Handle, dx: f32, dy: f32) -> Bubble {
    let (left, top, right, bottom) = handle.edges();

    let mut x0 = origin.x;
    let mut y0 = origin.y;
    let mut x1 = origin.x + origin.width;
    let mut y1 = origin.y + origin.height;
    if left {
        x0 = (x0 + dx).min(x1 - MIN_BUBBLE_WIDTH);
    }
    if right {
        x1 = (x1 + dx).max(x0 + MIN_BUBBLE_WIDTH);
    }
    if top {
        y0 = (y0 + dy).min(y1 - MIN_BUBBLE_HEIGHT);
    }
    if bottom {
        y1 = (y1 + dy).max(y0 + MIN_BUBBLE_HEIGHT);
    }

    let mut out = origin.clone();
    out.x = x0;
    out.y = y0;
    out.width = x1 - x0;
    out.height = y1 - y0;

    let sx = if origin.width > 0.0 {
        out.width / origin.width
    } else {
        1.0
    };
    let sy = if origin.height > 0.0 {
        out.height / origin.height
    } else {
        1.0
    };
    rescale_parts(origin, &mut out, sx, sy);
    out
}

/// Rescale attached parts for new dimensions. Tails pinned to an edge in
/// the origin geometry stay pinned; everything else scales
/// proportionally from the origin, never from an intermediate state.
fn rescale_parts(origin: &Bubble, out: &mut Bubble, sx: f32, sy: f32) {
    for (part, orig) in out.parts.iter_mut().zip(origin.parts.iter()) {
        match *orig {
            Part::Tail {
                base_cx,
                base_cy,
                base_width,
                tip_x,
                tip_y,
                initial_length,
                initial_base_width,
            } => {
                let edge = pinned_edge(base_cx, base_cy, origin.width, origin.height);
                let mut bx = base_cx * sx;
                let mut by = base_cy * sy;
                match edge {
                    Some(Edge::Top) => by = 0.0,
                    Some(Edge::Bottom) => by = out.height,
                    Some(Edge::Left) => bx = 0.0,
                    Some(Edge::Right) => bx = out.width,
                    None => {}
                }
                bx = bx.clamp(0.0, out.width);
                by = by.clamp(0.0, out.height);

                // Base width scales along the pinned edge's axis.
                let width_scale = match edge {
                    Some(Edge::Top | Edge::Bottom) => sx,
                    Some(Edge::Left | Edge::Right) => sy,
                    None => (sx + sy) / 2.0,
                };

                *part = Part::Tail {
                    base_cx: bx,
                    base_cy: by,
                    base_width: base_width * width_scale,
                    tip_x: bx + (tip_x - base_cx) * sx,
                    tip_y: by + (tip_y - base_cy) * sy,
                    initial_length,
                    initial_base_width,
                };
            }
            Part::Dot {
                offset_x,
                offset_y,
                size,
            } => {
                *part = Part::Dot {
                    offset_x: offset_x * sx,
                    offset_y: offset_y * sy,
                    size: (size * (sx + sy) / 2.0).max(MIN_DOT_SIZE),
                };
            }
        }
    }
}

// ─── Part drags ──────────────────────────────────────────────────────────

/// The tip floats freely; the tip may end up anywhere on the canvas.
fn drag_tail_tip(origin: &Bubble, dx: f32, dy: f32) -> Bubble {
    let mut out = origin.clone();
    for part in out.parts.iter_mut() {
        if let Part::Tail { tip_x, tip_y, .. } = part {
            *tip_x += dx;
            *tip_y += dy;
        }
    }
    out
}

/// The base slides along its pinned edge, clamped to the edge span. The
/// tip translates rigidly with the base so the tail keeps its shape. A
/// base that somehow lost its edge gets re-pinned to the edge matching
/// the dominant drag axis.
fn drag_tail_base(origin: &Bubble, px: f32, py: f32, dx: f32, dy: f32) -> Bubble {
    let mut out = origin.clone();
    let local_x = px - origin.x;
    let local_y = py - origin.y;

    for part in out.parts.iter_mut() {
        let Part::Tail {
            base_cx,
            base_cy,
            tip_x,
            tip_y,
            ..
        } = part
        else {
            continue;
        };

        let edge = pinned_edge(*base_cx, *base_cy, origin.width, origin.height)
            .unwrap_or_else(|| nearest_edge(local_x, local_y, origin, dx, dy));

        let (nx, ny) = match edge {
            Edge::Top => (local_x.clamp(0.0, origin.width), 0.0),
            Edge::Bottom => (local_x.clamp(0.0, origin.width), origin.height),
            Edge::Left => (0.0, local_y.clamp(0.0, origin.height)),
            Edge::Right => (origin.width, local_y.clamp(0.0, origin.height)),
        };
        *tip_x += nx - *base_cx;
        *tip_y += ny - *base_cy;
        *base_cx = nx;
        *base_cy = ny;
    }
    out
}

/// Pick the edge matching the dominant drag axis, nearest to the
/// pointer on that axis.
fn nearest_edge(local_x: f32, local_y: f32, origin: &Bubble, dx: f32, dy: f32) -> Edge {
    if dx.abs() >= dy.abs() {
        if local_x < origin.width / 2.0 {
            Edge::Left
        } else {
            Edge::Right
        }
    } else if local_y < origin.height / 2.0 {
        Edge::Top
    } else {
        Edge::Bottom
    }
}

fn drag_dot(origin: &Bubble, index: usize, dx: f32, dy: f32) -> Bubble {
    let mut out = origin.clone();
    if let Some(Part::Dot {
        offset_x, offset_y, ..
    }) = out.parts.get_mut(index)
    {
        *offset_x += dx;
        *offset_y += dy;
    } else {
        log::warn!("dot gesture lost part index {index}");
    }
    out
}
