//! Bubble document orchestration.
//!
//! Owns the bubble list, the selection, and the z-counter; instantiates
//! new bubbles from the active tool settings with their default parts
//! already attached. Everything mutates through whole-bubble replacement
//! so the undo stack can snapshot freely.

use blurb_core::{
    Bubble, BubbleId, BubbleKind, Part, ProjectRecord, ToolSettings, project::SCHEMA_VERSION,
};

/// Footprint of a freshly placed bubble.
pub const DEFAULT_BUBBLE_WIDTH: f32 = 150.0;
pub const DEFAULT_BUBBLE_HEIGHT: f32 = 90.0;

/// Offset applied to a duplicated bubble so it does not hide the
/// original.
const DUPLICATE_OFFSET: f32 = 20.0;

/// Everything undo needs to restore: the bubbles and the z counter.
/// Selection is deliberately not part of history.
#[derive(Debug, Clone, PartialEq)]
pub struct DocState {
    pub bubbles: Vec<Bubble>,
    pub next_z: i32,
}

pub struct BubbleOrchestrator {
    pub bubbles: Vec<Bubble>,
    pub selection: Option<BubbleId>,
    pub settings: ToolSettings,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub image: Option<String>,
    next_z: i32,
}

impl BubbleOrchestrator {
    pub fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            bubbles: Vec::new(),
            selection: None,
            settings: ToolSettings::default(),
            canvas_width,
            canvas_height,
            image: None,
            next_z: 0,
        }
    }

    pub fn find(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    pub fn find_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| b.id == id)
    }

    /// Replace a bubble wholesale (the gesture engine's commit path).
    pub fn replace(&mut self, bubble: Bubble) {
        if let Some(slot) = self.find_mut(bubble.id) {
            *slot = bubble;
        } else {
            log::warn!("replace: bubble {} no longer exists", bubble.id);
        }
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Place a new bubble of the active kind centered on `(x, y)`, with
    /// its default parts attached, selected, and on top of the stack.
    pub fn add_bubble(&mut self, x: f32, y: f32) -> BubbleId {
        let kind = self.settings.active_kind;
        let mut bubble = Bubble::new(
            BubbleId::next(),
            kind,
            x - DEFAULT_BUBBLE_WIDTH / 2.0,
            y - DEFAULT_BUBBLE_HEIGHT / 2.0,
            DEFAULT_BUBBLE_WIDTH,
            DEFAULT_BUBBLE_HEIGHT,
        );
        bubble.font_family = self.settings.font_family.clone();
        bubble.font_size = self.settings.font_size;
        bubble.text_color = self.settings.text_color;
        bubble.border_color = self.settings.border_color;
        bubble.z_index = self.bump_z();
        self.attach_default_parts(&mut bubble);

        let id = bubble.id;
        self.bubbles.push(bubble);
        self.selection = Some(id);
        id
    }

    /// Kind-specific starter parts: a tail pointing away from the bubble,
    /// or a tapering run of thought dots.
    fn attach_default_parts(&self, bubble: &mut Bubble) {
        let (w, h) = (bubble.width, bubble.height);
        let len = self.settings.tail_length;
        let bw = self.settings.tail_base_width;
        match bubble.kind {
            BubbleKind::SpeechDown | BubbleKind::Whisper => {
                bubble
                    .parts
                    .push(Part::new_tail(w / 2.0, h, bw, w / 2.0, h + len));
            }
            BubbleKind::SpeechUp => {
                bubble
                    .parts
                    .push(Part::new_tail(w / 2.0, 0.0, bw, w / 2.0, -len));
            }
            BubbleKind::Thought => {
                for (i, size) in self.settings.dot_sizes.iter().enumerate() {
                    bubble.parts.push(Part::Dot {
                        offset_x: w * 0.45 - i as f32 * 12.0,
                        offset_y: h + 8.0 + i as f32 * 16.0,
                        size: *size,
                    });
                }
            }
            BubbleKind::Shout | BubbleKind::Descriptive | BubbleKind::TextOnly => {}
        }
    }

    // ─── Removal / duplication ───────────────────────────────────────────

    pub fn remove(&mut self, id: BubbleId) {
        self.bubbles.retain(|b| b.id != id);
        if self.selection == Some(id) {
            self.selection = None;
        }
    }

    /// Copy a bubble with a fresh id, nudged down-right, on top.
    pub fn duplicate(&mut self, id: BubbleId) -> Option<BubbleId> {
        let mut copy = self.find(id)?.clone();
        copy.id = BubbleId::next();
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        copy.z_index = self.bump_z();
        let new_id = copy.id;
        self.bubbles.push(copy);
        self.selection = Some(new_id);
        Some(new_id)
    }

    // ─── Stacking ────────────────────────────────────────────────────────

    fn bump_z(&mut self) -> i32 {
        let z = self.next_z;
        self.next_z += 1;
        z
    }

    /// Swap z with the nearest bubble above, if any.
    pub fn bring_forward(&mut self, id: BubbleId) {
        let Some(z) = self.find(id).map(|b| b.z_index) else {
            return;
        };
        let above = self
            .bubbles
            .iter()
            .filter(|b| b.z_index > z)
            .min_by_key(|b| b.z_index)
            .map(|b| (b.id, b.z_index));
        if let Some((other_id, other_z)) = above {
            self.swap_z(id, z, other_id, other_z);
        }
    }

    /// Swap z with the nearest bubble below, if any.
    pub fn send_backward(&mut self, id: BubbleId) {
        let Some(z) = self.find(id).map(|b| b.z_index) else {
            return;
        };
        let below = self
            .bubbles
            .iter()
            .filter(|b| b.z_index < z)
            .max_by_key(|b| b.z_index)
            .map(|b| (b.id, b.z_index));
        if let Some((other_id, other_z)) = below {
            self.swap_z(id, z, other_id, other_z);
        }
    }

    pub fn bring_to_front(&mut self, id: BubbleId) {
        let z = self.bump_z();
        if let Some(b) = self.find_mut(id) {
            b.z_index = z;
        }
    }

    fn swap_z(&mut self, a: BubbleId, az: i32, b: BubbleId, bz: i32) {
        if let Some(bubble) = self.find_mut(a) {
            bubble.z_index = bz;
        }
        if let Some(bubble) = self.find_mut(b) {
            bubble.z_index = az;
        }
    }

    // ─── History / persistence ───────────────────────────────────────────

    pub fn snapshot(&self) -> DocState {
        DocState {
            bubbles: self.bubbles.clone(),
            next_z: self.next_z,
        }
    }

    pub fn restore(&mut self, state: &DocState) {
        self.bubbles = state.bubbles.clone();
        self.next_z = state.next_z;
        // Selection may point at a bubble that no longer exists.
        if let Some(id) = self.selection
            && self.find(id).is_none()
        {
            self.selection = None;
        }
    }

    pub fn to_record(&self) -> ProjectRecord {
        ProjectRecord {
            schema_version: SCHEMA_VERSION,
            image: self.image.clone(),
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            bubbles: self.bubbles.clone(),
            settings: self.settings.clone(),
            next_z: self.next_z,
        }
    }

    pub fn from_record(record: ProjectRecord) -> Self {
        Self {
            bubbles: record.bubbles,
            selection: None,
            settings: record.settings,
            canvas_width: record.canvas_width,
            canvas_height: record.canvas_height,
            image: record.image,
            next_z: record.next_z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn orchestrator() -> BubbleOrchestrator {
        BubbleOrchestrator::new(800.0, 600.0)
    }

    #[test]
    fn add_bubble_centers_on_pointer() {
        let mut doc = orchestrator();
        let id = doc.add_bubble(400.0, 300.0);
        let b = doc.find(id).unwrap();
        assert_eq!(b.x, 400.0 - DEFAULT_BUBBLE_WIDTH / 2.0);
        assert_eq!(b.y, 300.0 - DEFAULT_BUBBLE_HEIGHT / 2.0);
        assert_eq!(doc.selection, Some(id));
    }

    #[test]
    fn speech_down_gets_bottom_tail() {
        let mut doc = orchestrator();
        let id = doc.add_bubble(100.0, 100.0);
        let b = doc.find(id).unwrap();
        match *b.tail().unwrap() {
            Part::Tail {
                base_cx,
                base_cy,
                tip_y,
                ..
            } => {
                assert_eq!(base_cx, DEFAULT_BUBBLE_WIDTH / 2.0);
                assert_eq!(base_cy, DEFAULT_BUBBLE_HEIGHT);
                assert_eq!(tip_y, DEFAULT_BUBBLE_HEIGHT + 30.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn speech_up_tail_points_up() {
        let mut doc = orchestrator();
        doc.settings.active_kind = BubbleKind::SpeechUp;
        let id = doc.add_bubble(100.0, 100.0);
        let b = doc.find(id).unwrap();
        match *b.tail().unwrap() {
            Part::Tail { base_cy, tip_y, .. } => {
                assert_eq!(base_cy, 0.0);
                assert_eq!(tip_y, -30.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn thought_gets_tapering_dots() {
        let mut doc = orchestrator();
        doc.settings.active_kind = BubbleKind::Thought;
        let id = doc.add_bubble(100.0, 100.0);
        let b = doc.find(id).unwrap();
        let sizes: Vec<f32> = b
            .dots()
            .map(|d| match d {
                Part::Dot { size, .. } => *size,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(sizes, vec![14.0, 10.0, 6.0]);
    }

    #[test]
    fn descriptive_has_no_parts() {
        let mut doc = orchestrator();
        doc.settings.active_kind = BubbleKind::Descriptive;
        let id = doc.add_bubble(100.0, 100.0);
        assert!(doc.find(id).unwrap().parts.is_empty());
    }

    #[test]
    fn duplicate_offsets_and_raises() {
        let mut doc = orchestrator();
        let a = doc.add_bubble(100.0, 100.0);
        let b = doc.duplicate(a).unwrap();
        assert_ne!(a, b);
        let (a, b) = (doc.find(a).unwrap(), doc.find(b).unwrap());
        assert_eq!(b.x, a.x + 20.0);
        assert_eq!(b.y, a.y + 20.0);
        assert!(b.z_index > a.z_index);
    }

    #[test]
    fn remove_clears_selection() {
        let mut doc = orchestrator();
        let id = doc.add_bubble(100.0, 100.0);
        doc.remove(id);
        assert!(doc.bubbles.is_empty());
        assert_eq!(doc.selection, None);
    }

    #[test]
    fn stacking_swaps_are_symmetric() {
        let mut doc = orchestrator();
        let a = doc.add_bubble(0.0, 0.0);
        let b = doc.add_bubble(0.0, 0.0);
        let c = doc.add_bubble(0.0, 0.0);

        doc.bring_forward(a);
        let z = |doc: &BubbleOrchestrator, id| doc.find(id).unwrap().z_index;
        assert!(z(&doc, a) > z(&doc, b));
        assert!(z(&doc, a) < z(&doc, c));

        doc.send_backward(a);
        assert!(z(&doc, a) < z(&doc, b));

        doc.bring_to_front(b);
        assert!(z(&doc, b) > z(&doc, c));
    }

    #[test]
    fn record_roundtrip_preserves_document() {
        let mut doc = orchestrator();
        doc.add_bubble(100.0, 100.0);
        doc.image = Some("bg.png".into());
        let record = doc.to_record();
        let back = BubbleOrchestrator::from_record(record);
        assert_eq!(back.bubbles, doc.bubbles);
        assert_eq!(back.image, doc.image);
        // A bubble created after reload stacks above the loaded ones.
        let mut back = back;
        let id = back.add_bubble(0.0, 0.0);
        assert!(back.find(id).unwrap().z_index > doc.bubbles[0].z_index);
    }
}
