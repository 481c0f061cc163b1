//! Integration tests: gestures and structural edits through the
//! snapshot history.

use blurb_editor::{BubbleOrchestrator, CommandStack, Gesture};
use blurb_render::hit::HitTarget;

fn doc_with_bubble() -> (BubbleOrchestrator, CommandStack) {
    let mut doc = BubbleOrchestrator::new(800.0, 600.0);
    let mut stack = CommandStack::new(100);
    stack.apply(&mut doc, "add bubble", |d| {
        d.add_bubble(175.0, 145.0);
    });
    (doc, stack)
}

#[test]
fn drag_gesture_is_one_undo_step() {
    let (mut doc, mut stack) = doc_with_bubble();
    let id = doc.bubbles[0].id;

    // A drag with many intermediate move events.
    stack.begin_batch(&doc);
    let origin = doc.find(id).unwrap().clone();
    let mut gesture = Gesture::new();
    gesture.begin(HitTarget::Body(id), &origin, 175.0, 145.0);
    for step in 1..=20 {
        if let Some(updated) = gesture.update(175.0 + step as f32 * 5.0, 145.0) {
            doc.replace(updated);
        }
    }
    gesture.finish();
    stack.end_batch(&doc, "move bubble");

    assert_eq!(doc.find(id).unwrap().x, 200.0);

    // One undo reverts the whole drag, not one move event.
    assert_eq!(stack.undo(&mut doc).as_deref(), Some("move bubble"));
    assert_eq!(doc.find(id).unwrap().x, 100.0);

    assert_eq!(stack.redo(&mut doc).as_deref(), Some("move bubble"));
    assert_eq!(doc.find(id).unwrap().x, 200.0);
}

#[test]
fn aborted_drag_leaves_no_history() {
    let (mut doc, mut stack) = doc_with_bubble();
    let id = doc.bubbles[0].id;

    stack.begin_batch(&doc);
    let origin = doc.find(id).unwrap().clone();
    let mut gesture = Gesture::new();
    gesture.begin(HitTarget::Body(id), &origin, 175.0, 145.0);
    // Pointer returns to the start before release: no net change.
    if let Some(updated) = gesture.update(175.0, 145.0) {
        doc.replace(updated);
    }
    gesture.finish();
    stack.end_batch(&doc, "move bubble");

    assert!(stack.can_undo(), "only the initial add is undoable");
    stack.undo(&mut doc);
    assert!(!stack.can_undo());
}

#[test]
fn remove_and_undo_restores_bubble() {
    let (mut doc, mut stack) = doc_with_bubble();
    let id = doc.bubbles[0].id;

    stack.apply(&mut doc, "delete bubble", |d| d.remove(id));
    assert!(doc.bubbles.is_empty());

    stack.undo(&mut doc);
    assert_eq!(doc.bubbles.len(), 1);
    assert_eq!(doc.bubbles[0].id, id, "identity survives the roundtrip");
}

#[test]
fn duplicate_then_undo_drops_only_the_copy() {
    let (mut doc, mut stack) = doc_with_bubble();
    let id = doc.bubbles[0].id;

    stack.apply(&mut doc, "duplicate bubble", |d| {
        d.duplicate(id);
    });
    assert_eq!(doc.bubbles.len(), 2);

    stack.undo(&mut doc);
    assert_eq!(doc.bubbles.len(), 1);
    assert_eq!(doc.bubbles[0].id, id);
}

#[test]
fn z_order_edits_roundtrip() {
    let mut doc = BubbleOrchestrator::new(800.0, 600.0);
    let mut stack = CommandStack::new(100);
    let a = doc.add_bubble(100.0, 100.0);
    let b = doc.add_bubble(120.0, 120.0);

    stack.apply(&mut doc, "bring forward", |d| d.bring_forward(a));
    assert!(doc.find(a).unwrap().z_index > doc.find(b).unwrap().z_index);

    stack.undo(&mut doc);
    assert!(doc.find(a).unwrap().z_index < doc.find(b).unwrap().z_index);
}
