//! Editing engine: the bubble document orchestrator, the pointer gesture
//! state machine, and snapshot-based undo/redo. All interaction flows
//! through here; painting and hit testing come from `blurb-render`.

pub mod commands;
pub mod document;
pub mod gesture;

pub use commands::CommandStack;
pub use document::{BubbleOrchestrator, DocState};
pub use gesture::{Gesture, GestureState};
