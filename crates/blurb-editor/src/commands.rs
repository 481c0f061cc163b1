//! Undo/Redo command stack.
//!
//! History is snapshot-based: a command captures the whole document
//! state before and after an edit, and undo/redo swaps between them in
//! one step. Drag gestures batch — the snapshot is taken at
//! pointer-down and compared at pointer-up, so a hundred move events
//! collapse into a single undo entry.

use crate::document::{BubbleOrchestrator, DocState};

#[derive(Debug, Clone)]
struct Command {
    before: DocState,
    after: DocState,
    description: String,
}

pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    batch_snapshot: Option<DocState>,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
        }
    }

    /// Start a batch group, capturing the current document as the undo
    /// snapshot. Mutations until `end_batch` are applied live but become
    /// one atomic history step.
    pub fn begin_batch(&mut self, doc: &BubbleOrchestrator) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(doc.snapshot());
        }
        self.batch_depth += 1;
    }

    /// Close a batch group. When the outermost batch closes and the
    /// document actually changed, push one command.
    pub fn end_batch(&mut self, doc: &BubbleOrchestrator, description: &str) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let Some(before) = self.batch_snapshot.take() else {
            return;
        };
        let after = doc.snapshot();
        if before != after {
            self.push(Command {
                before,
                after,
                description: description.to_string(),
            });
        }
    }

    /// Run a one-shot edit as its own history step.
    pub fn apply(
        &mut self,
        doc: &mut BubbleOrchestrator,
        description: &str,
        edit: impl FnOnce(&mut BubbleOrchestrator),
    ) {
        self.begin_batch(doc);
        edit(doc);
        self.end_batch(doc, description);
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Undo the last command, returning its description.
    pub fn undo(&mut self, doc: &mut BubbleOrchestrator) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        doc.restore(&cmd.before);
        let desc = cmd.description.clone();
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command, returning its description.
    pub fn redo(&mut self, doc: &mut BubbleOrchestrator) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        doc.restore(&cmd.after);
        let desc = cmd.description.clone();
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
