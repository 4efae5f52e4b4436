//! Snapshot-based undo/redo.
//!
//! Every committed edit pushes a [`Snapshot`] of the document as it was
//! *before* the edit. Undo swaps the current document with the newest
//! snapshot; redo swaps it back. Continuous gestures (drags, handle
//! manipulation) push once, when the gesture ends.

use indexmap::IndexMap;

use crate::model::{Component, ConnectionNode, Schematic, TextElement, Wire, WireBundle};

/// A full copy of the document's entity collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub components: IndexMap<String, Component>,
    pub wires: IndexMap<String, Wire>,
    pub texts: IndexMap<String, TextElement>,
    pub nodes: IndexMap<String, ConnectionNode>,
    pub bundles: IndexMap<String, WireBundle>,
}

impl Snapshot {
    pub fn capture(doc: &Schematic) -> Self {
        Self {
            components: doc.components.clone(),
            wires: doc.wires.clone(),
            texts: doc.texts.clone(),
            nodes: doc.nodes.clone(),
            bundles: doc.bundles.clone(),
        }
    }

    pub fn restore(self, doc: &mut Schematic) {
        doc.components = self.components;
        doc.wires = self.wires;
        doc.texts = self.texts;
        doc.nodes = self.nodes;
        doc.bundles = self.bundles;
    }

    /// True if `doc` still matches this snapshot.
    pub fn matches(&self, doc: &Schematic) -> bool {
        self.components == doc.components
            && self.wires == doc.wires
            && self.texts == doc.texts
            && self.nodes == doc.nodes
            && self.bundles == doc.bundles
    }
}

/// Bounded undo/redo stacks.
///
/// ```rust,ignore
/// let mut history = EditorHistory::new(50);
/// history.push(Snapshot::capture(&doc));
/// doc.add_component(c);
/// history.undo(&mut doc); // component gone
/// history.redo(&mut doc); // component back
/// ```
#[derive(Debug, Clone)]
pub struct EditorHistory {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_size: usize,
}

impl Default for EditorHistory {
    fn default() -> Self {
        Self::new(50)
    }
}

impl EditorHistory {
    /// Create a new history with the given maximum undo depth.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Record the pre-edit state and clear the redo stack.
    ///
    /// The oldest frame is discarded once the depth exceeds the limit.
    pub fn push(&mut self, before: Snapshot) {
        self.undo_stack.push(before);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Restore the newest snapshot, returning true if an undo was performed.
    pub fn undo(&mut self, doc: &mut Schematic) -> bool {
        if let Some(previous) = self.undo_stack.pop() {
            self.redo_stack.push(Snapshot::capture(doc));
            previous.restore(doc);
            true
        } else {
            false
        }
    }

    /// Re-apply the newest undone state, returning true if a redo was
    /// performed.
    pub fn redo(&mut self, doc: &mut Schematic) -> bool {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(Snapshot::capture(doc));
            next.restore(doc);
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
