//! Selection management for the editor.
//!
//! A selection has at most one *primary* entity, which drives property
//! editing, and one multi-selection set per entity kind. Selecting a primary
//! replaces everything; modifier-click toggles set membership without
//! touching the other kinds.
//!
//! ```rust,ignore
//! let mut sel = EditorSelection::new();
//! sel.select(EntityKind::Component, "r1");
//! sel.toggle(EntityKind::Component, "r2");
//! assert_eq!(sel.ids(EntityKind::Component), ["r1", "r2"]);
//! ```

use crate::model::Schematic;

/// The kinds of selectable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Component,
    Wire,
    Text,
    Node,
}

/// Tracks the current selection state in the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorSelection {
    primary: Option<(EntityKind, String)>,
    components: Vec<String>,
    wires: Vec<String>,
    texts: Vec<String>,
    nodes: Vec<String>,
}

impl EditorSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all selections.
    pub fn clear(&mut self) {
        self.primary = None;
        self.components.clear();
        self.wires.clear();
        self.texts.clear();
        self.nodes.clear();
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
            && self.components.is_empty()
            && self.wires.is_empty()
            && self.texts.is_empty()
            && self.nodes.is_empty()
    }

    /// Make `id` the sole selection.
    pub fn select(&mut self, kind: EntityKind, id: &str) {
        self.clear();
        self.primary = Some((kind, id.to_string()));
        self.set_mut(kind).push(id.to_string());
    }

    /// Add `id` to its kind's set, or remove it if already present.
    pub fn toggle(&mut self, kind: EntityKind, id: &str) {
        let was_primary = self.primary_id(kind) == Some(id);
        let set = self.set_mut(kind);
        match set.iter().position(|s| s == id) {
            Some(pos) => {
                set.remove(pos);
                if was_primary {
                    self.primary = None;
                }
            }
            None => set.push(id.to_string()),
        }
    }

    /// Replace one kind's set, leaving the others alone.
    pub fn select_all(&mut self, kind: EntityKind, ids: Vec<String>) {
        *self.set_mut(kind) = ids;
    }

    pub fn primary(&self) -> Option<(EntityKind, &str)> {
        self.primary.as_ref().map(|(k, id)| (*k, id.as_str()))
    }

    /// The primary id, if the primary is of `kind`.
    pub fn primary_id(&self, kind: EntityKind) -> Option<&str> {
        match &self.primary {
            Some((k, id)) if *k == kind => Some(id),
            _ => None,
        }
    }

    /// Selected ids of one kind, in selection order.
    pub fn ids(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Component => &self.components,
            EntityKind::Wire => &self.wires,
            EntityKind::Text => &self.texts,
            EntityKind::Node => &self.nodes,
        }
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.ids(kind).iter().any(|s| s == id)
    }

    /// Forget ids of entities that no longer exist in `doc`.
    pub fn retain_existing(&mut self, doc: &Schematic) {
        self.components.retain(|id| doc.components.contains_key(id));
        self.wires.retain(|id| doc.wires.contains_key(id));
        self.texts.retain(|id| doc.texts.contains_key(id));
        self.nodes.retain(|id| doc.nodes.contains_key(id));
        let stale = self
            .primary
            .as_ref()
            .is_some_and(|(kind, id)| !self.contains(*kind, id));
        if stale {
            self.primary = None;
        }
    }

    fn set_mut(&mut self, kind: EntityKind) -> &mut Vec<String> {
        match kind {
            EntityKind::Component => &mut self.components,
            EntityKind::Wire => &mut self.wires,
            EntityKind::Text => &mut self.texts,
            EntityKind::Node => &mut self.nodes,
        }
    }
}
