//! Editor state management.
//!
//! [`EditorState`] is the explicit state container for one open project:
//! the document plus selection, undo/redo history, clipboard, the active
//! wire, settings and project metadata. Every committing edit goes through
//! [`EditorState::apply`], which records one history frame and marks the
//! project dirty. Pointer and keyboard interpretation lives in
//! [`super::input`].

use tracing::{debug, info};

use crate::config::EditorSettings;
use crate::error::{EditorError, Result};
use crate::geometry::{Point, normalize_degrees};
use crate::model::{
    Component, ConnectionNode, LineStyle, Schematic, SignalType, TextElement, Wire, WirePoint, new_id,
};
use crate::project::{ProjectRecord, ProjectStore, load_record, now_ms};
use crate::resolve::resolve_point;
use crate::snap::{Guides, drag_alignment_guides, snap_dragged_position, snap_point_to_grid};
use crate::terminals::ComponentType;

use super::history::{EditorHistory, Snapshot};
use super::input::{Gesture, Tool};
use super::operations::{self, Subdivision, clamp_scale, remap_binding};
use super::selection::{EditorSelection, EntityKind};
use super::templates::{CircuitTemplate, TemplateCategory, TemplateLibrary};
use super::wiring::ActiveWire;

// ────────────────────────────────────────────────────────────────────────────
// Clipboard
// ────────────────────────────────────────────────────────────────────────────

/// Clipboard contents for copy/paste operations.
#[derive(Debug, Clone, Default)]
pub struct EditorClipboard {
    pub components: Vec<Component>,
    pub texts: Vec<TextElement>,
    /// Copied wires, with every point's coordinates resolved at copy time.
    pub wires: Vec<Wire>,
}

impl EditorClipboard {
    /// Returns true if the clipboard has content.
    pub fn has_content(&self) -> bool {
        !self.components.is_empty() || !self.texts.is_empty() || !self.wires.is_empty()
    }

    pub fn clear(&mut self) {
        self.components.clear();
        self.texts.clear();
        self.wires.clear();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Project metadata
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

impl ProjectInfo {
    fn untitled() -> Self {
        Self {
            id: new_id(),
            name: "Untitled Project".to_string(),
            created_at: now_ms(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// EditorState
// ────────────────────────────────────────────────────────────────────────────

/// The complete state of the schematic editor.
///
/// ```rust,ignore
/// let mut state = EditorState::default();
/// state.start_placing(ComponentType::Resistor);
/// state.on_click(Point::new(100.0, 100.0), Modifiers::default());
/// assert_eq!(state.doc.components.len(), 1);
/// state.undo();
/// assert!(state.doc.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct EditorState {
    pub doc: Schematic,
    pub selection: EditorSelection,
    pub history: EditorHistory,
    pub clipboard: EditorClipboard,
    pub settings: EditorSettings,
    pub templates: TemplateLibrary,
    pub project: ProjectInfo,
    pub tool: Tool,
    /// Component type armed by the place tool.
    pub placing: Option<ComponentType>,
    /// Canvas zoom factor; hit thresholds scale with its inverse.
    pub zoom: f64,
    /// Alignment guides of the entity being dragged.
    pub guides: Guides,
    /// Alignment guides of the wire preview.
    pub wire_guides: Guides,
    /// Snapped direction of the wire preview, in degrees.
    pub wire_angle: Option<f64>,
    pub(crate) active_wire: Option<ActiveWire>,
    pub(crate) gesture: Gesture,
    dirty: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl EditorState {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            doc: Schematic::new(),
            selection: EditorSelection::new(),
            history: EditorHistory::new(settings.history_limit),
            clipboard: EditorClipboard::default(),
            templates: TemplateLibrary::default(),
            project: ProjectInfo::untitled(),
            tool: Tool::Select,
            placing: None,
            zoom: 1.0,
            guides: Guides::default(),
            wire_guides: Guides::default(),
            wire_angle: None,
            active_wire: None,
            gesture: Gesture::Idle,
            dirty: false,
            settings,
        }
    }

    /// Grid size when the grid is enabled.
    pub fn grid(&self) -> Option<f64> {
        self.settings.grid()
    }

    pub(crate) fn snap(&self, p: Point) -> Point {
        match self.grid() {
            Some(size) => snap_point_to_grid(p, size),
            None => p,
        }
    }

    pub fn active_wire(&self) -> Option<&ActiveWire> {
        self.active_wire.as_ref()
    }

    /// True if the document changed since the last save or load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Run a committing edit.
    ///
    /// `edit` returns whether it changed the document; only then is the
    /// pre-edit snapshot pushed and the project marked dirty.
    pub fn apply(&mut self, action: &str, edit: impl FnOnce(&mut Schematic) -> bool) -> bool {
        let before = Snapshot::capture(&self.doc);
        if !edit(&mut self.doc) {
            debug!(action, "edit was a no-op");
            return false;
        }
        self.history.push(before);
        self.dirty = true;
        debug!(action, depth = self.history.undo_depth(), "committed edit");
        true
    }

    /// Record one frame for a gesture that started at `before`, if the
    /// document changed since.
    pub(crate) fn commit_since(&mut self, action: &str, before: Snapshot) -> bool {
        if before.matches(&self.doc) {
            return false;
        }
        self.history.push(before);
        self.dirty = true;
        debug!(action, depth = self.history.undo_depth(), "committed gesture");
        true
    }

    // ── Tools ───────────────────────────────────────────────────────────────

    /// Switch tools, abandoning any wire in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.cancel_wire();
        if tool != Tool::Place {
            self.placing = None;
        }
        self.tool = tool;
    }

    /// Arm the place tool with a component type.
    pub fn start_placing(&mut self, kind: ComponentType) {
        self.set_tool(Tool::Place);
        self.placing = Some(kind);
    }

    // ── Creation ────────────────────────────────────────────────────────────

    /// Place a component at `at` (grid-snapped) and return to the select tool.
    pub fn place_component(&mut self, kind: ComponentType, at: Point) -> String {
        let p = self.snap(at);
        let component = Component::new(kind, p.x, p.y);
        let id = component.id.clone();
        self.apply("place component", |doc| {
            doc.add_component(component);
            true
        });
        self.placing = None;
        self.tool = Tool::Select;
        info!(component = %id, %kind, x = p.x, y = p.y, "placed component");
        id
    }

    /// Drop a text element with the default style and return to the select tool.
    pub fn add_text(&mut self, at: Point) -> String {
        let p = self.snap(at);
        let text = TextElement {
            font_size: self.settings.text_size,
            font_weight: self.settings.text_weight.clone(),
            color: self.settings.text_color.clone(),
            ..TextElement::new(p.x, p.y, "Text")
        };
        let id = text.id.clone();
        self.apply("add text", |doc| {
            doc.add_text(text);
            true
        });
        self.tool = Tool::Select;
        id
    }

    /// Create a manual connection node at `at` (grid-snapped).
    pub fn add_connection_node(&mut self, at: Point) -> String {
        let p = self.snap(at);
        let node = ConnectionNode::new(p.x, p.y);
        let id = node.id.clone();
        self.apply("add node", |doc| {
            doc.add_node(node);
            true
        });
        id
    }

    // ── Graph edits ─────────────────────────────────────────────────────────

    /// Delete a manual node and every wire touching it.
    pub fn delete_node(&mut self, id: &str) -> bool {
        let ids = [id.to_string()];
        let changed = self.apply("delete node", |doc| {
            if !doc.nodes.contains_key(id) {
                return false;
            }
            operations::delete_nodes(doc, &ids);
            true
        });
        self.selection.retain_existing(&self.doc);
        changed
    }

    pub fn move_node(&mut self, id: &str, to: Point) -> bool {
        self.apply("move node", |doc| operations::move_node(doc, id, to))
    }

    /// Split a wire; see [`operations::subdivide_wire`]. One history frame.
    pub fn subdivide(
        &mut self,
        wire_id: &str,
        segment_index: usize,
        at: Point,
        component_id: Option<&str>,
    ) -> Option<Subdivision> {
        let mut result = None;
        self.apply("subdivide wire", |doc| {
            result = operations::subdivide_wire(doc, wire_id, segment_index, at, component_id);
            result.is_some()
        });
        result
    }

    pub fn move_wire_point(&mut self, wire_id: &str, index: usize, to: Point) -> bool {
        self.apply("move wire point", |doc| {
            operations::move_wire_point(doc, wire_id, index, to)
        })
    }

    pub fn auto_route(&mut self, wire_ids: &[String]) -> usize {
        let mut routed = 0;
        self.apply("auto-route", |doc| {
            routed = operations::auto_route(doc, wire_ids);
            routed > 0
        });
        routed
    }

    // ── Selection edits ─────────────────────────────────────────────────────

    /// Select every component of one type, replacing the component set.
    pub fn select_all_by_type(&mut self, kind: ComponentType) {
        let ids = self
            .doc
            .components
            .values()
            .filter(|c| c.kind == kind)
            .map(|c| c.id.clone())
            .collect();
        self.selection.select_all(EntityKind::Component, ids);
    }

    /// Delete the selection of the highest-priority kind present:
    /// nodes, then wires, then texts, then components.
    pub fn delete_selection(&mut self) -> bool {
        let order = [
            EntityKind::Node,
            EntityKind::Wire,
            EntityKind::Text,
            EntityKind::Component,
        ];
        let Some(kind) = order.into_iter().find(|k| !self.selection.ids(*k).is_empty()) else {
            return false;
        };
        let ids = self.selection.ids(kind).to_vec();
        let changed = self.apply("delete selection", |doc| match kind {
            EntityKind::Node => {
                let before = doc.nodes.len();
                operations::delete_nodes(doc, &ids);
                doc.nodes.len() != before
            }
            EntityKind::Wire => operations::delete_wires(doc, &ids) > 0,
            EntityKind::Text => operations::delete_texts(doc, &ids) > 0,
            EntityKind::Component => {
                let before = doc.components.len();
                operations::delete_components(doc, &ids);
                doc.components.len() != before
            }
        });
        self.selection.retain_existing(&self.doc);
        changed
    }

    fn selected_components(&self) -> Vec<String> {
        self.selection.ids(EntityKind::Component).to_vec()
    }

    /// Rotate every selected component by 90°.
    pub fn rotate_selected(&mut self) -> bool {
        let ids = self.selected_components();
        self.apply("rotate", |doc| operations::rotate_components(doc, &ids, 90.0) > 0)
    }

    /// Set the rotation of every selected component, normalized to `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        let ids = self.selected_components();
        let rotation = normalize_degrees(degrees);
        self.apply("set rotation", |doc| {
            let mut n = 0;
            for id in &ids {
                if let Some(c) = doc.components.get_mut(id) {
                    c.rotation = rotation;
                    n += 1;
                }
            }
            n > 0
        })
    }

    /// Move every selected component by `(dx, dy)`, then grid-snap.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) -> bool {
        let ids = self.selected_components();
        let grid = self.grid();
        self.apply("nudge", |doc| {
            operations::translate_components(doc, &ids, dx, dy, grid) > 0
        })
    }

    fn edit_primary_component(&mut self, action: &str, f: impl FnOnce(&mut Component)) -> bool {
        let Some(id) = self.selection.primary_id(EntityKind::Component).map(str::to_string) else {
            return false;
        };
        self.apply(action, |doc| match doc.components.get_mut(&id) {
            Some(c) => {
                f(c);
                true
            }
            None => false,
        })
    }

    /// Scale the primary component, clamped to `[0.5, 3]`.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        let scale = clamp_scale(scale);
        self.edit_primary_component("set scale", |c| c.scale = scale)
    }

    pub fn set_color(&mut self, color: &str) -> bool {
        self.edit_primary_component("set color", |c| c.color = Some(color.to_string()))
    }

    /// Where the primary entity would land when dropped at `p`, and the
    /// drag guides that placed it there.
    fn drag_target(&self, kind: EntityKind, id: &str, p: Point) -> (Point, Guides) {
        let others = self
            .doc
            .components
            .values()
            .filter(|c| !(kind == EntityKind::Component && c.id == id))
            .map(Component::position)
            .chain(
                self.doc
                    .texts
                    .values()
                    .filter(|t| !(kind == EntityKind::Text && t.id == id))
                    .map(TextElement::position),
            );
        let guides = drag_alignment_guides(others, p);
        (snap_dragged_position(&guides, p, self.grid()), guides)
    }

    fn primary_owned(&self) -> Option<(EntityKind, String)> {
        self.selection.primary().map(|(kind, id)| (kind, id.to_string()))
    }

    /// Move the primary component or text to `p`, snapping to the first
    /// drag guide per axis or else the grid.
    pub fn set_position(&mut self, p: Point) -> bool {
        let Some((kind, id)) = self.primary_owned() else {
            return false;
        };
        let (target, _) = self.drag_target(kind, &id, p);
        self.apply("set position", |doc| set_entity_position(doc, kind, &id, target))
    }

    /// Drag step: like [`Self::set_position`] but without history, and
    /// exposing the guides for feedback.
    pub(crate) fn drag_primary_to(&mut self, p: Point) -> bool {
        let Some((kind, id)) = self.primary_owned() else {
            return false;
        };
        let (target, guides) = self.drag_target(kind, &id, p);
        self.guides = guides;
        set_entity_position(&mut self.doc, kind, &id, target)
    }

    /// Rotation-handle step for the primary component or text, without history.
    pub(crate) fn rotate_primary_to(&mut self, degrees: f64) -> bool {
        let Some((kind, id)) = self.primary_owned() else {
            return false;
        };
        match kind {
            EntityKind::Component => self.doc.components.get_mut(&id).map(|c| c.rotation = degrees).is_some(),
            EntityKind::Text => self.doc.texts.get_mut(&id).map(|t| t.rotation = degrees).is_some(),
            _ => false,
        }
    }

    /// Resize-handle step for the primary component, without history.
    pub(crate) fn scale_primary_to(&mut self, scale: f64) -> bool {
        let Some(id) = self.selection.primary_id(EntityKind::Component).map(str::to_string) else {
            return false;
        };
        self.doc
            .components
            .get_mut(&id)
            .map(|c| c.scale = clamp_scale(scale))
            .is_some()
    }

    // ── Text edits ──────────────────────────────────────────────────────────

    fn edit_primary_text(&mut self, action: &str, f: impl FnOnce(&mut TextElement)) -> bool {
        let Some(id) = self.selection.primary_id(EntityKind::Text).map(str::to_string) else {
            return false;
        };
        self.apply(action, |doc| match doc.texts.get_mut(&id) {
            Some(t) => {
                f(t);
                true
            }
            None => false,
        })
    }

    pub fn set_text_content(&mut self, text: &str) -> bool {
        self.edit_primary_text("set text", |t| t.text = text.to_string())
    }

    pub fn set_text_rotation(&mut self, degrees: f64) -> bool {
        self.edit_primary_text("rotate text", |t| t.rotation = normalize_degrees(degrees))
    }

    pub fn set_text_color(&mut self, color: &str) -> bool {
        self.edit_primary_text("set text color", |t| t.color = color.to_string())
    }

    pub fn set_text_size(&mut self, size: f64) -> bool {
        self.edit_primary_text("set text size", |t| t.font_size = size)
    }

    pub fn set_text_weight(&mut self, weight: &str) -> bool {
        self.edit_primary_text("set text weight", |t| t.font_weight = weight.to_string())
    }

    // ── Wire properties and bundles ─────────────────────────────────────────

    pub fn set_wire_label(&mut self, wire_id: &str, label: &str) -> bool {
        self.apply("set wire label", |doc| operations::set_wire_label(doc, wire_id, label))
    }

    pub fn set_wire_signal_type(&mut self, wire_id: &str, signal: SignalType) -> bool {
        self.apply("set signal type", |doc| {
            operations::set_wire_signal_type(doc, wire_id, signal)
        })
    }

    pub fn set_wire_thickness(&mut self, wire_id: &str, thickness: f64) -> bool {
        self.apply("set wire thickness", |doc| {
            operations::set_wire_thickness(doc, wire_id, thickness)
        })
    }

    pub fn set_wire_line_style(&mut self, wire_id: &str, style: LineStyle) -> bool {
        self.apply("set line style", |doc| {
            operations::set_wire_line_style(doc, wire_id, style)
        })
    }

    /// Recolor the primary selected wire.
    pub fn set_selected_wire_color(&mut self, color: &str) -> bool {
        let Some(id) = self.selection.primary_id(EntityKind::Wire).map(str::to_string) else {
            return false;
        };
        self.apply("set wire color", |doc| operations::set_wire_color(doc, &id, color))
    }

    pub fn create_bundle(&mut self, name: &str, color: &str, wire_ids: &[String]) -> String {
        let mut id = String::new();
        self.apply("create bundle", |doc| {
            id = operations::create_bundle(doc, name, color, wire_ids);
            true
        });
        id
    }

    pub fn add_wire_to_bundle(&mut self, bundle_id: &str, wire_id: &str) -> bool {
        self.apply("add to bundle", |doc| {
            operations::add_wire_to_bundle(doc, bundle_id, wire_id)
        })
    }

    pub fn remove_wire_from_bundle(&mut self, bundle_id: &str, wire_id: &str) -> bool {
        self.apply("remove from bundle", |doc| {
            operations::remove_wire_from_bundle(doc, bundle_id, wire_id)
        })
    }

    pub fn delete_bundle(&mut self, bundle_id: &str) -> bool {
        self.apply("delete bundle", |doc| operations::delete_bundle(doc, bundle_id))
    }

    // ── Clipboard and duplication ───────────────────────────────────────────

    /// Copy the multi-selected components, texts and wires.
    pub fn copy_selection(&mut self) -> bool {
        let doc = &self.doc;
        let clipboard = EditorClipboard {
            components: self
                .selection
                .ids(EntityKind::Component)
                .iter()
                .filter_map(|id| doc.components.get(id).cloned())
                .collect(),
            texts: self
                .selection
                .ids(EntityKind::Text)
                .iter()
                .filter_map(|id| doc.texts.get(id).cloned())
                .collect(),
            wires: self
                .selection
                .ids(EntityKind::Wire)
                .iter()
                .filter_map(|id| doc.wires.get(id))
                .map(|w| {
                    let mut copy = w.clone();
                    for p in &mut copy.points {
                        let resolved = resolve_point(p, doc);
                        p.set_cached(resolved);
                    }
                    copy
                })
                .collect(),
        };
        debug!(
            components = clipboard.components.len(),
            texts = clipboard.texts.len(),
            wires = clipboard.wires.len(),
            "copied selection"
        );
        self.clipboard = clipboard;
        self.clipboard.has_content()
    }

    /// Paste the clipboard offset by the paste offset, with fresh ids.
    ///
    /// Wire points bound to a pasted component follow the copy; every
    /// other bound point becomes free at its copied position.
    pub fn paste(&mut self) -> bool {
        if !self.clipboard.has_content() {
            return false;
        }
        let offset = self.settings.paste_offset;
        let clipboard = self.clipboard.clone();
        self.apply("paste", |doc| {
            let mut ids: Vec<(String, String)> = Vec::new();
            for c in clipboard.components {
                let old = c.id.clone();
                let pasted = Component {
                    id: new_id(),
                    x: c.x + offset,
                    y: c.y + offset,
                    ..c
                };
                ids.push((old, doc.add_component(pasted)));
            }
            for t in clipboard.texts {
                doc.add_text(TextElement {
                    id: new_id(),
                    x: t.x + offset,
                    y: t.y + offset,
                    ..t
                });
            }
            for w in clipboard.wires {
                let points = w
                    .points
                    .iter()
                    .map(|p| {
                        let at = p.cached().offset(offset, offset);
                        match remap_binding(&p.binding, &ids) {
                            Some(binding) => WirePoint {
                                x: at.x,
                                y: at.y,
                                binding,
                            },
                            None => WirePoint::free(at),
                        }
                    })
                    .collect();
                let mut pasted = w.restyled(new_id(), points);
                pasted.bundle_id = None;
                doc.add_wire(pasted);
            }
            true
        })
    }

    /// Duplicate the primary component or text by the duplicate offset.
    pub fn duplicate_selected(&mut self) -> Option<String> {
        let d = self.settings.duplicate_offset;
        self.duplicate_primary(d, d)
    }

    /// Copy the primary component or text, offset by `(dx, dy)`, and select
    /// the copy. Returns the copy's id.
    pub fn duplicate_primary(&mut self, dx: f64, dy: f64) -> Option<String> {
        let (kind, id) = self.primary_owned()?;
        let copy_id = new_id();
        let done = self.apply("duplicate", |doc| match kind {
            EntityKind::Component => match doc.components.get(&id).cloned() {
                Some(c) => {
                    doc.add_component(Component {
                        id: copy_id.clone(),
                        x: c.x + dx,
                        y: c.y + dy,
                        ..c
                    });
                    true
                }
                None => false,
            },
            EntityKind::Text => match doc.texts.get(&id).cloned() {
                Some(t) => {
                    doc.add_text(TextElement {
                        id: copy_id.clone(),
                        x: t.x + dx,
                        y: t.y + dy,
                        ..t
                    });
                    true
                }
                None => false,
            },
            EntityKind::Wire | EntityKind::Node => false,
        });
        if !done {
            return None;
        }
        self.selection.select(kind, &copy_id);
        Some(copy_id)
    }

    // ── History ─────────────────────────────────────────────────────────────

    /// Undo the last edit; clears the selection and returns to the select tool.
    pub fn undo(&mut self) -> bool {
        self.cancel_wire();
        let done = self.history.undo(&mut self.doc);
        if done {
            self.after_history_step();
            info!(depth = self.history.undo_depth(), "undo");
        }
        done
    }

    /// Redo the last undone edit; clears the selection and returns to the
    /// select tool.
    pub fn redo(&mut self) -> bool {
        self.cancel_wire();
        let done = self.history.redo(&mut self.doc);
        if done {
            self.after_history_step();
            info!(depth = self.history.undo_depth(), "redo");
        }
        done
    }

    fn after_history_step(&mut self) {
        self.selection.clear();
        self.tool = Tool::Select;
        self.gesture = Gesture::Idle;
        self.dirty = true;
    }

    // ── Wire construction ───────────────────────────────────────────────────

    pub fn begin_wire(&mut self, start: WirePoint) {
        let wire = ActiveWire::begin(start, Some(self.settings.wire_color.clone()));
        debug!(wire = wire.id(), "began wire");
        self.active_wire = Some(wire);
    }

    /// Move the preview tail; no-op without an active wire.
    pub fn extend_wire(&mut self, to: WirePoint) {
        let (style, grid) = (self.settings.wire_style, self.grid());
        if let Some(wire) = &mut self.active_wire {
            wire.extend(to, style, grid);
        }
    }

    pub fn add_wire_vertex(&mut self, at: WirePoint) {
        let (style, grid) = (self.settings.wire_style, self.grid());
        if let Some(wire) = &mut self.active_wire {
            wire.add_vertex(at, style, grid);
        }
    }

    /// Drop the most recent vertex; `false` when nothing could be popped.
    pub fn pop_wire_vertex(&mut self) -> bool {
        self.active_wire.as_mut().is_some_and(ActiveWire::pop_vertex)
    }

    /// Commit the active wire as one or more wires in a single history frame.
    /// Returns the committed wire ids.
    pub fn finish_wire(&mut self) -> Vec<String> {
        let Some(wire) = self.active_wire.take() else {
            return Vec::new();
        };
        self.wire_guides.clear();
        self.wire_angle = None;
        let wires = wire.finish();
        if wires.is_empty() {
            return Vec::new();
        }
        let ids: Vec<String> = wires.iter().map(|w| w.id.clone()).collect();
        self.apply("finish wire", |doc| {
            for w in wires {
                doc.add_wire(w);
            }
            true
        });
        info!(wires = ids.len(), "finished wire");
        ids
    }

    /// Finish at the current preview point, which stays a plain endpoint
    /// rather than becoming a node.
    pub fn finish_wire_free(&mut self) -> Vec<String> {
        if let Some(wire) = &mut self.active_wire {
            wire.trim_idle_preview();
        }
        self.finish_wire()
    }

    /// Discard the active wire.
    pub fn cancel_wire(&mut self) {
        if let Some(wire) = self.active_wire.take() {
            debug!(wire = wire.id(), "cancelled wire");
        }
        self.wire_guides.clear();
        self.wire_angle = None;
    }

    // ── Project lifecycle ───────────────────────────────────────────────────

    fn reset_session(&mut self) {
        self.selection.clear();
        self.history.clear();
        self.cancel_wire();
        self.gesture = Gesture::Idle;
        self.tool = Tool::Select;
        self.placing = None;
        self.guides.clear();
        self.dirty = false;
    }

    /// Start an empty "Untitled Project".
    pub fn new_project(&mut self) {
        self.reset_session();
        self.doc = Schematic::new();
        self.project = ProjectInfo::untitled();
        info!(project = %self.project.id, "new project");
    }

    pub fn set_project_name(&mut self, name: &str) {
        self.project.name = name.to_string();
        self.dirty = true;
    }

    pub fn to_record(&self) -> ProjectRecord {
        ProjectRecord::from_document(
            &self.project.id,
            &self.project.name,
            &self.doc,
            self.project.created_at,
        )
    }

    /// Write the project to `store` and clear the dirty flag.
    pub fn save_project(&mut self, store: &mut dyn ProjectStore) -> Result<ProjectRecord> {
        let record = self.to_record();
        store.save(&record)?;
        self.dirty = false;
        Ok(record)
    }

    /// Replace the session with a stored project.
    ///
    /// A missing or unreadable project leaves an empty untitled document;
    /// returns whether the project was found.
    pub fn load_project(&mut self, store: &dyn ProjectStore, id: &str) -> bool {
        let record = load_record(store, id);
        self.reset_session();
        match record {
            Some(record) => {
                self.doc = record.to_document();
                self.project = ProjectInfo {
                    id: record.id,
                    name: record.name,
                    created_at: record.created_at,
                };
                true
            }
            None => {
                self.doc = Schematic::new();
                self.project = ProjectInfo::untitled();
                false
            }
        }
    }

    // ── Templates ───────────────────────────────────────────────────────────

    /// Instantiate a template at `at`; returns the new component ids.
    pub fn load_template(&mut self, template_id: &str, at: Point) -> Result<Vec<String>> {
        let template = self
            .templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| EditorError::UnknownEntity {
                kind: "template",
                id: template_id.to_string(),
            })?;
        let mut added = Vec::new();
        self.apply("load template", |doc| {
            added = template.instantiate(doc, at);
            true
        });
        Ok(added)
    }

    /// Save the whole document as a custom template; returns its id.
    pub fn save_as_template(&mut self, name: &str, category: TemplateCategory, description: &str) -> Result<String> {
        let template = CircuitTemplate::from_document(&self.doc, name, category, description)?;
        let id = template.id.clone();
        self.templates.add_custom(template);
        info!(template = %id, name, "saved template");
        Ok(id)
    }

    pub fn delete_template(&mut self, template_id: &str) -> bool {
        self.templates.delete_custom(template_id)
    }
}

fn set_entity_position(doc: &mut Schematic, kind: EntityKind, id: &str, to: Point) -> bool {
    match kind {
        EntityKind::Component => match doc.components.get_mut(id) {
            Some(c) => {
                c.x = to.x;
                c.y = to.y;
                true
            }
            None => false,
        },
        EntityKind::Text => match doc.texts.get_mut(id) {
            Some(t) => {
                t.x = to.x;
                t.y = to.y;
                true
            }
            None => false,
        },
        EntityKind::Node => operations::move_node(doc, id, to),
        EntityKind::Wire => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Binding;
    use crate::project::MemoryStore;

    fn state_with_resistor(x: f64, y: f64) -> (EditorState, String) {
        let mut state = EditorState::default();
        let id = state.place_component(ComponentType::Resistor, Point::new(x, y));
        (state, id)
    }

    #[test]
    fn test_editor_state_new() {
        let state = EditorState::default();
        assert!(state.doc.is_empty());
        assert_eq!(state.tool, Tool::Select);
        assert_eq!(state.project.name, "Untitled Project");
        assert!(!state.is_dirty());
        assert!(!state.history.can_undo());
    }

    #[test]
    fn test_place_snaps_and_resets_tool() {
        let mut state = EditorState::default();
        state.start_placing(ComponentType::Led);
        let id = state.place_component(ComponentType::Led, Point::new(104.0, 96.0));
        assert_eq!(state.doc.components[&id].position(), Point::new(100.0, 100.0));
        assert_eq!(state.tool, Tool::Select);
        assert_eq!(state.placing, None);
        assert!(state.is_dirty());
        assert_eq!(state.history.undo_depth(), 1);
    }

    #[test]
    fn test_noop_edit_pushes_nothing() {
        let mut state = EditorState::default();
        assert!(!state.move_node("missing", Point::new(0.0, 0.0)));
        assert!(state.subdivide("missing", 0, Point::new(0.0, 0.0), None).is_none());
        assert!(!state.history.can_undo());
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_text_defaults_from_settings() {
        let mut state = EditorState::default();
        state.settings.text_size = 18.0;
        state.settings.text_color = "#ff0000".into();
        let id = state.add_text(Point::new(12.0, 12.0));
        let text = &state.doc.texts[&id];
        assert_eq!(text.text, "Text");
        assert_eq!(text.font_size, 18.0);
        assert_eq!(text.color, "#ff0000");
        assert_eq!(text.position(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_delete_priority() {
        let (mut state, c) = state_with_resistor(100.0, 100.0);
        let t = state.add_text(Point::new(300.0, 300.0));
        state.selection.select(EntityKind::Component, &c);
        state.selection.toggle(EntityKind::Text, &t);

        assert!(state.delete_selection());
        assert!(state.doc.texts.is_empty());
        assert_eq!(state.doc.components.len(), 1);
        assert!(state.delete_selection());
        assert!(state.doc.components.is_empty());
        assert!(!state.delete_selection());
    }

    #[test]
    fn test_rotate_and_scale() {
        let (mut state, c) = state_with_resistor(0.0, 0.0);
        state.selection.select(EntityKind::Component, &c);
        for _ in 0..5 {
            state.rotate_selected();
        }
        assert_eq!(state.doc.components[&c].rotation, 90.0);
        state.set_rotation(-45.0);
        assert_eq!(state.doc.components[&c].rotation, 315.0);
        state.set_scale(10.0);
        assert_eq!(state.doc.components[&c].scale, 3.0);
        state.set_scale(0.1);
        assert_eq!(state.doc.components[&c].scale, 0.5);
    }

    #[test]
    fn test_set_position_prefers_guides() {
        let (mut state, a) = state_with_resistor(100.0, 100.0);
        let b = state.place_component(ComponentType::Resistor, Point::new(300.0, 300.0));
        state.selection.select(EntityKind::Component, &b);
        // x within 5 of a.x, y far from everything
        assert!(state.set_position(Point::new(103.0, 247.0)));
        assert_eq!(state.doc.components[&b].position(), Point::new(100.0, 250.0));
        assert_eq!(state.doc.components[&a].position(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_nudge_snaps_to_grid() {
        let (mut state, c) = state_with_resistor(100.0, 100.0);
        state.selection.select(EntityKind::Component, &c);
        state.nudge_selected(-10.0, 0.0);
        assert_eq!(state.doc.components[&c].position(), Point::new(90.0, 100.0));
    }

    #[test]
    fn test_copy_paste_remaps_bound_points() {
        let (mut state, r1) = state_with_resistor(100.0, 100.0);
        let r2 = state.place_component(ComponentType::Resistor, Point::new(300.0, 100.0));
        let wire = Wire::new(
            vec![
                WirePoint::terminal(Point::new(124.0, 100.0), &r1, "right"),
                WirePoint::terminal(Point::new(276.0, 100.0), &r2, "left"),
            ],
            None,
        );
        let w = state.doc.add_wire(wire);
        state.selection.select(EntityKind::Component, &r1);
        state.selection.toggle(EntityKind::Wire, &w);
        assert!(state.copy_selection());
        assert!(state.paste());

        assert_eq!(state.doc.components.len(), 3);
        let pasted = state.doc.wires.values().last().unwrap();
        assert_ne!(pasted.id, w);
        assert!(matches!(&pasted.points[0].binding, Binding::Terminal { component_id, .. } if component_id != &r1));
        assert_eq!(pasted.points[1].binding, Binding::Free);
        assert_eq!(pasted.points[1].cached(), Point::new(296.0, 120.0));
        assert!(state.doc.dangling_wires().is_empty());
    }

    #[test]
    fn test_duplicate_selects_copy() {
        let (mut state, c) = state_with_resistor(100.0, 100.0);
        state.selection.select(EntityKind::Component, &c);
        let copy = state.duplicate_selected().unwrap();
        assert_eq!(state.doc.components[&copy].position(), Point::new(140.0, 140.0));
        assert_eq!(state.selection.primary(), Some((EntityKind::Component, copy.as_str())));
    }

    #[test]
    fn test_undo_clears_selection_and_tool() {
        let (mut state, c) = state_with_resistor(100.0, 100.0);
        state.selection.select(EntityKind::Component, &c);
        state.set_tool(Tool::Wire);
        assert!(state.undo());
        assert!(state.doc.is_empty());
        assert!(state.selection.is_empty());
        assert_eq!(state.tool, Tool::Select);
        assert!(state.redo());
        assert_eq!(state.doc.components.len(), 1);
    }

    #[test]
    fn test_finish_wire_is_one_frame() {
        let mut state = EditorState::default();
        state.settings.wire_style = crate::editor::wiring::WireStyle::Polyline;
        state.begin_wire(WirePoint::free(Point::new(0.0, 0.0)));
        state.add_wire_vertex(WirePoint::free(Point::new(100.0, 0.0)));
        state.extend_wire(WirePoint::free(Point::new(100.0, 100.0)));
        let ids = state.finish_wire();
        assert_eq!(ids.len(), 2);
        assert_eq!(state.history.undo_depth(), 1);
        assert!(state.active_wire().is_none());
        state.undo();
        assert!(state.doc.wires.is_empty());
    }

    #[test]
    fn test_finish_free_drops_idle_preview() {
        let mut state = EditorState::default();
        state.settings.wire_style = crate::editor::wiring::WireStyle::Polyline;
        state.begin_wire(WirePoint::free(Point::new(0.0, 0.0)));
        state.add_wire_vertex(WirePoint::free(Point::new(100.0, 0.0)));
        let ids = state.finish_wire_free();
        assert_eq!(ids.len(), 1);
        let wire = &state.doc.wires[&ids[0]];
        assert_eq!(wire.points[1].cached(), Point::new(100.0, 0.0));
    }

    #[test]
    fn test_set_tool_cancels_wire() {
        let mut state = EditorState::default();
        state.begin_wire(WirePoint::free(Point::new(0.0, 0.0)));
        state.set_tool(Tool::Select);
        assert!(state.active_wire().is_none());
    }

    #[test]
    fn test_save_and_load_project() {
        let (mut state, _) = state_with_resistor(100.0, 100.0);
        state.set_project_name("Amp");
        let mut store = MemoryStore::new();
        let record = state.save_project(&mut store).unwrap();
        assert!(!state.is_dirty());

        let mut other = EditorState::default();
        assert!(other.load_project(&store, &record.id));
        assert_eq!(other.project.name, "Amp");
        assert_eq!(other.doc.components.len(), 1);
        assert!(!other.history.can_undo());
        assert!(!other.is_dirty());
    }

    #[test]
    fn test_load_missing_project_is_empty() {
        let (mut state, _) = state_with_resistor(100.0, 100.0);
        let store = MemoryStore::new();
        assert!(!state.load_project(&store, "nope"));
        assert!(state.doc.is_empty());
        assert!(!state.history.can_undo());
    }

    #[test]
    fn test_new_project_resets() {
        let (mut state, c) = state_with_resistor(100.0, 100.0);
        state.selection.select(EntityKind::Component, &c);
        let old_id = state.project.id.clone();
        state.new_project();
        assert!(state.doc.is_empty());
        assert!(state.selection.is_empty());
        assert!(!state.history.can_undo());
        assert_ne!(state.project.id, old_id);
    }

    #[test]
    fn test_templates_through_state() {
        let mut state = EditorState::default();
        let ids = state.load_template("nor-gate", Point::new(0.0, 0.0)).unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(state.history.undo_depth(), 1);
        let custom = state
            .save_as_template("mine", TemplateCategory::Custom, "copy")
            .unwrap();
        assert!(state.templates.get(&custom).is_some());
        assert!(state.delete_template(&custom));
        assert!(matches!(
            state.load_template("unknown", Point::new(0.0, 0.0)),
            Err(EditorError::UnknownEntity { kind: "template", .. })
        ));
    }

    #[test]
    fn test_select_all_by_type() {
        let (mut state, r) = state_with_resistor(0.0, 0.0);
        state.place_component(ComponentType::Led, Point::new(100.0, 0.0));
        state.select_all_by_type(ComponentType::Resistor);
        assert_eq!(state.selection.ids(EntityKind::Component), [r]);
    }
}
