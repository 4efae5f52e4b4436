//! Input model: tools, modifier keys, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. [`Gesture`] is the drag being tracked between pointer-down and
//! pointer-up; it carries the snapshot taken at pointer-down so the whole
//! drag lands in history as one frame on release.
//!
//! All coordinates are in canvas space; the host converts screen positions
//! using its own pan and zoom before calling in.

use tracing::debug;

use crate::geometry::{Point, angle_between};
use crate::model::{Component, TextElement, WirePoint, new_id};
use crate::resolve::{find_closest_terminal, hit_threshold, resolve_point, snap_targets};
use crate::snap::{alignment_candidates, snap_rotation, snap_to_alignment, snap_wire_point};
use crate::terminals::ComponentType;

use super::history::Snapshot;
use super::operations::{self, find_wire_hit};
use super::selection::EntityKind;
use super::state::EditorState;
use super::wiring::WireStyle;

/// Drag distance past which an alt-drag forks a copy.
pub const DUPLICATE_DRAG_THRESHOLD: f64 = 20.0;
/// Pointer distance from a component's center that maps to scale 1.
pub const RESIZE_REFERENCE: f64 = 24.0;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Selection and dragging (default).
    #[default]
    Select,
    /// Drop the armed component type.
    Place,
    /// Draw wires.
    Wire,
    /// Drop a text element.
    Text,
    /// Split wires with junction nodes.
    AddNode,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key, named as the browser reports it (`"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// The pointer gesture in progress.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Moving a component or text element.
    Drag {
        kind: EntityKind,
        id: String,
        /// Pointer position at pointer-down.
        start: Point,
        /// Entity position at pointer-down.
        origin: Point,
        before: Snapshot,
        /// An alt-drag already forked its copy.
        duplicated: bool,
    },
    DragNode {
        id: String,
        before: Snapshot,
    },
    /// Moving one free vertex of a committed wire.
    DragWirePoint {
        wire_id: String,
        index: usize,
        before: Snapshot,
    },
    Resize {
        id: String,
        before: Snapshot,
    },
    Rotate {
        kind: EntityKind,
        id: String,
        before: Snapshot,
    },
}

impl EditorState {
    /// Hit threshold at the current zoom.
    pub fn threshold(&self) -> f64 {
        hit_threshold(self.zoom)
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    // ── Clicks ──────────────────────────────────────────────────────────────

    /// Interpret a click according to the current tool.
    pub fn on_click(&mut self, p: Point, mods: Modifiers) {
        match self.tool {
            Tool::Select => self.click_select(p, mods),
            Tool::Place => match self.placing {
                Some(kind) => {
                    let id = self.place_component(kind, p);
                    debug!(component = %id, "placed by click");
                }
                None => self.set_tool(Tool::Select),
            },
            Tool::Text => {
                self.add_text(p);
            }
            Tool::AddNode => self.click_add_node(p),
            Tool::Wire => self.click_wire(p),
        }
    }

    /// Hit-test node, component, wire, then text; ctrl/cmd toggles set
    /// membership instead of replacing the selection.
    fn click_select(&mut self, p: Point, mods: Modifiers) {
        let threshold = self.threshold();
        let doc = &self.doc;
        let hit = operations::node_at(doc, p, threshold)
            .map(|id| (EntityKind::Node, id))
            .or_else(|| operations::component_at(doc, p).map(|id| (EntityKind::Component, id)))
            .or_else(|| operations::wire_at(doc, p, threshold).map(|id| (EntityKind::Wire, id)))
            .or_else(|| operations::text_at(doc, p).map(|id| (EntityKind::Text, id)));
        match hit {
            Some((kind, id)) if mods.command() => self.selection.toggle(kind, &id),
            Some((kind, id)) => self.selection.select(kind, &id),
            None if mods.command() => {}
            None => self.selection.clear(),
        }
    }

    /// Split the wire under the pointer with a junction node at the
    /// alignment-snapped nearest point.
    fn click_add_node(&mut self, p: Point) {
        let Some(hit) = find_wire_hit(&self.doc, p, self.threshold()) else {
            self.selection.clear();
            return;
        };
        let at = snap_to_alignment(&alignment_candidates(&self.doc), hit.point).point;
        if let Some(split) = self.subdivide(&hit.wire_id, hit.segment_index, at, None) {
            if let Some(node) = &split.node_id {
                self.selection.select(EntityKind::Node, node);
            }
        }
    }

    /// Create a junction on the wire under `p`, if any, returning a point
    /// bound to the new node.
    fn junction_under(&mut self, p: Point) -> Option<WirePoint> {
        let hit = find_wire_hit(&self.doc, p, self.threshold())?;
        let at = snap_to_alignment(&alignment_candidates(&self.doc), hit.point).point;
        let split = self.subdivide(&hit.wire_id, hit.segment_index, at, None)?;
        let node = split.node_id?;
        Some(WirePoint::node(at, &node))
    }

    fn click_wire(&mut self, p: Point) {
        let threshold = self.threshold();
        let target = find_closest_terminal(&snap_targets(&self.doc), p, threshold).map(|t| t.to_wire_point());
        let style = self.settings.wire_style;

        if self.active_wire.is_none() {
            if let Some(start) = target {
                self.begin_wire(start);
            } else if let Some(start) = self.junction_under(p) {
                debug!("starting wire from new junction");
                self.begin_wire(start);
            } else if style == WireStyle::Polyline {
                let id = self.add_connection_node(p);
                if let Some(node) = self.doc.nodes.get(&id) {
                    let start = WirePoint::node(node.position(), &id);
                    self.begin_wire(start);
                }
            } else {
                self.selection.clear();
            }
            return;
        }

        // mid-draw: terminals and nodes finish the wire, and so does an
        // existing wire, through a fresh junction
        if let Some(end) = target.or_else(|| self.junction_under(p)) {
            self.extend_wire(end);
            self.finish_wire();
            return;
        }
        let point = self.preview_point(p);
        if style == WireStyle::Polyline {
            let id = self.add_connection_node(point);
            if let Some(node) = self.doc.nodes.get(&id) {
                let vertex = WirePoint::node(node.position(), &id);
                self.add_wire_vertex(vertex);
            }
        } else {
            self.extend_wire(WirePoint::free(point));
            self.finish_wire_free();
        }
    }

    /// Combined angle and alignment snap from the last committed vertex;
    /// refreshes the wire guides.
    fn preview_point(&mut self, p: Point) -> Point {
        let Some(anchor) = self.active_wire.as_ref().map(|w| w.last_committed().cached()) else {
            return p;
        };
        let snap = snap_wire_point(&alignment_candidates(&self.doc), anchor, p);
        self.wire_guides = snap.guides;
        self.wire_angle = snap.angle;
        snap.point
    }

    /// Place `kind` at `p`. Dropped onto a wire, the component is inserted
    /// into it; placement and insertion form one history frame.
    pub fn drop_component(&mut self, kind: ComponentType, p: Point) -> String {
        let Some(hit) = find_wire_hit(&self.doc, p, self.threshold()) else {
            return self.place_component(kind, p);
        };
        let segment_start = self.doc.wires.get(&hit.wire_id).and_then(|w| w.points.get(hit.segment_index));
        let at = match segment_start {
            Some(start) => {
                let anchor = resolve_point(start, &self.doc);
                snap_wire_point(&alignment_candidates(&self.doc), anchor, p).point
            }
            None => hit.point,
        };
        let component = Component::new(kind, at.x, at.y);
        let id = component.id.clone();
        self.apply("drop component on wire", |doc| {
            doc.add_component(component);
            operations::subdivide_wire(doc, &hit.wire_id, hit.segment_index, at, Some(&id));
            true
        });
        self.placing = None;
        self.tool = Tool::Select;
        id
    }

    // ── Pointer drags ───────────────────────────────────────────────────────

    /// Start a drag on whatever is under the pointer (select tool only).
    pub fn on_pointer_down(&mut self, p: Point, mods: Modifiers) {
        self.gesture = Gesture::Idle;
        if self.tool != Tool::Select || mods.command() {
            return;
        }
        let threshold = self.threshold();
        let before = Snapshot::capture(&self.doc);

        if let Some(id) = operations::node_at(&self.doc, p, threshold) {
            self.selection.select(EntityKind::Node, &id);
            self.gesture = Gesture::DragNode { id, before };
            return;
        }
        if let Some((wire_id, index)) = self.free_vertex_at(p, threshold) {
            self.selection.select(EntityKind::Wire, &wire_id);
            self.gesture = Gesture::DragWirePoint { wire_id, index, before };
            return;
        }
        let hit = operations::component_at(&self.doc, p)
            .and_then(|id| Some((EntityKind::Component, self.doc.components.get(&id)?.position(), id)))
            .or_else(|| {
                operations::text_at(&self.doc, p)
                    .and_then(|id| Some((EntityKind::Text, self.doc.texts.get(&id)?.position(), id)))
            });
        if let Some((kind, origin, id)) = hit {
            self.selection.select(kind, &id);
            self.gesture = Gesture::Drag {
                kind,
                id,
                start: p,
                origin,
                before,
                duplicated: false,
            };
        }
    }

    fn free_vertex_at(&self, p: Point, threshold: f64) -> Option<(String, usize)> {
        self.doc.wires.values().find_map(|w| {
            w.points
                .iter()
                .position(|pt| pt.binding.is_free() && pt.cached().distance(p) < threshold)
                .map(|i| (w.id.clone(), i))
        })
    }

    /// Begin scaling the primary component from its center.
    pub fn start_resize(&mut self) -> bool {
        let Some(id) = self.selection.primary_id(EntityKind::Component).map(str::to_string) else {
            return false;
        };
        let before = Snapshot::capture(&self.doc);
        self.gesture = Gesture::Resize { id, before };
        true
    }

    /// Begin rotating the primary component or text around its anchor.
    pub fn start_rotate(&mut self) -> bool {
        let Some((kind, id)) = self.selection.primary() else {
            return false;
        };
        if !matches!(kind, EntityKind::Component | EntityKind::Text) {
            return false;
        }
        let id = id.to_string();
        let before = Snapshot::capture(&self.doc);
        self.gesture = Gesture::Rotate { kind, id, before };
        true
    }

    /// Track the pointer: wire preview while drawing, otherwise the active
    /// gesture. Nothing here records history.
    pub fn on_pointer_move(&mut self, p: Point, mods: Modifiers) {
        if self.tool == Tool::Wire && self.active_wire.is_some() {
            let target = find_closest_terminal(&snap_targets(&self.doc), p, self.threshold()).map(|t| t.to_wire_point());
            match target {
                Some(bound) => {
                    self.wire_guides.clear();
                    self.wire_angle = None;
                    self.extend_wire(bound);
                }
                None => {
                    let point = self.preview_point(p);
                    self.extend_wire(WirePoint::free(point));
                }
            }
            return;
        }

        let gesture = std::mem::take(&mut self.gesture);
        self.gesture = match gesture {
            Gesture::Idle => Gesture::Idle,
            Gesture::Drag {
                kind,
                id,
                start,
                origin,
                before,
                duplicated,
            } => {
                let mut id = id;
                let mut duplicated = duplicated;
                if mods.alt && !duplicated && start.distance(p) > DUPLICATE_DRAG_THRESHOLD {
                    if let Some(copy) = self.fork_dragged(kind, &id, origin) {
                        id = copy;
                        duplicated = true;
                    }
                }
                let target = origin.offset(p.x - start.x, p.y - start.y);
                self.drag_primary_to(target);
                Gesture::Drag {
                    kind,
                    id,
                    start,
                    origin,
                    before,
                    duplicated,
                }
            }
            Gesture::DragNode { id, before } => {
                let to = self.snap(p);
                operations::move_node(&mut self.doc, &id, to);
                Gesture::DragNode { id, before }
            }
            Gesture::DragWirePoint { wire_id, index, before } => {
                let to = self.snap(p);
                operations::move_wire_point(&mut self.doc, &wire_id, index, to);
                Gesture::DragWirePoint { wire_id, index, before }
            }
            Gesture::Resize { id, before } => {
                if let Some(center) = self.doc.components.get(&id).map(Component::position) {
                    let reach = (p.x - center.x).abs().max((p.y - center.y).abs());
                    self.scale_primary_to(reach / RESIZE_REFERENCE);
                }
                Gesture::Resize { id, before }
            }
            Gesture::Rotate { kind, id, before } => {
                let center = match kind {
                    EntityKind::Component => self.doc.components.get(&id).map(Component::position),
                    _ => self.doc.texts.get(&id).map(TextElement::position),
                };
                if let Some(center) = center {
                    self.rotate_primary_to(snap_rotation(angle_between(center, p)));
                }
                Gesture::Rotate { kind, id, before }
            }
        };
    }

    /// Leave a copy of the dragged entity at `origin` and keep dragging the
    /// copy. Returns the id now being dragged.
    fn fork_dragged(&mut self, kind: EntityKind, id: &str, origin: Point) -> Option<String> {
        let copy_id = new_id();
        match kind {
            EntityKind::Component => {
                let moved = self.doc.components.get(id)?.clone();
                if let Some(original) = self.doc.components.get_mut(id) {
                    original.x = origin.x;
                    original.y = origin.y;
                }
                self.doc.add_component(Component { id: copy_id.clone(), ..moved });
            }
            EntityKind::Text => {
                let moved = self.doc.texts.get(id)?.clone();
                if let Some(original) = self.doc.texts.get_mut(id) {
                    original.x = origin.x;
                    original.y = origin.y;
                }
                self.doc.add_text(TextElement { id: copy_id.clone(), ..moved });
            }
            EntityKind::Wire | EntityKind::Node => return None,
        }
        self.selection.select(kind, &copy_id);
        debug!(original = id, copy = %copy_id, "forked copy on drag");
        Some(copy_id)
    }

    /// End the gesture, recording one history frame if it changed anything.
    pub fn on_pointer_up(&mut self) -> bool {
        self.guides.clear();
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => false,
            Gesture::Drag { before, duplicated, .. } => {
                let action = if duplicated { "duplicate drag" } else { "drag" };
                self.commit_since(action, before)
            }
            Gesture::DragNode { before, .. } => self.commit_since("drag node", before),
            Gesture::DragWirePoint { before, .. } => self.commit_since("drag wire point", before),
            Gesture::Resize { before, .. } => self.commit_since("resize", before),
            Gesture::Rotate { before, .. } => self.commit_since("rotate", before),
        }
    }

    // ── Keyboard ────────────────────────────────────────────────────────────

    /// Handle a key press; returns whether the key was consumed.
    pub fn on_key_down(&mut self, key: &Key, mods: Modifiers) -> bool {
        let drawing = self.active_wire.is_some();
        match key.0.as_str() {
            "Escape" => {
                if drawing {
                    self.cancel_wire();
                } else {
                    self.selection.clear();
                    self.set_tool(Tool::Select);
                }
                true
            }
            "Enter" if drawing => !self.finish_wire_free().is_empty(),
            "Backspace" if drawing => self.pop_wire_vertex(),
            "Delete" | "Backspace" => self.delete_selection(),
            "z" | "Z" if mods.command() && mods.shift => self.redo(),
            "z" | "Z" if mods.command() => self.undo(),
            "y" | "Y" if mods.command() => self.redo(),
            "c" | "C" if mods.command() => self.copy_selection(),
            "v" | "V" if mods.command() => self.paste(),
            "d" | "D" if mods.command() => self.duplicate_selected().is_some(),
            "r" | "R" if !mods.command() => self.rotate_selected(),
            "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" => {
                let step = self.settings.grid_size;
                let (dx, dy) = match key.0.as_str() {
                    "ArrowUp" => (0.0, -step),
                    "ArrowDown" => (0.0, step),
                    "ArrowLeft" => (-step, 0.0),
                    _ => (step, 0.0),
                };
                self.nudge_selected(dx, dy)
            }
            _ => false,
        }
    }
}
