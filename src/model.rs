//! Schematic document model.
//!
//! The document holds placed components, committed wires, manual connection
//! nodes, text annotations and wire bundles. Wires are polylines of
//! [`WirePoint`]s; each point carries an explicit [`Binding`] that says
//! whether its coordinates are authoritative or a cached copy of a terminal
//! or node position that must be re-resolved (see [`crate::resolve`]).
//!
//! Collections are [`IndexMap`]s keyed by id so that iteration order is the
//! insertion order, which several snapping policies depend on.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point;
use crate::terminals::ComponentType;

/// Generate a short random id (8 hex chars).
pub fn new_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn default_scale() -> f64 {
    1.0
}

// ────────────────────────────────────────────────────────────────────────────
// Components
// ────────────────────────────────────────────────────────────────────────────

/// A placed component symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub x: f64,
    pub y: f64,
    /// Degrees, kept in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Uniform scale in `[0.5, 3]`.
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Component {
    pub fn new(kind: ComponentType, x: f64, y: f64) -> Self {
        Self {
            id: new_id(),
            kind,
            x,
            y,
            rotation: 0.0,
            scale: 1.0,
            color: None,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Connection nodes
// ────────────────────────────────────────────────────────────────────────────

/// A manual or junction node, not owned by any component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeRecord", into = "NodeRecord")]
pub struct ConnectionNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl ConnectionNode {
    pub fn new(x: f64, y: f64) -> Self {
        Self { id: new_id(), x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Persisted node shape: `{id, x, y, componentId: null, terminalId: id}`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    id: String,
    x: f64,
    y: f64,
    #[serde(default)]
    component_id: Option<String>,
    #[serde(default)]
    terminal_id: Option<String>,
}

impl From<NodeRecord> for ConnectionNode {
    fn from(r: NodeRecord) -> Self {
        Self { id: r.id, x: r.x, y: r.y }
    }
}

impl From<ConnectionNode> for NodeRecord {
    fn from(n: ConnectionNode) -> Self {
        Self {
            terminal_id: Some(n.id.clone()),
            id: n.id,
            x: n.x,
            y: n.y,
            component_id: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire points
// ────────────────────────────────────────────────────────────────────────────

/// What a wire vertex is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Binding {
    /// Coordinates are authoritative.
    #[default]
    Free,
    /// Attached to a component terminal.
    Terminal {
        component_id: String,
        terminal_id: String,
    },
    /// Attached to a manual connection node.
    Node(String),
}

impl Binding {
    pub fn is_free(&self) -> bool {
        matches!(self, Binding::Free)
    }

    /// True if this binding references the given component.
    pub fn references_component(&self, id: &str) -> bool {
        matches!(self, Binding::Terminal { component_id, .. } if component_id == id)
    }

    /// True if this binding references the given manual node.
    pub fn references_node(&self, id: &str) -> bool {
        matches!(self, Binding::Node(node) if node == id)
    }
}

/// A wire vertex.
///
/// For bound points `x`/`y` are the last known position of the bound
/// terminal or node and must never be drawn directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRecord", into = "PointRecord")]
pub struct WirePoint {
    pub x: f64,
    pub y: f64,
    pub binding: Binding,
}

impl WirePoint {
    pub fn free(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            binding: Binding::Free,
        }
    }

    pub fn terminal(p: Point, component_id: &str, terminal_id: &str) -> Self {
        Self {
            x: p.x,
            y: p.y,
            binding: Binding::Terminal {
                component_id: component_id.to_string(),
                terminal_id: terminal_id.to_string(),
            },
        }
    }

    pub fn node(p: Point, node_id: &str) -> Self {
        Self {
            x: p.x,
            y: p.y,
            binding: Binding::Node(node_id.to_string()),
        }
    }

    /// Cached (bound) or authoritative (free) coordinates.
    pub fn cached(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_cached(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }
}

/// Persisted point shape: `{x, y, componentId, terminalId}`.
///
/// `componentId` set means a terminal binding, only `terminalId` set means a
/// manual node binding, neither means a free point.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointRecord {
    x: f64,
    y: f64,
    #[serde(default)]
    component_id: Option<String>,
    #[serde(default)]
    terminal_id: Option<String>,
}

impl From<PointRecord> for WirePoint {
    fn from(r: PointRecord) -> Self {
        let binding = match (r.component_id, r.terminal_id) {
            (Some(component_id), Some(terminal_id)) => Binding::Terminal {
                component_id,
                terminal_id,
            },
            (None, Some(node)) => Binding::Node(node),
            _ => Binding::Free,
        };
        Self {
            x: r.x,
            y: r.y,
            binding,
        }
    }
}

impl From<WirePoint> for PointRecord {
    fn from(p: WirePoint) -> Self {
        let (component_id, terminal_id) = match p.binding {
            Binding::Free => (None, None),
            Binding::Terminal {
                component_id,
                terminal_id,
            } => (Some(component_id), Some(terminal_id)),
            Binding::Node(node) => (None, Some(node)),
        };
        Self {
            x: p.x,
            y: p.y,
            component_id,
            terminal_id,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wires
// ────────────────────────────────────────────────────────────────────────────

/// Signal classification; also picks the wire colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Power,
    Ground,
    Data,
    Clock,
    Control,
    Analog,
    Digital,
    Custom,
}

impl SignalType {
    pub fn color(self) -> &'static str {
        match self {
            SignalType::Power => "#ef4444",
            SignalType::Ground => "#000000",
            SignalType::Data => "#3b82f6",
            SignalType::Clock => "#8b5cf6",
            SignalType::Control => "#f59e0b",
            SignalType::Analog => "#10b981",
            SignalType::Digital => "#06b6d4",
            SignalType::Custom => "#6b7280",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// A committed wire: an ordered polyline of at least two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wire {
    pub id: String,
    pub points: Vec<WirePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_type: Option<SignalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<LineStyle>,
}

impl Wire {
    pub fn new(points: Vec<WirePoint>, color: Option<String>) -> Self {
        Self {
            id: new_id(),
            points,
            color,
            label: None,
            signal_type: None,
            bundle_id: None,
            thickness: None,
            style: None,
        }
    }

    /// A wire with this wire's visual attributes but a new id and points.
    pub fn restyled(&self, id: String, points: Vec<WirePoint>) -> Wire {
        Wire {
            id,
            points,
            ..self.clone()
        }
    }

    /// Number of selectable segments.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn touches_node(&self, node_id: &str) -> bool {
        self.points.iter().any(|p| p.binding.references_node(node_id))
    }

    pub fn touches_component(&self, component_id: &str) -> bool {
        self.points
            .iter()
            .any(|p| p.binding.references_component(component_id))
    }
}

/// A named group of wires sharing a colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBundle {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub layer: i32,
    pub wire_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Text
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAlign {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAlign::Start => "start",
            TextAlign::Middle => "middle",
            TextAlign::End => "end",
        }
    }
}

fn default_font_size() -> f64 {
    14.0
}

fn default_font_weight() -> String {
    "normal".to_string()
}

fn default_text_color() -> String {
    "#000000".to_string()
}

fn default_font_family() -> String {
    "Arial, sans-serif".to_string()
}

/// A free-standing text annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    #[serde(default = "default_text_color")]
    pub color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub rotation: f64,
}

impl TextElement {
    pub fn new(x: f64, y: f64, text: &str) -> Self {
        Self {
            id: new_id(),
            x,
            y,
            text: text.to_string(),
            font_size: default_font_size(),
            font_weight: default_font_weight(),
            color: default_text_color(),
            font_family: default_font_family(),
            text_align: TextAlign::Start,
            rotation: 0.0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Schematic
// ────────────────────────────────────────────────────────────────────────────

/// The editable document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schematic {
    pub components: IndexMap<String, Component>,
    pub wires: IndexMap<String, Wire>,
    pub texts: IndexMap<String, TextElement>,
    pub nodes: IndexMap<String, ConnectionNode>,
    pub bundles: IndexMap<String, WireBundle>,
}

impl Schematic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
            && self.wires.is_empty()
            && self.texts.is_empty()
            && self.nodes.is_empty()
    }

    pub fn add_component(&mut self, component: Component) -> String {
        let id = component.id.clone();
        self.components.insert(id.clone(), component);
        id
    }

    pub fn add_wire(&mut self, wire: Wire) -> String {
        let id = wire.id.clone();
        self.wires.insert(id.clone(), wire);
        id
    }

    pub fn add_text(&mut self, text: TextElement) -> String {
        let id = text.id.clone();
        self.texts.insert(id.clone(), text);
        id
    }

    pub fn add_node(&mut self, node: ConnectionNode) -> String {
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        id
    }

    /// True if the binding points at an entity that still exists.
    pub fn binding_exists(&self, binding: &Binding) -> bool {
        match binding {
            Binding::Free => true,
            Binding::Terminal {
                component_id,
                terminal_id,
            } => self
                .components
                .get(component_id)
                .is_some_and(|c| c.kind.terminal(terminal_id).is_some()),
            Binding::Node(id) => self.nodes.contains_key(id),
        }
    }

    /// Ids of wires with at least one point whose binding no longer exists.
    pub fn dangling_wires(&self) -> Vec<String> {
        self.wires
            .values()
            .filter(|w| w.points.iter().any(|p| !self.binding_exists(&p.binding)))
            .map(|w| w.id.clone())
            .collect()
    }

    /// Drop wires that are malformed or reference missing entities, and bundle
    /// memberships of wires that no longer exist. Returns the removed wire ids.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut removed = self.dangling_wires();
        removed.extend(
            self.wires
                .values()
                .filter(|w| w.points.len() < 2)
                .map(|w| w.id.clone()),
        );
        for id in &removed {
            self.wires.shift_remove(id);
        }
        self.prune_bundles();
        removed
    }

    /// Remove bundle references to wires that no longer exist.
    pub fn prune_bundles(&mut self) {
        let wires = &self.wires;
        for bundle in self.bundles.values_mut() {
            bundle.wire_ids.retain(|id| wires.contains_key(id));
        }
    }
}
